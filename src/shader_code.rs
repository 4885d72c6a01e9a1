use crate::PinType;

/// Stage interface variable with its assigned binding location.
#[derive(Debug, Clone, PartialEq)]
pub struct StageVar {
    pub name: String,
    pub ty: PinType,
    pub location: usize,
}

/// Accumulator for one shader stage: global declarations, the stage
/// in/out interface and the ordered main body. Serialized once at the end
/// of a pass by `output`.
#[derive(Default, Debug, Clone)]
pub struct ShaderCode {
    globals: Vec<String>,
    inputs: Vec<StageVar>,
    outputs: Vec<StageVar>,
    main: Vec<String>,
}

impl ShaderCode {
    /// Declares a stage input and returns its location. Locations are
    /// handed out sequentially and never reused.
    pub fn push_input(&mut self, name: &str, ty: PinType) -> usize {
        let location = self.inputs.len();
        self.inputs.push(StageVar {
            name: name.to_owned(),
            ty,
            location,
        });
        location
    }

    pub fn push_output(&mut self, name: &str, ty: PinType) -> usize {
        let location = self.outputs.len();
        self.outputs.push(StageVar {
            name: name.to_owned(),
            ty,
            location,
        });
        location
    }

    /// Adds a file-scope declaration line, skipping exact duplicates so a
    /// shared resource declared by several nodes appears once.
    pub fn push_global(&mut self, declaration: &str) {
        if !self.globals.iter().any(|existing| existing == declaration) {
            self.globals.push(declaration.to_owned());
        }
    }

    /// Appends one statement to the main body. The terminating `;` is
    /// added during serialization.
    pub fn push_statement(&mut self, statement: String) {
        self.main.push(statement);
    }

    pub fn inputs(&self) -> &[StageVar] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[StageVar] {
        &self.outputs
    }

    pub fn statements(&self) -> &[String] {
        &self.main
    }

    /// Serializes the stage into final source text: preamble, globals,
    /// interface declarations, then the main body in submission order.
    pub fn output(&self) -> String {
        let mut text = String::from("#version 310 es\nprecision highp float;\n\n");

        for global in &self.globals {
            text.push_str(global);
            text.push_str(";\n");
        }
        if !self.globals.is_empty() {
            text.push('\n');
        }

        for var in &self.inputs {
            text.push_str(&format!(
                "layout(location = {}) in {} {};\n",
                var.location,
                var.ty.type_name(),
                var.name
            ));
        }
        for var in &self.outputs {
            text.push_str(&format!(
                "layout(location = {}) out {} {};\n",
                var.location,
                var.ty.type_name(),
                var.name
            ));
        }
        if !self.inputs.is_empty() || !self.outputs.is_empty() {
            text.push('\n');
        }

        text.push_str("void main()\n{\n");
        for statement in &self.main {
            text.push('\t');
            text.push_str(statement);
            text.push_str(";\n");
        }
        text.push_str("}\n");
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations_are_sequential() {
        let mut code = ShaderCode::default();
        assert_eq!(code.push_input("position", PinType::Vec3), 0);
        assert_eq!(code.push_input("uv", PinType::Vec2), 1);
        assert_eq!(code.push_output("out_color", PinType::Vec4), 0);
    }

    #[test]
    fn globals_are_deduplicated() {
        let mut code = ShaderCode::default();
        code.push_global("Sampler2D albedo");
        code.push_global("Sampler2D albedo");
        code.push_global("Sampler2D normal_map");

        let text = code.output();
        assert_eq!(text.matches("Sampler2D albedo;").count(), 1);
        assert!(text.contains("Sampler2D normal_map;"));
    }

    #[test]
    fn output_layout() {
        let mut code = ShaderCode::default();
        code.push_input("uv", PinType::Vec2);
        code.push_output("out_color", PinType::Vec4);
        code.push_statement("float var_1 = abs(uv.x)".to_owned());
        code.push_statement("out_color = float4(var_1, var_1, var_1, 1.000000)".to_owned());

        let text = code.output();
        assert!(text.starts_with("#version 310 es\nprecision highp float;\n"));
        assert!(text.contains("layout(location = 0) in float2 uv;\n"));
        assert!(text.contains("layout(location = 0) out float4 out_color;\n"));
        assert!(text.contains("void main()\n{\n\tfloat var_1 = abs(uv.x);\n"));
        assert!(text.ends_with("}\n"));

        let body_start = text.find("void main()").unwrap();
        let main = &text[body_start..];
        assert_eq!(main.matches(";\n").count(), 2);
    }
}
