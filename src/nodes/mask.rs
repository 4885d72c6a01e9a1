use crate::{
    compiler::ShaderCompiler, pin_type::vector_of, Expression, InputPinRef, Node, NodeBehavior,
    OutputPinRef, PinDecl, PinType,
};

const CHANNELS: [char; 4] = ['r', 'g', 'b', 'a'];

/// Per-component select on a vector. `settings.r/g/b/a` toggle which
/// source components survive; the output narrows to a vector (or scalar)
/// of the selected count. Scalar inputs pass through unchanged.
#[derive(Default, Debug, Clone)]
pub struct ComponentMask;

impl ComponentMask {
    fn selected(node: &Node) -> [bool; 4] {
        let mut masks = [true, false, false, false];
        for (mask, key) in masks.iter_mut().zip(["r", "g", "b", "a"]) {
            if let Some(on) = node.settings.get(key).and_then(serde_json::Value::as_bool) {
                *mask = on;
            }
        }
        masks
    }

    fn swizzle(node: &Node, components: usize) -> String {
        Self::selected(node)
            .iter()
            .take(components)
            .zip(CHANNELS)
            .filter_map(|(on, channel)| on.then_some(channel))
            .collect()
    }
}

impl NodeBehavior for ComponentMask {
    fn kind(&self) -> &'static str {
        "component_mask"
    }

    fn inputs(&self) -> Vec<PinDecl> {
        vec![PinDecl::new("in", PinType::Vec4)]
    }

    fn outputs(&self) -> Vec<PinDecl> {
        vec![PinDecl::new("out", PinType::Float)]
    }

    fn deduce(&self, compiler: &mut ShaderCompiler, node: &Node, _output: usize) -> Option<PinType> {
        let link = node.inputs.first()?.link?;
        let input = compiler.deduce_pin_type(link)?;

        if !input.is_vector() {
            return Some(input);
        }

        let count = Self::swizzle(node, input.component_count() as usize).len() as u32;
        match vector_of(input.component_type(), count) {
            PinType::Undefined => None,
            ty => Some(ty),
        }
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        let output = OutputPinRef {
            node: node.id,
            index: 0,
        };
        let Some(ty) = compiler.deduce_pin_type(output) else {
            return Ok(());
        };

        let input = InputPinRef {
            node: node.id,
            index: 0,
        };
        let source = compiler.pin_source(input, None);
        if !source.is_valid() {
            return Ok(());
        }

        if !source.ty.is_vector() {
            compiler.submit(node, 0, source);
            return Ok(());
        }

        let components = source.ty.component_count() as usize;
        let variable = compiler.create_variable(source);
        let expr = Expression::new(
            format!("{}.{}", variable.code, Self::swizzle(node, components)),
            ty,
        );
        compiler.submit(node, 0, expr);
        Ok(())
    }
}
