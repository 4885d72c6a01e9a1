use anyhow::bail;

use crate::{compiler::ShaderCompiler, Expression, InputPinRef, Node, NodeBehavior, PinDecl, PinType};

fn parameter_name(node: &Node) -> anyhow::Result<&str> {
    let name = node
        .settings
        .get("name")
        .and_then(serde_json::Value::as_str)
        .unwrap_or("");
    if name.is_empty() {
        bail!("{} node has no parameter name", node.kind);
    }
    Ok(name)
}

/// Standalone sampler object parameter. The produced value carries no
/// shading expression of its own; wiring it into a texture node selects
/// which sampler object the material binds at setup time.
#[derive(Default, Debug, Clone)]
pub struct Sampler;

impl NodeBehavior for Sampler {
    fn kind(&self) -> &'static str {
        "sampler"
    }

    fn outputs(&self) -> Vec<PinDecl> {
        vec![PinDecl::new("sampler", PinType::Sampler)]
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        let name = parameter_name(node)?;
        if !compiler.declare_parameter(name, node.id) {
            return Ok(());
        }
        compiler.push_global(&format!("Sampler {name}"));
        compiler.submit(node, 0, Expression::variable(name, PinType::Sampler));
        Ok(())
    }
}

/// Samples a 2-D texture parameter. The parameter name comes from
/// `settings.name` and is declared once at file scope per stage; the
/// sampled value fans out to a color output plus per-channel floats.
#[derive(Default, Debug, Clone)]
pub struct TextureSample;

impl NodeBehavior for TextureSample {
    fn kind(&self) -> &'static str {
        "texture_sample"
    }

    fn inputs(&self) -> Vec<PinDecl> {
        vec![
            PinDecl::new("sampler", PinType::Sampler),
            PinDecl::new("uv", PinType::Vec2),
        ]
    }

    fn outputs(&self) -> Vec<PinDecl> {
        vec![
            PinDecl::new("color", PinType::Color4),
            PinDecl::new("r", PinType::Float),
            PinDecl::new("g", PinType::Float),
            PinDecl::new("b", PinType::Float),
            PinDecl::new("a", PinType::Float),
        ]
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        let name = parameter_name(node)?;
        if !compiler.declare_parameter(name, node.id) {
            return Ok(());
        }
        compiler.push_global(&format!("Sampler2D {name}"));

        // A wired sampler picks the sampler object bound at material setup;
        // it does not change the sampled expression, but its parameter must
        // still be declared.
        if let Some(sampler) = node.inputs.first().and_then(|pin| pin.link) {
            compiler.compile_node(sampler.node);
        }

        let uv_ref = InputPinRef {
            node: node.id,
            index: 1,
        };
        let uv = match node.inputs.get(1).and_then(|pin| pin.link) {
            Some(_) => compiler.pin_source(uv_ref, Some(PinType::Vec2)),
            None => Expression::variable("input.uv[0]", PinType::Vec2),
        };
        if !uv.is_valid() {
            return Ok(());
        }

        let mut sample = Expression::new(format!("texture({name}, {})", uv.code), PinType::Color4);

        // Shared by up to five outputs; hoist once instead of sampling per
        // consumer.
        let consumers: usize = node.outputs.iter().map(|pin| pin.links.len()).sum();
        if consumers > 1 {
            sample = compiler.create_variable(sample);
        }

        compiler.submit(node, 0, sample.clone());
        for channel in 0..4 {
            compiler.submit(node, channel + 1, sample.component(channel));
        }
        Ok(())
    }
}
