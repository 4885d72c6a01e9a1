use glam::Vec3;

use crate::{compiler::ShaderCompiler, InputPinRef, Node, NodeBehavior, PinDecl, PinType, Value, ROOT_KIND};

/// Fragment-stage material output. Its inputs are the shader's final
/// outputs; it produces no expressions of its own, only `out_<name>`
/// declarations and assignments for the inputs that are actually wired.
#[derive(Default, Debug, Clone)]
pub struct Root;

impl NodeBehavior for Root {
    fn kind(&self) -> &'static str {
        ROOT_KIND
    }

    fn inputs(&self) -> Vec<PinDecl> {
        vec![
            color(PinDecl::with_default("base_color", Value::Vec3(Vec3::ZERO))),
            PinDecl::with_default("opacity", Value::Float(1.0)),
            color(PinDecl::with_default("emissive", Value::Vec3(Vec3::ZERO))),
            PinDecl::with_default("specular", Value::Float(0.0)),
            PinDecl::with_default("metalness", Value::Float(0.0)),
            PinDecl::with_default("roughness", Value::Float(0.0)),
            PinDecl::with_default("ao", Value::Float(1.0)),
            PinDecl::new("normal", PinType::Vec3),
            PinDecl::with_default("position_offset", Value::Vec3(Vec3::ZERO)),
        ]
    }

    fn is_destroyable(&self) -> bool {
        false
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        for (index, pin) in node.inputs.iter().enumerate() {
            if pin.link.is_none() {
                continue;
            }

            let input = InputPinRef {
                node: node.id,
                index,
            };
            let source = compiler.pin_source(input, Some(pin.ty));
            if !source.is_valid() {
                continue;
            }

            compiler.push_output(&format!("out_{}", pin.name), pin.ty);
            compiler.push_statement(format!("out_{} = {}", pin.name, source.code));
        }
        Ok(())
    }
}

fn color(mut decl: PinDecl) -> PinDecl {
    decl.ty = PinType::Color3;
    decl
}
