use anyhow::anyhow;

use crate::{compiler::ShaderCompiler, Expression, Node, NodeBehavior, PinDecl, PinType, Value};

/// Literal value source. The editor swaps the output pin's default `Value`
/// to retype the node; the declared pin starts as a float zero.
#[derive(Default, Debug, Clone)]
pub struct Constant;

impl NodeBehavior for Constant {
    fn kind(&self) -> &'static str {
        "constant"
    }

    fn outputs(&self) -> Vec<PinDecl> {
        vec![PinDecl::with_default("value", Value::Float(0.0))]
    }

    fn deduce(&self, _compiler: &mut ShaderCompiler, node: &Node, output: usize) -> Option<PinType> {
        let pin = node.outputs.get(output)?;
        match &pin.default {
            Some(value) => Some(value.pin_type()),
            None => Some(pin.ty),
        }
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        let value = node
            .outputs
            .first()
            .and_then(|pin| pin.default.as_ref())
            .ok_or_else(|| anyhow!("constant node has no value"))?;

        let expr = Expression::new(value.to_literal(), value.pin_type());
        compiler.submit(node, 0, expr);
        Ok(())
    }
}
