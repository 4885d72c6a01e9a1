use crate::{
    compiler::ShaderCompiler, default_deduce, pin_type::resolve, Expression, InputPinRef, Node,
    NodeBehavior, OutputPinRef, PinDecl, PinType, Value,
};

fn first_input(node: &Node) -> InputPinRef {
    InputPinRef {
        node: node.id,
        index: 0,
    }
}

fn output(node: &Node) -> OutputPinRef {
    OutputPinRef {
        node: node.id,
        index: 0,
    }
}

/// Unary intrinsic call. `abs` keeps integer inputs integral (booleans
/// promote to float), the trigonometric kinds force full float promotion.
macro_rules! unary_function {
    ($behavior:ident, $kind:literal, $promote:ident) => {
        #[derive(Default, Debug, Clone)]
        pub struct $behavior;

        impl NodeBehavior for $behavior {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn inputs(&self) -> Vec<PinDecl> {
                vec![PinDecl::with_default("in", Value::Float(0.0))]
            }

            fn outputs(&self) -> Vec<PinDecl> {
                vec![PinDecl::new("out", PinType::Float)]
            }

            fn deduce(
                &self,
                compiler: &mut ShaderCompiler,
                node: &Node,
                _output: usize,
            ) -> Option<PinType> {
                Some(default_deduce(compiler, node)?.$promote())
            }

            fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
                let Some(ty) = compiler.deduce_pin_type(output(node)) else {
                    return Ok(());
                };

                let source = compiler.pin_source(first_input(node), Some(ty));
                if !source.is_valid() {
                    return Ok(());
                }

                let expr = Expression::new(format!(concat!($kind, "({})"), source.code), ty);
                compiler.submit(node, 0, expr);
                Ok(())
            }
        }
    };
}

unary_function!(Abs, "abs", promote_to_float);
unary_function!(Sin, "sin", floating);
unary_function!(Cos, "cos", floating);

/// Binary arithmetic operator. The output type widens both operand types
/// with `resolve`, and both operands are cast to it before emission.
macro_rules! binary_operator {
    ($behavior:ident, $kind:literal, $op:literal) => {
        #[derive(Default, Debug, Clone)]
        pub struct $behavior;

        impl NodeBehavior for $behavior {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn inputs(&self) -> Vec<PinDecl> {
                vec![
                    PinDecl::with_default("a", Value::Float(0.0)),
                    PinDecl::with_default("b", Value::Float(0.0)),
                ]
            }

            fn outputs(&self) -> Vec<PinDecl> {
                vec![PinDecl::new("out", PinType::Float)]
            }

            fn deduce(
                &self,
                compiler: &mut ShaderCompiler,
                node: &Node,
                _output: usize,
            ) -> Option<PinType> {
                let a = compiler.input_type(first_input(node))?;
                let b = compiler.input_type(InputPinRef {
                    node: node.id,
                    index: 1,
                })?;
                match resolve(a, b) {
                    PinType::Undefined => None,
                    ty => Some(ty),
                }
            }

            fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
                let Some(ty) = compiler.deduce_pin_type(output(node)) else {
                    return Ok(());
                };

                let a = compiler.pin_source(first_input(node), Some(ty));
                let b = compiler.pin_source(
                    InputPinRef {
                        node: node.id,
                        index: 1,
                    },
                    Some(ty),
                );
                if !a.is_valid() || !b.is_valid() {
                    return Ok(());
                }

                let expr = Expression::new(format!("({} {} {})", a.code, $op, b.code), ty);
                compiler.submit(node, 0, expr);
                Ok(())
            }
        }
    };
}

binary_operator!(Add, "add", "+");
binary_operator!(Sub, "sub", "-");
binary_operator!(Mul, "mul", "*");
binary_operator!(Div, "div", "/");
