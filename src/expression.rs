use serde_derive::{Deserialize, Serialize};

use crate::PinType;

/// A fragment of generated source tagged with its value type.
///
/// `is_variable` marks `code` as a bare identifier that can be referenced
/// any number of times without recomputation; anything else has to be
/// hoisted into a named variable before reuse.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    pub code: String,
    pub ty: PinType,
    pub is_variable: bool,
}

impl Expression {
    pub fn new(code: impl Into<String>, ty: PinType) -> Self {
        Self {
            code: code.into(),
            ty,
            is_variable: false,
        }
    }

    pub fn variable(code: impl Into<String>, ty: PinType) -> Self {
        Self {
            code: code.into(),
            ty,
            is_variable: true,
        }
    }

    /// The canonical invalid/unset sentinel.
    pub fn invalid() -> Self {
        Self::default()
    }

    /// An expression is valid unless its type is `Undefined`.
    pub fn is_valid(&self) -> bool {
        self.ty != PinType::Undefined
    }

    /// `index`-th component of the expression, as the component type.
    ///
    /// Components the source does not have yield a zero literal instead of
    /// an error; node authors rely on this when wiring narrow vectors into
    /// wide slots.
    pub fn component(&self, index: usize) -> Expression {
        let base = self.ty.component_type();

        if self.ty.is_scalar() && index == 0 {
            return self.clone();
        }

        if self.ty.is_vector() && (index as u32) < self.ty.component_count() {
            const SWIZZLE: [char; 4] = ['x', 'y', 'z', 'w'];
            return Expression::new(format!("{}.{}", self.code, SWIZZLE[index]), base);
        }

        zero(base).unwrap_or_default()
    }

    pub fn x(&self) -> Expression {
        self.component(0)
    }

    pub fn y(&self) -> Expression {
        self.component(1)
    }

    pub fn z(&self) -> Expression {
        self.component(2)
    }

    pub fn w(&self) -> Expression {
        self.component(3)
    }
}

fn splat(ty: PinType, scalar: &str) -> Expression {
    let count = ty.component_count() as usize;
    if count <= 1 {
        return Expression::new(scalar, ty);
    }

    let args = vec![scalar; count].join(", ");
    Expression::new(format!("{}({})", ty.type_name(), args), ty)
}

fn constant(ty: PinType, value: f32) -> Option<Expression> {
    let scalar = match ty.component_type() {
        PinType::Bool => {
            if value != 0.0 {
                "true".to_owned()
            } else {
                "false".to_owned()
            }
        }
        PinType::Int | PinType::UInt => format!("{}", value as i64),
        PinType::Float => format!("{value:.6}"),
        // Object types have no literal form.
        _ => return None,
    };

    Some(splat(ty, &scalar))
}

/// Zero literal of `ty`, or `None` for object/undefined types.
pub fn zero(ty: PinType) -> Option<Expression> {
    constant(ty, 0.0)
}

/// One literal of `ty`, or `None` for object/undefined types.
pub fn one(ty: PinType) -> Option<Expression> {
    constant(ty, 1.0)
}

/// One-half literal of `ty`; truncates to zero for integer kinds.
pub fn half(ty: PinType) -> Option<Expression> {
    constant(ty, 0.5)
}
