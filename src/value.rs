use glam::{BVec2, BVec3, BVec4, IVec2, IVec3, IVec4, Mat3, Mat4, UVec2, UVec3, UVec4, Vec2, Vec3, Vec4};
use serde_derive::{Deserialize, Serialize};

use crate::PinType;

/// Typed storage for a pin's default value. Object pins (samplers, textures)
/// carry no inline value and therefore no `Value` variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    BVec2(BVec2),
    BVec3(BVec3),
    BVec4(BVec4),
    IVec2(IVec2),
    IVec3(IVec3),
    IVec4(IVec4),
    UVec2(UVec2),
    UVec3(UVec3),
    UVec4(UVec4),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

fn float_args(values: &[f32]) -> String {
    let args: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    args.join(", ")
}

impl Value {
    pub fn pin_type(&self) -> PinType {
        match self {
            Value::Bool(_) => PinType::Bool,
            Value::Int(_) => PinType::Int,
            Value::UInt(_) => PinType::UInt,
            Value::Float(_) => PinType::Float,
            Value::BVec2(_) => PinType::BVec2,
            Value::BVec3(_) => PinType::BVec3,
            Value::BVec4(_) => PinType::BVec4,
            Value::IVec2(_) => PinType::IVec2,
            Value::IVec3(_) => PinType::IVec3,
            Value::IVec4(_) => PinType::IVec4,
            Value::UVec2(_) => PinType::UVec2,
            Value::UVec3(_) => PinType::UVec3,
            Value::UVec4(_) => PinType::UVec4,
            Value::Vec2(_) => PinType::Vec2,
            Value::Vec3(_) => PinType::Vec3,
            Value::Vec4(_) => PinType::Vec4,
            Value::Mat3(_) => PinType::Mat3,
            Value::Mat4(_) => PinType::Mat4,
        }
    }

    /// Renders the value as a source literal of its own type. The literal
    /// spells the constructor of `ty.type_name()` for everything wider than
    /// a scalar, with float components printed at six decimals.
    pub fn to_literal(&self) -> String {
        fn ctor(ty: PinType, args: String) -> String {
            format!("{}({})", ty.type_name(), args)
        }

        match *self {
            Value::Bool(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) => format!("{v:.6}"),
            Value::BVec2(v) => ctor(PinType::BVec2, format!("{}, {}", v.x, v.y)),
            Value::BVec3(v) => ctor(PinType::BVec3, format!("{}, {}, {}", v.x, v.y, v.z)),
            Value::BVec4(v) => ctor(PinType::BVec4, format!("{}, {}, {}, {}", v.x, v.y, v.z, v.w)),
            Value::IVec2(v) => ctor(PinType::IVec2, format!("{}, {}", v.x, v.y)),
            Value::IVec3(v) => ctor(PinType::IVec3, format!("{}, {}, {}", v.x, v.y, v.z)),
            Value::IVec4(v) => ctor(PinType::IVec4, format!("{}, {}, {}, {}", v.x, v.y, v.z, v.w)),
            Value::UVec2(v) => ctor(PinType::UVec2, format!("{}, {}", v.x, v.y)),
            Value::UVec3(v) => ctor(PinType::UVec3, format!("{}, {}, {}", v.x, v.y, v.z)),
            Value::UVec4(v) => ctor(PinType::UVec4, format!("{}, {}, {}, {}", v.x, v.y, v.z, v.w)),
            Value::Vec2(v) => ctor(PinType::Vec2, float_args(&[v.x, v.y])),
            Value::Vec3(v) => ctor(PinType::Vec3, float_args(&[v.x, v.y, v.z])),
            Value::Vec4(v) => ctor(PinType::Vec4, float_args(&[v.x, v.y, v.z, v.w])),
            Value::Mat3(m) => ctor(PinType::Mat3, float_args(&m.to_cols_array())),
            Value::Mat4(m) => ctor(PinType::Mat4, float_args(&m.to_cols_array())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_literals() {
        assert_eq!(Value::Bool(true).to_literal(), "true");
        assert_eq!(Value::Int(-3).to_literal(), "-3");
        assert_eq!(Value::UInt(7).to_literal(), "7");
        assert_eq!(Value::Float(2.0).to_literal(), "2.000000");
    }

    #[test]
    fn vector_literals() {
        assert_eq!(
            Value::Vec3(Vec3::new(1.0, 0.5, 0.0)).to_literal(),
            "float3(1.000000, 0.500000, 0.000000)"
        );
        assert_eq!(Value::IVec2(IVec2::new(4, -2)).to_literal(), "int2(4, -2)");
        assert_eq!(
            Value::BVec2(BVec2::new(true, false)).to_literal(),
            "bool2(true, false)"
        );
    }

    #[test]
    fn value_types_round_trip() {
        let value = Value::Vec4(Vec4::splat(0.25));
        assert_eq!(value.pin_type(), PinType::Vec4);

        let json = serde_json::to_string(&value).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }
}
