use serde_derive::{Deserialize, Serialize};

const SCALAR: u32 = 1 << 0;
const VECTOR: u32 = 1 << 1;
const MATRIX: u32 = 1 << 2;
const OBJECT: u32 = 1 << 3;

/// Closed classification of pin value kinds. Each concrete variant carries
/// exactly one category flag in the low bits plus a unique identity bit.
#[repr(u32)]
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinType {
    #[default]
    Undefined = 0,

    Bool = (1 << 4) | SCALAR,
    Int = (1 << 5) | SCALAR,
    UInt = (1 << 6) | SCALAR,
    Float = (1 << 7) | SCALAR,

    BVec2 = (1 << 8) | VECTOR,
    BVec3 = (1 << 9) | VECTOR,
    BVec4 = (1 << 10) | VECTOR,
    IVec2 = (1 << 11) | VECTOR,
    IVec3 = (1 << 12) | VECTOR,
    IVec4 = (1 << 13) | VECTOR,
    UVec2 = (1 << 14) | VECTOR,
    UVec3 = (1 << 15) | VECTOR,
    UVec4 = (1 << 16) | VECTOR,
    Vec2 = (1 << 17) | VECTOR,
    Vec3 = (1 << 18) | VECTOR,
    Color3 = (1 << 19) | VECTOR,
    Vec4 = (1 << 20) | VECTOR,
    Color4 = (1 << 21) | VECTOR,

    Mat3 = (1 << 22) | MATRIX,
    Mat4 = (1 << 23) | MATRIX,

    Sampler = (1 << 24) | OBJECT,
    Texture2D = (1 << 25) | OBJECT,
}

impl PinType {
    pub const fn is_scalar(self) -> bool {
        self as u32 & SCALAR != 0
    }

    pub const fn is_vector(self) -> bool {
        self as u32 & VECTOR != 0
    }

    pub const fn is_numeric(self) -> bool {
        self as u32 & (SCALAR | VECTOR) != 0
    }

    pub const fn is_matrix(self) -> bool {
        self as u32 & MATRIX != 0
    }

    pub const fn is_object(self) -> bool {
        self as u32 & OBJECT != 0
    }

    /// Two types can be linked or cast between iff they are equal, both
    /// numeric, or both matrices.
    pub const fn is_convertible(self, other: PinType) -> bool {
        self as u32 == other as u32
            || (self.is_numeric() && other.is_numeric())
            || (self.is_matrix() && other.is_matrix())
    }

    pub const fn component_count(self) -> u32 {
        use PinType::*;
        match self {
            Bool | Int | UInt | Float => 1,
            BVec2 | IVec2 | UVec2 | Vec2 => 2,
            BVec3 | IVec3 | UVec3 | Vec3 | Color3 => 3,
            BVec4 | IVec4 | UVec4 | Vec4 | Color4 => 4,
            Mat3 => 9,
            Mat4 => 16,
            Undefined | Sampler | Texture2D => 0,
        }
    }

    /// Strips vector/matrix structure down to the base scalar kind.
    pub const fn component_type(self) -> PinType {
        use PinType::*;
        match self {
            Bool | BVec2 | BVec3 | BVec4 => Bool,
            Int | IVec2 | IVec3 | IVec4 => Int,
            UInt | UVec2 | UVec3 | UVec4 => UInt,
            Float | Vec2 | Vec3 | Color3 | Vec4 | Color4 | Mat3 | Mat4 => Float,
            Undefined | Sampler | Texture2D => Undefined,
        }
    }

    /// Boolean kinds map to the same-length float kind, other numeric kinds
    /// are unchanged.
    pub const fn promote_to_float(self) -> PinType {
        use PinType::*;
        match self {
            Bool => Float,
            BVec2 => Vec2,
            BVec3 => Vec3,
            BVec4 => Vec4,
            other => other,
        }
    }

    /// Same-length float kind of any numeric type.
    pub const fn floating(self) -> PinType {
        use PinType::*;
        match self.component_count() {
            1 => Float,
            2 => Vec2,
            3 => Vec3,
            4 => Vec4,
            _ => Undefined,
        }
    }

    /// Shading-dialect type name used in declarations and constructor calls.
    pub const fn type_name(self) -> &'static str {
        use PinType::*;
        match self {
            Bool => "bool",
            Int => "int",
            UInt => "uint",
            Float => "float",
            BVec2 => "bool2",
            BVec3 => "bool3",
            BVec4 => "bool4",
            IVec2 => "int2",
            IVec3 => "int3",
            IVec4 => "int4",
            UVec2 => "uint2",
            UVec3 => "uint3",
            UVec4 => "uint4",
            Vec2 => "float2",
            Vec3 | Color3 => "float3",
            Vec4 | Color4 => "float4",
            Mat3 => "float3x3",
            Mat4 => "float4x4",
            Sampler => "Sampler",
            Texture2D => "Sampler2D",
            Undefined => "Undefined",
        }
    }
}

/// Vector (or scalar, for `components == 1`) type with the given base kind.
pub const fn vector_of(base: PinType, components: u32) -> PinType {
    use PinType::*;
    match (base, components) {
        (Bool, 1) => Bool,
        (Bool, 2) => BVec2,
        (Bool, 3) => BVec3,
        (Bool, 4) => BVec4,
        (Int, 1) => Int,
        (Int, 2) => IVec2,
        (Int, 3) => IVec3,
        (Int, 4) => IVec4,
        (UInt, 1) => UInt,
        (UInt, 2) => UVec2,
        (UInt, 3) => UVec3,
        (UInt, 4) => UVec4,
        (Float, 1) => Float,
        (Float, 2) => Vec2,
        (Float, 3) => Vec3,
        (Float, 4) => Vec4,
        _ => Undefined,
    }
}

/// Widened common type of two numeric operands: the longer vector length,
/// with the base kind picked by priority float > bool > uint > int.
pub fn resolve(a: PinType, b: PinType) -> PinType {
    if !a.is_numeric() || !b.is_numeric() {
        return PinType::Undefined;
    }

    let components = a.component_count().max(b.component_count());
    let bases = [a.component_type(), b.component_type()];

    let base = if bases.contains(&PinType::Float) {
        PinType::Float
    } else if bases.contains(&PinType::Bool) {
        PinType::Bool
    } else if bases.contains(&PinType::UInt) {
        PinType::UInt
    } else {
        PinType::Int
    };

    vector_of(base, components)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PinType; 23] = [
        PinType::Undefined,
        PinType::Bool,
        PinType::Int,
        PinType::UInt,
        PinType::Float,
        PinType::BVec2,
        PinType::BVec3,
        PinType::BVec4,
        PinType::IVec2,
        PinType::IVec3,
        PinType::IVec4,
        PinType::UVec2,
        PinType::UVec3,
        PinType::UVec4,
        PinType::Vec2,
        PinType::Vec3,
        PinType::Color3,
        PinType::Vec4,
        PinType::Color4,
        PinType::Mat3,
        PinType::Mat4,
        PinType::Sampler,
        PinType::Texture2D,
    ];

    #[test]
    fn categories_are_exclusive() {
        for ty in ALL {
            let flags = [ty.is_scalar(), ty.is_vector(), ty.is_matrix(), ty.is_object()];
            let count = flags.iter().filter(|&&x| x).count();
            if ty == PinType::Undefined {
                assert_eq!(count, 0);
            } else {
                assert_eq!(count, 1, "{ty:?}");
            }
        }
    }

    #[test]
    fn convertibility_is_symmetric() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.is_convertible(b), b.is_convertible(a), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn matrix_and_scalar_do_not_convert() {
        assert!(!PinType::Float.is_convertible(PinType::Mat4));
        assert!(!PinType::Mat3.is_convertible(PinType::Vec3));
        assert!(PinType::Mat3.is_convertible(PinType::Mat4));
        assert!(PinType::Float.is_convertible(PinType::UVec3));
    }

    #[test]
    fn component_structure() {
        assert_eq!(PinType::Color4.component_count(), 4);
        assert_eq!(PinType::Mat3.component_count(), 9);
        assert_eq!(PinType::Sampler.component_count(), 0);
        assert_eq!(PinType::BVec3.component_type(), PinType::Bool);
        assert_eq!(PinType::Mat4.component_type(), PinType::Float);
        assert_eq!(PinType::UInt.component_type(), PinType::UInt);
    }

    #[test]
    fn resolve_widens() {
        assert_eq!(resolve(PinType::Float, PinType::IVec3), PinType::Vec3);
        assert_eq!(resolve(PinType::Int, PinType::UInt), PinType::UInt);
        assert_eq!(resolve(PinType::Bool, PinType::IVec2), PinType::BVec2);
        assert_eq!(resolve(PinType::Int, PinType::Int), PinType::Int);
        assert_eq!(resolve(PinType::Mat3, PinType::Float), PinType::Undefined);
        assert_eq!(resolve(PinType::Vec4, PinType::Sampler), PinType::Undefined);
    }

    #[test]
    fn float_promotion() {
        assert_eq!(PinType::Bool.promote_to_float(), PinType::Float);
        assert_eq!(PinType::BVec4.promote_to_float(), PinType::Vec4);
        assert_eq!(PinType::IVec2.promote_to_float(), PinType::IVec2);
        assert_eq!(PinType::Vec3.promote_to_float(), PinType::Vec3);
    }
}
