pub mod constant;
pub mod inputs;
pub mod mask;
pub mod math;
pub mod root;
pub mod texture;


use crate::NodeRegistry;

pub use self::constant::Constant;
pub use self::inputs::{
    AspectRatio, CameraForward, CameraLocation, CameraProjectionMode, CameraRight, CameraUp,
    DeltaTime, DepthRange, FarClipPlane, Fov, Gamma, InvProjView, NearClipPlane, OrthoHeight,
    OrthoWidth, ProjView, Projection, Size, Time, Uv, View, Viewport,
};
pub use self::mask::ComponentMask;
pub use self::math::{Abs, Add, Cos, Div, Mul, Sin, Sub};
pub use self::root::Root;
pub use self::texture::{Sampler, TextureSample};

pub fn add_default_nodes(registry: &mut NodeRegistry) {
    registry.register::<Root>();
    registry.register::<Constant>();
    registry.register::<Time>();
    registry.register::<DeltaTime>();
    registry.register::<Gamma>();
    registry.register::<Fov>();
    registry.register::<OrthoWidth>();
    registry.register::<OrthoHeight>();
    registry.register::<NearClipPlane>();
    registry.register::<FarClipPlane>();
    registry.register::<AspectRatio>();
    registry.register::<CameraProjectionMode>();
    registry.register::<Size>();
    registry.register::<DepthRange>();
    registry.register::<CameraLocation>();
    registry.register::<CameraForward>();
    registry.register::<CameraRight>();
    registry.register::<CameraUp>();
    registry.register::<Viewport>();
    registry.register::<Projection>();
    registry.register::<View>();
    registry.register::<ProjView>();
    registry.register::<InvProjView>();
    registry.register::<Uv>();
    registry.register::<ComponentMask>();
    registry.register::<Abs>();
    registry.register::<Sin>();
    registry.register::<Cos>();
    registry.register::<Add>();
    registry.register::<Sub>();
    registry.register::<Mul>();
    registry.register::<Div>();
    registry.register::<Sampler>();
    registry.register::<TextureSample>();
}

pub fn default_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::default();
    add_default_nodes(&mut registry);
    registry
}
