use anyhow::bail;

use crate::{compiler::ShaderCompiler, Expression, Node, NodeBehavior, PinDecl, PinType};

/// Scene-global inputs all read a field of the per-frame `globals` uniform
/// block. The emitted expression is a plain variable, so fan-out never
/// hoists it.
macro_rules! scene_input {
    ($behavior:ident, $kind:literal, $field:literal, $ty:expr) => {
        #[derive(Default, Debug, Clone)]
        pub struct $behavior;

        impl NodeBehavior for $behavior {
            fn kind(&self) -> &'static str {
                $kind
            }

            fn outputs(&self) -> Vec<PinDecl> {
                vec![PinDecl::new("out", $ty)]
            }

            fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
                compiler.submit(
                    node,
                    0,
                    Expression::variable(concat!("globals.", $field), $ty),
                );
                Ok(())
            }
        }
    };
}

scene_input!(Time, "time", "time", PinType::Float);
scene_input!(DeltaTime, "delta_time", "delta_time", PinType::Float);
scene_input!(Gamma, "gamma", "gamma", PinType::Float);
scene_input!(Fov, "fov", "fov", PinType::Float);
scene_input!(OrthoWidth, "ortho_width", "ortho_width", PinType::Float);
scene_input!(OrthoHeight, "ortho_height", "ortho_height", PinType::Float);
scene_input!(NearClipPlane, "near_clip_plane", "near_clip_plane", PinType::Float);
scene_input!(FarClipPlane, "far_clip_plane", "far_clip_plane", PinType::Float);
scene_input!(AspectRatio, "aspect_ratio", "aspect_ratio", PinType::Float);
scene_input!(CameraProjectionMode, "camera_projection_mode", "camera_projection_mode", PinType::Int);
scene_input!(Size, "size", "size", PinType::Vec2);
scene_input!(DepthRange, "depth_range", "depth_range", PinType::Vec2);
scene_input!(CameraLocation, "camera_location", "camera_location", PinType::Vec3);
scene_input!(CameraForward, "camera_forward", "camera_forward", PinType::Vec3);
scene_input!(CameraRight, "camera_right", "camera_right", PinType::Vec3);
scene_input!(CameraUp, "camera_up", "camera_up", PinType::Vec3);
scene_input!(Viewport, "viewport", "viewport", PinType::Vec4);
scene_input!(Projection, "projection", "projection", PinType::Mat4);
scene_input!(View, "view", "view", PinType::Mat4);
scene_input!(ProjView, "projview", "projview", PinType::Mat4);
scene_input!(InvProjView, "inv_projview", "inv_projview", PinType::Mat4);

/// Interpolated texture coordinates; `settings.index` selects one of the
/// eight UV channels.
#[derive(Default, Debug, Clone)]
pub struct Uv;

impl Uv {
    fn channel(node: &Node) -> anyhow::Result<u64> {
        let index = node
            .settings
            .get("index")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0);
        if index > 7 {
            bail!("uv channel {index} is out of range (0..=7)");
        }
        Ok(index)
    }
}

impl NodeBehavior for Uv {
    fn kind(&self) -> &'static str {
        "uv"
    }

    fn outputs(&self) -> Vec<PinDecl> {
        vec![PinDecl::new("uv", PinType::Vec2)]
    }

    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()> {
        let index = Self::channel(node)?;
        compiler.submit(
            node,
            0,
            Expression::variable(format!("input.uv[{index}]"), PinType::Vec2),
        );
        Ok(())
    }
}
