pub mod compiler;

mod expression;
mod graph;
mod pin_type;
mod registry;
mod shader_code;
mod value;

pub mod nodes;

pub use crate::expression::*;
pub use crate::graph::*;
pub use crate::pin_type::*;
pub use crate::registry::*;
pub use crate::shader_code::*;
pub use crate::value::*;

pub use crate::compiler::{CompileError, ShaderCompilation, ShaderCompiler, ShaderStage};

pub use anyhow;
pub use glam;
pub use serde;
pub use serde_derive;
pub use serde_json;
