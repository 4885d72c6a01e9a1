use std::{collections::HashMap, sync::Arc};

use crate::{compiler::ShaderCompiler, InputPinRef, Node, PinDecl, PinType};

/// Kind string of the distinguished material output node.
pub const ROOT_KIND: &str = "root";

/// Per-kind behavior shared by every node instance of that kind. The node
/// itself only carries data (`kind`, `settings`, pins); everything the
/// compiler needs to know about a kind lives here.
pub trait NodeBehavior: Send + Sync {
    fn kind(&self) -> &'static str;

    fn inputs(&self) -> Vec<PinDecl> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<PinDecl> {
        Vec::new()
    }

    fn is_destroyable(&self) -> bool {
        true
    }

    /// Result type of one output pin, after following links. `None` means
    /// the type could not be settled (reported by the compiler as a deduce
    /// failure). The default keeps the declared pin type.
    fn deduce(&self, compiler: &mut ShaderCompiler, node: &Node, output: usize) -> Option<PinType> {
        let _ = compiler;
        node.outputs.get(output).map(|pin| pin.ty)
    }

    /// Emits code for the node, filling the compiler's output slots for
    /// `node`. Called at most once per node and stage.
    fn compile(&self, compiler: &mut ShaderCompiler, node: &Node) -> anyhow::Result<()>;
}

/// Deduction fallback for pass-through kinds: the type arriving on the
/// node's first input, following its link when present.
pub fn default_deduce(compiler: &mut ShaderCompiler, node: &Node) -> Option<PinType> {
    compiler.input_type(InputPinRef {
        node: node.id,
        index: 0,
    })
}

/// Lookup table from kind string to behavior.
#[derive(Default, Clone)]
pub struct NodeRegistry {
    behaviors: HashMap<String, Arc<dyn NodeBehavior>>,
}

impl NodeRegistry {
    pub fn register<T: NodeBehavior + Default + 'static>(&mut self) {
        self.add(Arc::new(T::default()));
    }

    pub fn add(&mut self, behavior: Arc<dyn NodeBehavior>) {
        self.behaviors.insert(behavior.kind().to_owned(), behavior);
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn NodeBehavior>> {
        self.behaviors.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.behaviors.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.behaviors.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.kinds().collect();
        kinds.sort_unstable();
        f.debug_struct("NodeRegistry").field("kinds", &kinds).finish()
    }
}
