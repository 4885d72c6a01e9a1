use glam::Vec2;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use crate::{NodeRegistry, PinType, Value, ROOT_KIND};

/// Stable arena key for a node. Ids are never reused within a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Address of an output pin: owning node plus position in the node's
/// ordered output list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputPinRef {
    pub node: NodeId,
    pub index: usize,
}

/// Address of an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputPinRef {
    pub node: NodeId,
    pub index: usize,
}

/// Pin signature entry declared by a node behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct PinDecl {
    pub name: &'static str,
    pub ty: PinType,
    pub default: Option<Value>,
}

impl PinDecl {
    pub fn new(name: &'static str, ty: PinType) -> Self {
        Self {
            name,
            ty,
            default: None,
        }
    }

    pub fn with_default(name: &'static str, value: Value) -> Self {
        Self {
            name,
            ty: value.pin_type(),
            default: Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputPin {
    pub name: String,
    pub ty: PinType,
    pub default: Option<Value>,
    pub link: Option<OutputPinRef>,
}

impl InputPin {
    /// The default participates only while the pin is unlinked.
    pub fn default_value(&self) -> Option<&Value> {
        if self.link.is_some() {
            None
        } else {
            self.default.as_ref()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputPin {
    pub name: String,
    pub ty: PinType,
    pub default: Option<Value>,
    pub links: Vec<InputPinRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: String,
    pub position: Vec2,
    #[serde(default)]
    pub settings: serde_json::Value,
    pub inputs: Vec<InputPin>,
    pub outputs: Vec<OutputPin>,
}

impl Node {
    fn new(id: NodeId, kind: &str) -> Self {
        Self {
            id,
            kind: kind.to_owned(),
            position: Vec2::ZERO,
            settings: serde_json::Value::Null,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Appends an input pin; the returned index is stable for the node's
    /// lifetime.
    pub fn new_input(&mut self, name: &str, ty: PinType) -> usize {
        self.inputs.push(InputPin {
            name: name.to_owned(),
            ty,
            default: None,
            link: None,
        });
        self.inputs.len() - 1
    }

    pub fn new_output(&mut self, name: &str, ty: PinType) -> usize {
        self.outputs.push(OutputPin {
            name: name.to_owned(),
            ty,
            default: None,
            links: Vec::new(),
        });
        self.outputs.len() - 1
    }

    pub fn find_input(&self, name: &str) -> Option<usize> {
        self.inputs.iter().position(|pin| pin.name == name)
    }

    pub fn find_output(&self, name: &str) -> Option<usize> {
        self.outputs.iter().position(|pin| pin.name == name)
    }

    /// Output defaults stand in for generated code only on source nodes;
    /// anything with inputs is expected to compute its outputs.
    pub fn output_default(&self, index: usize) -> Option<&Value> {
        if self.inputs.is_empty() {
            self.outputs.get(index).and_then(|pin| pin.default.as_ref())
        } else {
            None
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown node kind: \"{0}\"")]
    UnknownKind(String),
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),
    #[error("no such pin: {0} on {1:?}")]
    UnknownPin(usize, NodeId),
    #[error("link would connect a node to itself")]
    SelfLink,
    #[error("link would create a cycle")]
    WouldCycle,
    #[error("\"{0}\" nodes can not be removed")]
    NotDestroyable(String),
    #[error("the root node can not be removed")]
    RootNotDestroyable,
    #[error("graph already has a root node")]
    DuplicateRoot,
}

/// Owning arena for the whole node graph. Links are stored by pin address
/// on both endpoints and every mutation keeps the two sides consistent.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    next_id: u32,
}

impl Graph {
    /// Empty graph with the distinguished root node already created.
    pub fn new(registry: &NodeRegistry) -> Result<Self, GraphError> {
        let mut graph = Graph::default();
        graph.create_node(registry, ROOT_KIND)?;
        Ok(graph)
    }

    /// Instantiates a node of a registered kind, building its pins from the
    /// behavior's declared signature.
    pub fn create_node(
        &mut self,
        registry: &NodeRegistry,
        kind: &str,
    ) -> Result<NodeId, GraphError> {
        let behavior = registry
            .get(kind)
            .ok_or_else(|| GraphError::UnknownKind(kind.to_owned()))?;

        if kind == ROOT_KIND && self.root.is_some() {
            return Err(GraphError::DuplicateRoot);
        }

        let id = self.add_node(kind);
        let node = self.node_mut(id).expect("just created");

        for decl in behavior.inputs() {
            let index = node.new_input(decl.name, decl.ty);
            node.inputs[index].default = decl.default;
        }

        for decl in behavior.outputs() {
            let index = node.new_output(decl.name, decl.ty);
            node.outputs[index].default = decl.default;
        }

        if kind == ROOT_KIND {
            self.root = Some(id);
        }

        Ok(id)
    }

    /// Adds a bare node without consulting the registry. Pins are appended
    /// by the caller; used by tests and import paths that carry their own
    /// signatures.
    pub fn add_node(&mut self, kind: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.push(Node::new(id, kind));
        id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn input_pin(&self, pin: InputPinRef) -> Option<&InputPin> {
        self.node(pin.node).and_then(|node| node.inputs.get(pin.index))
    }

    pub fn output_pin(&self, pin: OutputPinRef) -> Option<&OutputPin> {
        self.node(pin.node).and_then(|node| node.outputs.get(pin.index))
    }

    /// Editor-facing validity test: the link must be structurally legal and
    /// the pin types convertible. `link` itself does not re-check types.
    pub fn can_link(&self, input: InputPinRef, output: OutputPinRef) -> bool {
        let Some(input_pin) = self.input_pin(input) else {
            return false;
        };
        let Some(output_pin) = self.output_pin(output) else {
            return false;
        };

        input.node != output.node
            && output_pin.ty.is_convertible(input_pin.ty)
            && !self.reaches_upstream(output.node, input.node)
    }

    /// Connects `input` to `output`, clearing any previous producer of
    /// `input` first. Rejects self-links and links that would close a cycle;
    /// type compatibility is the caller's responsibility (`can_link`).
    pub fn link(&mut self, input: InputPinRef, output: OutputPinRef) -> Result<(), GraphError> {
        if self.input_pin(input).is_none() {
            return Err(self.pin_error(input.node, input.index));
        }
        if self.output_pin(output).is_none() {
            return Err(self.pin_error(output.node, output.index));
        }

        if input.node == output.node {
            return Err(GraphError::SelfLink);
        }

        if self.reaches_upstream(output.node, input.node) {
            return Err(GraphError::WouldCycle);
        }

        self.unlink_input(input);

        self.node_mut(input.node).expect("checked").inputs[input.index].link = Some(output);

        let links = &mut self.node_mut(output.node).expect("checked").outputs[output.index].links;
        if !links.contains(&input) {
            links.push(input);
        }

        Ok(())
    }

    /// Removes the producer link of `input`, if any. Idempotent.
    pub fn unlink_input(&mut self, input: InputPinRef) {
        let Some(link) = self.input_pin(input).and_then(|pin| pin.link) else {
            return;
        };

        self.node_mut(input.node).expect("resolved above").inputs[input.index].link = None;

        if let Some(node) = self.node_mut(link.node) {
            if let Some(pin) = node.outputs.get_mut(link.index) {
                pin.links.retain(|consumer| *consumer != input);
            }
        }
    }

    /// Disconnects every consumer of `output`.
    pub fn unlink_output(&mut self, output: OutputPinRef) {
        let consumers = match self.output_pin(output) {
            Some(pin) => pin.links.clone(),
            None => return,
        };

        for input in consumers {
            self.unlink_input(input);
        }
    }

    /// Destroys a node: unlinks every pin on both ends, then drops the node.
    /// The id is never reused. Kinds whose behavior is not destroyable are
    /// refused; the root is refused even when its kind is unregistered.
    pub fn remove_node(&mut self, registry: &NodeRegistry, id: NodeId) -> Result<(), GraphError> {
        if self.root == Some(id) {
            return Err(GraphError::RootNotDestroyable);
        }

        let node = self.node(id).ok_or(GraphError::UnknownNode(id))?;
        if registry
            .get(&node.kind)
            .map_or(false, |behavior| !behavior.is_destroyable())
        {
            return Err(GraphError::NotDestroyable(node.kind.clone()));
        }
        let inputs = node.inputs.len();
        let outputs = node.outputs.len();

        for index in 0..inputs {
            self.unlink_input(InputPinRef { node: id, index });
        }
        for index in 0..outputs {
            self.unlink_output(OutputPinRef { node: id, index });
        }

        self.nodes.retain(|node| node.id != id);
        Ok(())
    }

    /// True if `target` is `from` or feeds `from` through any chain of
    /// links. Traversal walks input links only, which is acyclic by
    /// construction.
    fn reaches_upstream(&self, from: NodeId, target: NodeId) -> bool {
        if from == target {
            return true;
        }

        let Some(node) = self.node(from) else {
            return false;
        };

        node.inputs
            .iter()
            .filter_map(|pin| pin.link)
            .any(|link| self.reaches_upstream(link.node, target))
    }

    fn pin_error(&self, node: NodeId, index: usize) -> GraphError {
        if self.node(node).is_none() {
            GraphError::UnknownNode(node)
        } else {
            GraphError::UnknownPin(index, node)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> (Graph, NodeId, NodeId) {
        let mut graph = Graph::default();

        let a = graph.add_node("constant");
        let node = graph.node_mut(a).unwrap();
        node.new_output("value", PinType::Float);

        let b = graph.add_node("abs");
        let node = graph.node_mut(b).unwrap();
        node.new_input("in", PinType::Float);
        node.new_output("out", PinType::Float);

        (graph, a, b)
    }

    fn input(node: NodeId, index: usize) -> InputPinRef {
        InputPinRef { node, index }
    }

    fn output(node: NodeId, index: usize) -> OutputPinRef {
        OutputPinRef { node, index }
    }

    #[test]
    fn link_is_two_sided() {
        let (mut graph, a, b) = two_nodes();

        graph.link(input(b, 0), output(a, 0)).unwrap();

        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, Some(output(a, 0)));
        assert_eq!(graph.output_pin(output(a, 0)).unwrap().links, vec![input(b, 0)]);
    }

    #[test]
    fn relink_clears_previous_producer() {
        let (mut graph, a, b) = two_nodes();
        let c = graph.add_node("constant");
        graph.node_mut(c).unwrap().new_output("value", PinType::Float);

        graph.link(input(b, 0), output(a, 0)).unwrap();
        graph.link(input(b, 0), output(c, 0)).unwrap();

        assert!(graph.output_pin(output(a, 0)).unwrap().links.is_empty());
        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, Some(output(c, 0)));
    }

    #[test]
    fn unlink_output_drains_fan_out() {
        let (mut graph, a, b) = two_nodes();
        let c = graph.add_node("abs");
        let node = graph.node_mut(c).unwrap();
        node.new_input("in", PinType::Float);
        node.new_output("out", PinType::Float);

        graph.link(input(b, 0), output(a, 0)).unwrap();
        graph.link(input(c, 0), output(a, 0)).unwrap();
        assert_eq!(graph.output_pin(output(a, 0)).unwrap().links.len(), 2);

        graph.unlink_output(output(a, 0));

        assert!(graph.output_pin(output(a, 0)).unwrap().links.is_empty());
        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, None);
        assert_eq!(graph.input_pin(input(c, 0)).unwrap().link, None);
    }

    #[test]
    fn remove_node_sweeps_peer_links() {
        let (mut graph, a, b) = two_nodes();
        graph.link(input(b, 0), output(a, 0)).unwrap();

        graph.remove_node(&NodeRegistry::default(), a).unwrap();

        assert!(graph.node(a).is_none());
        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, None);
    }

    #[test]
    fn self_links_are_rejected() {
        let (mut graph, _, b) = two_nodes();

        assert_eq!(graph.link(input(b, 0), output(b, 0)), Err(GraphError::SelfLink));
        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, None);
    }

    #[test]
    fn cycles_are_rejected() {
        let mut graph = Graph::default();
        let mut chain = Vec::new();
        for _ in 0..3 {
            let id = graph.add_node("abs");
            let node = graph.node_mut(id).unwrap();
            node.new_input("in", PinType::Float);
            node.new_output("out", PinType::Float);
            chain.push(id);
        }

        graph.link(input(chain[1], 0), output(chain[0], 0)).unwrap();
        graph.link(input(chain[2], 0), output(chain[1], 0)).unwrap();

        assert_eq!(
            graph.link(input(chain[0], 0), output(chain[2], 0)),
            Err(GraphError::WouldCycle)
        );
    }

    #[test]
    fn can_link_checks_types() {
        let mut graph = Graph::default();
        let a = graph.add_node("constant");
        graph.node_mut(a).unwrap().new_output("value", PinType::Mat4);
        let b = graph.add_node("abs");
        graph.node_mut(b).unwrap().new_input("in", PinType::Float);

        assert!(!graph.can_link(input(b, 0), output(a, 0)));
        assert_eq!(graph.input_pin(input(b, 0)).unwrap().link, None);
    }

    #[test]
    fn linked_input_hides_its_default() {
        let (mut graph, a, b) = two_nodes();
        graph.node_mut(b).unwrap().inputs[0].default = Some(Value::Float(1.0));

        assert!(graph.input_pin(input(b, 0)).unwrap().default_value().is_some());
        graph.link(input(b, 0), output(a, 0)).unwrap();
        assert!(graph.input_pin(input(b, 0)).unwrap().default_value().is_none());
    }

    #[test]
    fn graph_serde_round_trip() {
        let (mut graph, a, b) = two_nodes();
        graph.node_mut(a).unwrap().outputs[0].default = Some(Value::Float(2.0));
        graph.link(input(b, 0), output(a, 0)).unwrap();

        let json = serde_json::to_string(&graph).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();

        assert_eq!(back.nodes(), graph.nodes());
        assert_eq!(back.input_pin(input(b, 0)).unwrap().link, Some(output(a, 0)));
    }
}
