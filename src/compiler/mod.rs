use std::collections::HashMap;

use thiserror::Error;

use crate::{
    expression, Expression, Graph, InputPinRef, Node, NodeId, NodeRegistry, OutputPinRef, PinType,
    ShaderCode,
};


#[derive(Error, Debug)]
pub enum CompileError {
    #[error("graph has no root node")]
    MissingRoot,
    #[error("node {0:?} is not in the graph")]
    DanglingNode(NodeId),
    #[error("node {node:?} has no pin {index}")]
    DanglingPin { node: NodeId, index: usize },
    #[error("could not deduce the type of output \"{pin}\" on \"{kind}\" node {node:?}")]
    DeduceFailed {
        node: NodeId,
        kind: String,
        pin: String,
    },
    #[error("no conversion from {from} to {to} for \"{code}\"")]
    InvalidCast {
        from: &'static str,
        to: &'static str,
        code: String,
    },
    #[error("matrix cast from {from} to {to} is not supported")]
    MatrixExpand {
        from: &'static str,
        to: &'static str,
    },
    #[error("{ty} has no literal representation")]
    NoLiteral { ty: &'static str },
    #[error("input \"{pin}\" on node {node:?} has no link and no default value")]
    MissingInput { node: NodeId, pin: String },
    #[error("\"{kind}\" node {node:?} has no compile function and no default value")]
    NoCompileNoDefault { node: NodeId, kind: String },
    #[error("parameter \"{name}\" is already declared by another node")]
    DuplicateParameter { name: String },
    #[error("\"{kind}\" node failed to compile: {source}")]
    Behavior {
        kind: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Memoized result for one output pin: the deduced type (once settled) and
/// the generated expression (once compiled).
#[derive(Default, Debug, Clone)]
pub struct OutputSlot {
    pub ty: Option<PinType>,
    pub expr: Expression,
}

#[derive(Default, Debug, Clone)]
pub struct CompiledNode {
    pub outputs: Vec<OutputSlot>,
    pub is_compiled: bool,
}

/// State of one compilation pass over one stage. Never shared across
/// stages; discarded after the pass.
#[derive(Default, Debug)]
pub struct CompilerState {
    cache: HashMap<NodeId, CompiledNode>,
    pub code: ShaderCode,
    var_counter: usize,
    parameters: HashMap<String, NodeId>,
    errors: Vec<CompileError>,
    failed: bool,
}

impl CompilerState {
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }
}

/// Walks the graph from consumers to producers, once per stage. Behaviors
/// call back into it to resolve their input expressions and append
/// statements; every node compiles at most once per pass.
pub struct ShaderCompiler<'a> {
    graph: &'a Graph,
    registry: &'a NodeRegistry,
    stage: ShaderStage,
    pub state: CompilerState,
}

impl<'a> ShaderCompiler<'a> {
    pub fn new(graph: &'a Graph, registry: &'a NodeRegistry, stage: ShaderStage) -> Self {
        Self {
            graph,
            registry,
            stage,
            state: CompilerState::default(),
        }
    }

    pub fn graph(&self) -> &'a Graph {
        self.graph
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// Records a diagnostic and marks the pass as failed. Compilation keeps
    /// going so one pass can surface every independent problem.
    pub fn error(&mut self, error: CompileError) {
        self.state.failed = true;
        self.state.errors.push(error);
    }

    pub fn push_statement(&mut self, statement: String) {
        self.state.code.push_statement(statement);
    }

    pub fn push_global(&mut self, declaration: &str) {
        self.state.code.push_global(declaration);
    }

    pub fn push_input(&mut self, name: &str, ty: PinType) -> usize {
        self.state.code.push_input(name, ty)
    }

    pub fn push_output(&mut self, name: &str, ty: PinType) -> usize {
        self.state.code.push_output(name, ty)
    }

    /// Claims a shader parameter name for `node`. Each name belongs to at
    /// most one node per pass; a second claimant is reported and gets
    /// `false` back.
    pub fn declare_parameter(&mut self, name: &str, node: NodeId) -> bool {
        match self.state.parameters.get(name) {
            Some(owner) if *owner != node => {
                self.error(CompileError::DuplicateParameter {
                    name: name.to_owned(),
                });
                false
            }
            _ => {
                self.state.parameters.insert(name.to_owned(), node);
                true
            }
        }
    }

    /// Compiles a node's outputs, at most once per pass. Recursion only
    /// ever walks toward producers, which the link layer keeps acyclic.
    pub fn compile_node(&mut self, id: NodeId) {
        if self
            .state
            .cache
            .get(&id)
            .map_or(false, |entry| entry.is_compiled)
        {
            return;
        }

        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            self.error(CompileError::DanglingNode(id));
            return;
        };

        self.entry_mut(id, node.outputs.len());

        // Types first, so a behavior can rely on every output slot having a
        // settled type when it runs.
        for index in 0..node.outputs.len() {
            self.deduce_pin_type(OutputPinRef { node: id, index });
        }

        match self.registry.get(&node.kind) {
            Some(behavior) => {
                if let Err(source) = behavior.compile(self, node) {
                    self.error(CompileError::Behavior {
                        kind: node.kind.clone(),
                        source,
                    });
                }
            }
            None => self.fallback_compile(node),
        }

        self.entry_mut(id, node.outputs.len()).is_compiled = true;
    }

    /// Unregistered kinds degrade to their outputs' default values.
    fn fallback_compile(&mut self, node: &Node) {
        for index in 0..node.outputs.len() {
            match node.outputs[index].default.clone() {
                Some(value) => {
                    let expr = Expression::new(value.to_literal(), value.pin_type());
                    self.submit(node, index, expr);
                }
                None => {
                    self.error(CompileError::NoCompileNoDefault {
                        node: node.id,
                        kind: node.kind.clone(),
                    });
                }
            }
        }
    }

    /// Memoized type deduction for one output pin. `None` means deduction
    /// failed; the failure is recorded here and again at every consumer
    /// that needs a concrete type.
    pub fn deduce_pin_type(&mut self, output: OutputPinRef) -> Option<PinType> {
        if let Some(ty) = self
            .state
            .cache
            .get(&output.node)
            .and_then(|entry| entry.outputs.get(output.index))
            .and_then(|slot| slot.ty)
        {
            return Some(ty);
        }

        let graph = self.graph;
        let Some(node) = graph.node(output.node) else {
            self.error(CompileError::DanglingNode(output.node));
            return None;
        };

        let deduced = match self.registry.get(&node.kind) {
            Some(behavior) => behavior.deduce(self, node, output.index),
            None => node.outputs.get(output.index).map(|pin| pin.ty),
        };

        match deduced {
            Some(ty) if ty != PinType::Undefined => {
                let entry = self.entry_mut(output.node, node.outputs.len());
                if let Some(slot) = entry.outputs.get_mut(output.index) {
                    slot.ty = Some(ty);
                }
                Some(ty)
            }
            _ => {
                self.error(CompileError::DeduceFailed {
                    node: node.id,
                    kind: node.kind.clone(),
                    pin: node
                        .outputs
                        .get(output.index)
                        .map(|pin| pin.name.clone())
                        .unwrap_or_else(|| output.index.to_string()),
                });
                None
            }
        }
    }

    /// Type a consumer sees on one of its inputs: the linked producer's
    /// deduced type, or the pin's own declared type when unlinked.
    pub fn input_type(&mut self, input: InputPinRef) -> Option<PinType> {
        let pin = self.graph.input_pin(input)?;
        match pin.link {
            Some(link) => self.deduce_pin_type(link),
            None => Some(pin.ty),
        }
    }

    /// Source expression feeding an input pin: the linked producer's
    /// compiled output, or the pin's default rendered as a literal. Cast to
    /// `desired` when given.
    pub fn pin_source(&mut self, input: InputPinRef, desired: Option<PinType>) -> Expression {
        let Some(pin) = self.graph.input_pin(input) else {
            if self.graph.node(input.node).is_none() {
                self.error(CompileError::DanglingNode(input.node));
            } else {
                self.error(CompileError::DanglingPin {
                    node: input.node,
                    index: input.index,
                });
            }
            return Expression::invalid();
        };

        let expr = match pin.link {
            Some(link) => {
                self.compile_node(link.node);
                self.state
                    .cache
                    .get(&link.node)
                    .and_then(|entry| entry.outputs.get(link.index))
                    .map(|slot| slot.expr.clone())
                    .unwrap_or_default()
            }
            None => match pin.default_value() {
                Some(value) => Expression::new(value.to_literal(), value.pin_type()),
                None => {
                    self.error(CompileError::MissingInput {
                        node: input.node,
                        pin: pin.name.clone(),
                    });
                    return Expression::invalid();
                }
            },
        };

        if !expr.is_valid() {
            // Upstream already reported why.
            return expr;
        }

        match desired {
            Some(ty) => self.expression_cast(expr, ty),
            None => expr,
        }
    }

    /// Stores the generated expression for one output pin, inlining when a
    /// single consumer will read it and hoisting into a named variable
    /// otherwise, so shared subexpressions are computed once.
    pub fn submit(&mut self, node: &Node, output_index: usize, expr: Expression) {
        let fan_out = node
            .outputs
            .get(output_index)
            .map_or(0, |pin| pin.links.len());

        let stored = if fan_out > 1 {
            self.create_variable(expr)
        } else {
            expr
        };

        let entry = self.entry_mut(node.id, node.outputs.len());
        if let Some(slot) = entry.outputs.get_mut(output_index) {
            slot.expr = stored;
        }
    }

    /// Hoists an expression into a fresh `var_N` declaration, unless it
    /// already is a bare variable.
    pub fn create_variable(&mut self, expr: Expression) -> Expression {
        if expr.is_variable {
            return expr;
        }

        self.state.var_counter += 1;
        let name = format!("var_{}", self.state.var_counter);
        self.push_statement(format!("{} {} = {}", expr.ty.type_name(), name, expr.code));
        Expression::variable(name, expr.ty)
    }

    /// Converts an expression to `target`, following the numeric widening
    /// and swizzle rules. Invalid conversions are reported and produce the
    /// invalid sentinel, which downstream consumers re-report.
    pub fn expression_cast(&mut self, expr: Expression, target: PinType) -> Expression {
        if expr.ty == target || expr.code.is_empty() {
            return expr;
        }

        if !expr.ty.is_convertible(target) {
            self.error(CompileError::InvalidCast {
                from: expr.ty.type_name(),
                to: target.type_name(),
                code: expr.code,
            });
            return Expression::invalid();
        }

        // Same layout under a different name (Vec3 vs Color3).
        if expr.ty.type_name() == target.type_name() {
            let mut expr = expr;
            expr.ty = target;
            return expr;
        }

        if expr.ty.is_scalar() {
            if target.is_scalar() {
                return Expression::new(format!("{}({})", target.type_name(), expr.code), target);
            }

            // Scalar to vector splats through a hoisted variable so the
            // source is evaluated once.
            let variable = self.create_variable(expr);
            let splat =
                vec![variable.code.as_str(); target.component_count() as usize].join(", ");
            return Expression::new(format!("{}({})", target.type_name(), splat), target);
        }

        if expr.ty.is_vector() {
            if target.is_scalar() {
                return Expression::new(format!("{}({}.x)", target.type_name(), expr.code), target);
            }
            return self.vector_cast(expr, target);
        }

        if expr.ty.is_matrix() && target.is_matrix() {
            if target.component_count() < expr.ty.component_count() {
                return Expression::new(format!("{}({})", target.type_name(), expr.code), target);
            }
            self.error(CompileError::MatrixExpand {
                from: expr.ty.type_name(),
                to: target.type_name(),
            });
            return Expression::invalid();
        }

        self.error(CompileError::InvalidCast {
            from: expr.ty.type_name(),
            to: target.type_name(),
            code: expr.code,
        });
        Expression::invalid()
    }

    fn vector_cast(&mut self, expr: Expression, target: PinType) -> Expression {
        const MASKS: [&str; 3] = ["xy", "xyz", "xyzw"];
        const COMPONENTS: [&str; 4] = ["x", "y", "z", "w"];

        let variable = self.create_variable(expr);
        let from = variable.ty.component_count() as usize;
        let to = target.component_count() as usize;

        let Some(pad) = expression::zero(target.component_type()) else {
            self.error(CompileError::NoLiteral {
                ty: target.component_type().type_name(),
            });
            return Expression::invalid();
        };

        if variable.ty.component_type() == target.component_type() {
            if from > to {
                return Expression::new(
                    format!("{}({}.{})", target.type_name(), variable.code, MASKS[to - 2]),
                    target,
                );
            }

            // Widening keeps the source as the leading constructor argument
            // and pads the remaining slots with zeros.
            let mut args = vec![variable.code.clone()];
            args.extend(std::iter::repeat(pad.code).take(to - from));
            return Expression::new(
                format!("{}({})", target.type_name(), args.join(", ")),
                target,
            );
        }

        // Differing base types recast component by component.
        let mut args = Vec::with_capacity(to);
        for i in 0..to {
            if i < from {
                let component = Expression::new(
                    format!("{}.{}", variable.code, COMPONENTS[i]),
                    variable.ty.component_type(),
                );
                let cast = self.expression_cast(component, target.component_type());
                if !cast.is_valid() {
                    return Expression::invalid();
                }
                args.push(cast.code);
            } else {
                args.push(pad.code.clone());
            }
        }

        Expression::new(
            format!("{}({})", target.type_name(), args.join(", ")),
            target,
        )
    }

    fn entry_mut(&mut self, id: NodeId, outputs: usize) -> &mut CompiledNode {
        let entry = self.state.cache.entry(id).or_default();
        if entry.outputs.len() < outputs {
            entry.outputs.resize_with(outputs, OutputSlot::default);
        }
        entry
    }
}

/// Result of compiling one graph into per-stage source text.
#[derive(Debug, Clone)]
pub struct ShaderCompilation {
    pub vertex: String,
    pub fragment: String,
    pub errors: Vec<String>,
    pub failed: bool,
}

impl ShaderCompilation {
    /// Runs the fixed vertex passthrough stage and the fragment stage
    /// rooted at the graph's root node. Diagnostics from both stages
    /// accumulate; the generated text is still returned for inspection
    /// when the pass failed.
    pub fn compile(graph: &Graph, registry: &NodeRegistry) -> ShaderCompilation {
        let mut vertex = ShaderCompiler::new(graph, registry, ShaderStage::Vertex);
        vertex.push_input("position", PinType::Vec2);
        vertex.push_statement("gl_Position = float4(position.xy, 0.000000, 1.000000)".to_owned());

        let mut fragment = ShaderCompiler::new(graph, registry, ShaderStage::Fragment);
        match graph.root() {
            Some(root) => fragment.compile_node(root),
            None => fragment.error(CompileError::MissingRoot),
        }

        let mut errors = Vec::new();
        let mut failed = false;
        for stage in [&vertex, &fragment] {
            failed |= stage.state.failed();
            errors.extend(stage.state.errors().iter().map(|error| error.to_string()));
        }

        ShaderCompilation {
            vertex: vertex.state.code.output(),
            fragment: fragment.state.code.output(),
            errors,
            failed,
        }
    }
}
