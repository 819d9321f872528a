use crate::filters::Filter;
use crate::foundation::core::IntRect;
use crate::foundation::error::{FxError, FxResult};
use crate::graph::attr::AttributeValue;
use crate::graph::eval::{EvalOptions, Evaluator};
use crate::graph::node::{Arity, Input, Node, NodeId, NodeKind, SurfaceId};
use crate::raster::buffer::RasterBuffer;

/// Arena of filter nodes plus the leaf rasters they read from.
///
/// Nodes reference inputs by handle, so fan-out is free and the graph never owns cycles:
/// [`FilterGraph::set_input`] rejects any binding that would close one.
#[derive(Default)]
pub struct FilterGraph {
    nodes: Vec<Node>,
    surfaces: Vec<RasterBuffer>,
}

impl std::fmt::Debug for FilterGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterGraph")
            .field("nodes", &self.nodes.len())
            .field("surfaces", &self.surfaces.len())
            .finish()
    }
}

impl FilterGraph {
    /// Empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf raster. It is placed at the filter-space origin.
    pub fn add_surface(&mut self, surface: RasterBuffer) -> SurfaceId {
        self.surfaces.push(surface);
        SurfaceId((self.surfaces.len() - 1) as u32)
    }

    /// Leaf raster behind `id`.
    pub fn surface(&self, id: SurfaceId) -> FxResult<&RasterBuffer> {
        self.surfaces
            .get(id.index())
            .ok_or_else(|| FxError::configuration(format!("unknown surface {}", id.0)))
    }

    /// Create a node of `kind` with default attributes and no inputs bound.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node::new(kind));
        NodeId((self.nodes.len() - 1) as u32)
    }

    /// Kind of `node`.
    pub fn kind(&self, node: NodeId) -> FxResult<NodeKind> {
        Ok(self.node(node)?.kind)
    }

    pub(crate) fn node(&self, node: NodeId) -> FxResult<&Node> {
        self.nodes
            .get(node.index())
            .ok_or_else(|| FxError::configuration(format!("unknown node {}", node.0)))
    }

    fn node_mut(&mut self, node: NodeId) -> FxResult<&mut Node> {
        self.nodes
            .get_mut(node.index())
            .ok_or_else(|| FxError::configuration(format!("unknown node {}", node.0)))
    }

    /// Bind `input` to the named slot of `node`.
    ///
    /// Slot names are `in` and `in2` for fixed-arity kinds and `in0`, `in1`, ... for
    /// [`NodeKind::Composite`].
    pub fn set_input(&mut self, node: NodeId, slot: &str, input: impl Into<Input>) -> FxResult<()> {
        let input = input.into();
        let kind = self.kind(node)?;
        let idx = kind.slot_index(slot).ok_or_else(|| {
            FxError::configuration(format!("{kind} has no input slot `{slot}`"))
        })?;
        match input {
            Input::Surface(s) => {
                self.surface(s)?;
            }
            Input::Node(upstream) => {
                self.node(upstream)?;
                if self.reaches(upstream, node)? {
                    return Err(FxError::configuration(format!(
                        "binding node {} to {kind}.{slot} would create a cycle",
                        upstream.0
                    )));
                }
            }
        }
        self.node_mut(node)?.bind(idx, input);
        Ok(())
    }

    /// True when `target` is `from` or one of its transitive inputs.
    fn reaches(&self, from: NodeId, target: NodeId) -> FxResult<bool> {
        let mut stack = vec![from];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(n) = stack.pop() {
            if n == target {
                return Ok(true);
            }
            if std::mem::replace(&mut seen[n.index()], true) {
                continue;
            }
            stack.extend(self.node(n)?.bound_nodes());
        }
        Ok(false)
    }

    /// Set a typed attribute on `node`. Unknown names and mismatched value shapes are
    /// configuration errors.
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: impl Into<AttributeValue>,
    ) -> FxResult<()> {
        let value = value.into();
        let n = self.node_mut(node)?;
        let kind = n.kind;
        n.filter.set_attribute(name, &value).map_err(|e| match e {
            FxError::Configuration(msg) => FxError::configuration(format!("{kind}: {msg}")),
            other => other,
        })
    }

    /// Set an attribute from a JSON value, using the same shapes as [`AttributeValue`].
    pub fn set_attribute_json(
        &mut self,
        node: NodeId,
        name: &str,
        value: &serde_json::Value,
    ) -> FxResult<()> {
        let value = AttributeValue::from_json(name, value)?;
        self.set_attribute(node, name, value)
    }

    /// Check that every node reachable from `root` has all required inputs bound.
    ///
    /// Composite nodes need at least one input and no gaps in `in0..inN`.
    pub fn validate(&self, root: NodeId) -> FxResult<()> {
        let mut stack = vec![root];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            if std::mem::replace(&mut seen[id.index()], true) {
                continue;
            }
            if node.kind.arity() == Arity::Variadic && node.inputs.is_empty() {
                return Err(FxError::configuration(format!(
                    "{} node {} has no inputs",
                    node.kind, id.0
                )));
            }
            for (idx, slot) in node.inputs.iter().enumerate() {
                match slot {
                    None => {
                        return Err(FxError::configuration(format!(
                            "{} node {} is missing input `{}`",
                            node.kind,
                            id.0,
                            node.kind.slot_name(idx)
                        )));
                    }
                    Some(Input::Node(n)) => stack.push(*n),
                    Some(Input::Surface(s)) => {
                        self.surface(*s)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Non-empty extent `root` can produce inside `rect`, with default evaluation options.
    pub fn output_rect(&self, root: NodeId, rect: IntRect) -> FxResult<IntRect> {
        Evaluator::new(self, EvalOptions::default()).output_rect(root, rect)
    }

    /// Render `root` over exactly `rect`, with default evaluation options.
    pub fn render(&self, root: NodeId, rect: IntRect) -> FxResult<RasterBuffer> {
        Evaluator::new(self, EvalOptions::default()).render(root, rect)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/arena.rs"]
mod tests;
