use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::filters::Filter;
use crate::foundation::core::{IntRect, Point, Rect};
use crate::foundation::error::{FxError, FxResult};
use crate::graph::arena::FilterGraph;
use crate::graph::draw::{DrawOptions, DrawTarget, draw_buffer};
use crate::graph::node::{Input, NodeId};
use crate::raster::buffer::RasterBuffer;
use crate::raster::edge::{EdgeMode, extend_to_rect};

/// Knobs for one evaluator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Cache `(node, rect)` render results for the lifetime of one top-level call.
    ///
    /// Off by default: every consumer of a shared node re-renders it.
    pub memoize: bool,
}

/// Counters for the last top-level call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvalStats {
    /// Node render invocations that computed pixels.
    pub node_renders: u64,
    /// Render requests answered from the memo cache.
    pub cache_hits: u64,
}

type Memo = HashMap<(NodeId, IntRect), Option<RasterBuffer>>;

/// Two-phase evaluator over a [`FilterGraph`].
///
/// `output_rect` answers "what can this node produce inside R"; `render` produces exactly R.
/// Both validate the reachable subgraph first, so configuration errors never surface
/// mid-render.
pub struct Evaluator<'g> {
    graph: &'g FilterGraph,
    options: EvalOptions,
    memo: RefCell<Memo>,
    renders: Cell<u64>,
    hits: Cell<u64>,
}

impl<'g> Evaluator<'g> {
    /// Evaluator over `graph`.
    pub fn new(graph: &'g FilterGraph, options: EvalOptions) -> Self {
        Self {
            graph,
            options,
            memo: RefCell::new(HashMap::new()),
            renders: Cell::new(0),
            hits: Cell::new(0),
        }
    }

    /// Counters of the most recent `render` or `draw` call.
    pub fn stats(&self) -> EvalStats {
        EvalStats {
            node_renders: self.renders.get(),
            cache_hits: self.hits.get(),
        }
    }

    /// Rectangle inside `rect` where `root` can produce non-transparent content.
    /// Always a subset of `rect`.
    pub fn output_rect(&self, root: NodeId, rect: IntRect) -> FxResult<IntRect> {
        self.graph.validate(root)?;
        self.node_output_rect(root, rect)
    }

    /// Render `root` over exactly `rect`. Areas without content are transparent.
    #[tracing::instrument(skip(self), fields(memoize = self.options.memoize))]
    pub fn render(&self, root: NodeId, rect: IntRect) -> FxResult<RasterBuffer> {
        self.graph.validate(root)?;
        self.begin();
        let out = self.render_node(root, rect);
        self.memo.borrow_mut().clear();
        match out? {
            Some(buf) => Ok(buf),
            None => RasterBuffer::with_size(rect.size()),
        }
    }

    /// Realize `root` over `source_rect` and blit it to `target` so that the top-left of
    /// `source_rect` lands on `dest_point`.
    #[tracing::instrument(skip(self, target, options))]
    pub fn draw(
        &self,
        target: &mut dyn DrawTarget,
        root: NodeId,
        source_rect: Rect,
        dest_point: Point,
        options: &DrawOptions,
    ) -> FxResult<()> {
        self.graph.validate(root)?;
        let render_rect = IntRect::round_out(source_rect);
        let output_rect = self.node_output_rect(root, render_rect)?;
        if output_rect.is_empty() {
            tracing::trace!("nothing to draw");
            return Ok(());
        }
        self.begin();
        let out = self.render_node(root, output_rect);
        self.memo.borrow_mut().clear();
        let Some(buf) = out? else {
            return Ok(());
        };
        draw_buffer(target, &buf, output_rect, source_rect, dest_point, options)
    }

    fn begin(&self) {
        self.renders.set(0);
        self.hits.set(0);
        self.memo.borrow_mut().clear();
    }

    pub(crate) fn node_output_rect(&self, node: NodeId, rect: IntRect) -> FxResult<IntRect> {
        if rect.is_empty() {
            return Ok(IntRect::ZERO);
        }
        let n = self.graph.node(node)?;
        let cx = NodeCx { eval: self, node };
        Ok(n.filter.output_rect(&cx, rect)?.intersect(&rect))
    }

    pub(crate) fn render_node(
        &self,
        node: NodeId,
        rect: IntRect,
    ) -> FxResult<Option<RasterBuffer>> {
        if rect.is_empty() {
            return Ok(None);
        }
        if self.options.memoize {
            if let Some(hit) = self.memo.borrow().get(&(node, rect)) {
                self.hits.set(self.hits.get() + 1);
                return Ok(hit.clone());
            }
        }

        let n = self.graph.node(node)?;
        tracing::trace!(node = node.0, kind = %n.kind, ?rect, "render node");
        self.renders.set(self.renders.get() + 1);
        let cx = NodeCx { eval: self, node };
        let out = n.filter.render(&cx, rect)?;
        if let Some(buf) = &out {
            if buf.size() != rect.size() {
                return Err(FxError::evaluation(format!(
                    "{} produced {}x{} for a {}x{} request",
                    n.kind,
                    buf.width(),
                    buf.height(),
                    rect.width,
                    rect.height
                )));
            }
        }

        if self.options.memoize {
            self.memo.borrow_mut().insert((node, rect), out.clone());
        }
        Ok(out)
    }
}

/// View of the evaluator from inside one node: resolves that node's input slots.
pub(crate) struct NodeCx<'e, 'g> {
    eval: &'e Evaluator<'g>,
    node: NodeId,
}

impl NodeCx<'_, '_> {
    fn input(&self, slot: usize) -> FxResult<Input> {
        let node = self.eval.graph.node(self.node)?;
        node.inputs.get(slot).copied().flatten().ok_or_else(|| {
            FxError::configuration(format!(
                "{} node {} is missing input `{}`",
                node.kind,
                self.node.0,
                node.kind.slot_name(slot)
            ))
        })
    }

    /// Number of bound input slots (composite arity).
    pub(crate) fn input_count(&self) -> FxResult<usize> {
        Ok(self.eval.graph.node(self.node)?.inputs.len())
    }

    /// Output rect of the input bound at `slot`, restricted to `rect`.
    pub(crate) fn input_rect(&self, slot: usize, rect: IntRect) -> FxResult<IntRect> {
        match self.input(slot)? {
            Input::Surface(s) => Ok(rect.intersect(&self.eval.graph.surface(s)?.bounds())),
            Input::Node(n) => self.eval.node_output_rect(n, rect),
        }
    }

    /// Render the input at `slot` over exactly `rect`; `None` means fully transparent.
    pub(crate) fn render_input(
        &self,
        slot: usize,
        rect: IntRect,
    ) -> FxResult<Option<RasterBuffer>> {
        if rect.is_empty() {
            return Ok(None);
        }
        match self.input(slot)? {
            Input::Surface(s) => {
                let surface = self.eval.graph.surface(s)?;
                if surface.bounds().intersect(&rect).is_empty() {
                    return Ok(None);
                }
                surface.sub_buffer(rect).map(Some)
            }
            Input::Node(n) => self.eval.render_node(n, rect),
        }
    }

    /// Input pixels over exactly `rect`, synthesizing whatever the input cannot produce with
    /// `edge`. When `padded` is set, input content outside it is treated as transparent before
    /// the edge mode applies.
    pub(crate) fn fetch_input(
        &self,
        slot: usize,
        rect: IntRect,
        edge: EdgeMode,
        padded: Option<IntRect>,
    ) -> FxResult<Option<RasterBuffer>> {
        if rect.is_empty() {
            return Ok(None);
        }
        let mut available = self.input_rect(slot, rect)?;
        if let Some(p) = padded {
            available = available.intersect(&p);
        }
        if available.is_empty() {
            return Ok(None);
        }
        let Some(buf) = self.render_input(slot, available)? else {
            return Ok(None);
        };
        extend_to_rect(buf, available, rect, edge).map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/eval.rs"]
mod tests;
