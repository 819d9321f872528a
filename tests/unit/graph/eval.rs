use super::*;
use crate::foundation::core::{IntPoint, IntSize};
use crate::graph::node::NodeKind;

fn numbered(w: u32, h: u32) -> RasterBuffer {
    RasterBuffer::from_fn(w, h, |x, y| [x as u8, y as u8, 0, 255]).unwrap()
}

fn offset_graph(by: IntPoint) -> (FilterGraph, NodeId) {
    let mut g = FilterGraph::new();
    let s = g.add_surface(numbered(4, 4));
    let n = g.create_node(NodeKind::Offset);
    g.set_input(n, "in", s).unwrap();
    g.set_attribute(n, "offset", by).unwrap();
    (g, n)
}

#[test]
fn output_rect_is_clipped_to_the_request() {
    let (g, n) = offset_graph(IntPoint::new(5, 0));
    let eval = Evaluator::new(&g, EvalOptions::default());
    let rect = IntRect::new(0, 0, 10, 4);
    assert_eq!(eval.output_rect(n, rect).unwrap(), IntRect::new(5, 0, 4, 4));
    assert!(eval.output_rect(n, IntRect::new(0, 0, 5, 4)).unwrap().is_empty());
}

#[test]
fn render_covers_exactly_the_request() {
    let (g, n) = offset_graph(IntPoint::new(5, 0));
    let out = Evaluator::new(&g, EvalOptions::default())
        .render(n, IntRect::new(0, 0, 10, 4))
        .unwrap();
    assert_eq!(out.size(), IntSize::new(10, 4));
    assert_eq!(out.pixel(4, 0), [0, 0, 0, 0]);
    assert_eq!(out.pixel(5, 0), [0, 0, 0, 255]);
    assert_eq!(out.pixel(8, 3), [3, 3, 0, 255]);
}

#[test]
fn empty_content_renders_transparent() {
    let (g, n) = offset_graph(IntPoint::new(100, 100));
    let out = g.render(n, IntRect::new(0, 0, 3, 3)).unwrap();
    assert_eq!(out.size(), IntSize::new(3, 3));
    assert!(out.is_transparent());
}

#[test]
fn missing_inputs_fail_before_rendering() {
    let mut g = FilterGraph::new();
    let n = g.create_node(NodeKind::GaussianBlur);
    let eval = Evaluator::new(&g, EvalOptions::default());
    let err = eval.render(n, IntRect::new(0, 0, 2, 2)).unwrap_err();
    assert!(matches!(err, FxError::Configuration(_)));
    assert_eq!(eval.stats().node_renders, 0);
}

fn fan_out_graph() -> (FilterGraph, NodeId) {
    let mut g = FilterGraph::new();
    let s = g.add_surface(numbered(4, 4));
    let shared = g.create_node(NodeKind::Premultiply);
    g.set_input(shared, "in", s).unwrap();
    let blend = g.create_node(NodeKind::Blend);
    g.set_input(blend, "in", shared).unwrap();
    g.set_input(blend, "in2", shared).unwrap();
    (g, blend)
}

#[test]
fn shared_nodes_rerender_without_memoization() {
    let (g, root) = fan_out_graph();
    let eval = Evaluator::new(&g, EvalOptions::default());
    eval.render(root, IntRect::new(0, 0, 4, 4)).unwrap();
    assert_eq!(
        eval.stats(),
        EvalStats {
            node_renders: 3,
            cache_hits: 0
        }
    );
}

#[test]
fn memoization_reuses_identical_requests() {
    let (g, root) = fan_out_graph();
    let plain = g.render(root, IntRect::new(0, 0, 4, 4)).unwrap();

    let eval = Evaluator::new(&g, EvalOptions { memoize: true });
    let cached = eval.render(root, IntRect::new(0, 0, 4, 4)).unwrap();
    assert_eq!(cached, plain);
    assert_eq!(
        eval.stats(),
        EvalStats {
            node_renders: 2,
            cache_hits: 1
        }
    );

    // Counters and cache reset per top-level call.
    eval.render(root, IntRect::new(0, 0, 4, 4)).unwrap();
    assert_eq!(eval.stats().node_renders, 2);
}

#[test]
fn fetch_input_extends_leaf_surfaces() {
    let mut g = FilterGraph::new();
    let s = g.add_surface(numbered(2, 2));
    let n = g.create_node(NodeKind::Offset);
    g.set_input(n, "in", s).unwrap();
    let eval = Evaluator::new(&g, EvalOptions::default());
    let cx = NodeCx { eval: &eval, node: n };

    let rect = IntRect::new(-1, -1, 4, 4);
    let dup = cx.fetch_input(0, rect, EdgeMode::Duplicate, None).unwrap().unwrap();
    assert_eq!(dup.pixel(0, 0), [0, 0, 0, 255]);
    assert_eq!(dup.pixel(3, 3), [1, 1, 0, 255]);

    let padded = cx
        .fetch_input(0, rect, EdgeMode::Duplicate, Some(IntRect::new(0, 0, 1, 1)))
        .unwrap()
        .unwrap();
    assert_eq!(padded.pixel(3, 3), [0, 0, 0, 255]);

    assert!(cx.fetch_input(0, IntRect::new(5, 5, 2, 2), EdgeMode::Wrap, None).unwrap().is_none());
}
