use super::*;
use crate::graph::arena::FilterGraph;
use crate::graph::node::{NodeId, NodeKind};

fn ramp() -> RasterBuffer {
    RasterBuffer::from_fn(4, 1, |x, _| [(x * 10) as u8, 0, 0, 255]).unwrap()
}

fn convolve(g: &mut FilterGraph, src: RasterBuffer, size: IntSize, kernel: Vec<f32>) -> NodeId {
    let s = g.add_surface(src);
    let n = g.create_node(NodeKind::ConvolveMatrix);
    g.set_input(n, "in", s).unwrap();
    g.set_attribute(n, "kernel_size", size).unwrap();
    g.set_attribute(n, "kernel_matrix", kernel).unwrap();
    g.set_attribute(n, "target", IntPoint::new(size.width / 2, size.height / 2)).unwrap();
    n
}

#[test]
fn kernel_is_applied_reversed() {
    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![1.0, 0.0, 0.0]);
    let out = g.render(n, IntRect::new(0, 0, 4, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), [10, 0, 0, 255]);
    assert_eq!(out.pixel(2, 0), [30, 0, 0, 255]);
    // duplicate edge mode repeats the last column
    assert_eq!(out.pixel(3, 0), [30, 0, 0, 255]);
}

#[test]
fn output_rect_grows_by_the_kernel_footprint() {
    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![0.0, 1.0, 0.0]);
    assert_eq!(
        g.output_rect(n, IntRect::new(-10, -10, 30, 30)).unwrap(),
        IntRect::new(-1, 0, 6, 1)
    );
}

#[test]
fn bias_and_preserved_alpha() {
    let mut g = FilterGraph::new();
    let src = RasterBuffer::filled(2, 2, [10, 20, 30, 200]).unwrap();
    let n = convolve(&mut g, src, IntSize::new(1, 1), vec![0.0]);
    g.set_attribute(n, "bias", 0.5f32).unwrap();
    g.set_attribute(n, "preserve_alpha", true).unwrap();
    let out = g.render(n, IntRect::new(0, 0, 2, 2)).unwrap();
    assert_eq!(out.pixel(1, 1), [128, 128, 128, 200]);
}

#[test]
fn divisor_scales_the_sum() {
    let mut g = FilterGraph::new();
    let src = RasterBuffer::filled(3, 3, [90, 90, 90, 255]).unwrap();
    let n = convolve(&mut g, src, IntSize::new(3, 3), vec![1.0; 9]);
    g.set_attribute(n, "divisor", 9.0f32).unwrap();
    let out = g.render(n, IntRect::new(0, 0, 3, 3)).unwrap();
    assert_eq!(out.pixel(1, 1), [90, 90, 90, 255]);
    assert_eq!(out.pixel(0, 0), [90, 90, 90, 255]);
}

#[test]
fn degenerate_configurations_render_transparent() {
    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![1.0, 0.0, 0.0]);
    g.set_attribute(n, "divisor", 0.0f32).unwrap();
    let rect = IntRect::new(0, 0, 4, 1);
    assert!(g.output_rect(n, rect).unwrap().is_empty());
    assert!(g.render(n, rect).unwrap().is_transparent());

    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![1.0, 0.0]);
    assert!(g.render(n, rect).unwrap().is_transparent());

    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![1.0, 0.0, 0.0]);
    g.set_attribute(n, "target", IntPoint::new(3, 0)).unwrap();
    assert!(g.render(n, rect).unwrap().is_transparent());
}

#[test]
fn source_rect_limits_what_the_kernel_sees() {
    let mut g = FilterGraph::new();
    let n = convolve(&mut g, ramp(), IntSize::new(3, 1), vec![1.0, 0.0, 0.0]);
    g.set_attribute(n, "edge_mode", EdgeMode::None).unwrap();
    g.set_attribute(n, "source_rect", IntRect::new(0, 0, 2, 1)).unwrap();
    let out = g.render(n, IntRect::new(0, 0, 4, 1)).unwrap();
    assert_eq!(out.pixel(0, 0), [10, 0, 0, 255]);
    assert_eq!(out.pixel(1, 0), [0; 4]);
}
