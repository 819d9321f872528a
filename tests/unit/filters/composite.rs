use super::*;
use crate::foundation::core::{B, R};
use crate::graph::arena::FilterGraph;
use crate::graph::node::{NodeId, NodeKind};

fn solid(px: [u8; 4]) -> RasterBuffer {
    RasterBuffer::filled(2, 2, px).unwrap()
}

fn flood(g: &mut FilterGraph, color: Color) -> NodeId {
    let n = g.create_node(NodeKind::Flood);
    g.set_attribute(n, "color", color).unwrap();
    n
}

#[test]
fn over_blends_source_onto_destination() {
    let mut dest = solid([255, 0, 0, 255]);
    composite_in_place(CompositeOperator::Over, &mut dest, &solid([0, 0, 128, 128]));
    assert_eq!(dest.pixel(0, 0), [127, 0, 128, 255]);
}

#[test]
fn in_and_out_use_destination_alpha() {
    let src = solid([0, 0, 200, 200]);
    let mut clear = solid([0; 4]);
    composite_in_place(CompositeOperator::In, &mut clear, &src);
    assert_eq!(clear.pixel(1, 1), [0; 4]);

    let mut clear = solid([0; 4]);
    composite_in_place(CompositeOperator::Out, &mut clear, &src);
    assert_eq!(clear.pixel(1, 1), [0, 0, 200, 200]);
}

#[test]
fn xor_of_two_opaque_layers_is_empty() {
    let mut dest = solid([255, 0, 0, 255]);
    composite_in_place(CompositeOperator::Xor, &mut dest, &solid([0, 0, 255, 255]));
    assert_eq!(dest.pixel(0, 1), [0; 4]);
}

#[test]
fn transparent_top_layer_leaves_bottom_untouched() {
    let mut g = FilterGraph::new();
    let a = g.add_surface(RasterBuffer::filled(3, 3, [10, 20, 30, 255]).unwrap());
    let b = flood(&mut g, Color::transparent());
    let n = g.create_node(NodeKind::Composite);
    g.set_input(n, "in0", a).unwrap();
    g.set_input(n, "in1", b).unwrap();

    let rect = IntRect::new(0, 0, 3, 3);
    assert_eq!(g.render(n, rect).unwrap(), RasterBuffer::filled(3, 3, [10, 20, 30, 255]).unwrap());
}

#[test]
fn in_with_missing_source_is_transparent() {
    let mut g = FilterGraph::new();
    let a = g.add_surface(solid([0, 0, 255, 255]));
    let b = flood(&mut g, Color::transparent());
    let n = g.create_node(NodeKind::Composite);
    g.set_input(n, "in0", a).unwrap();
    g.set_input(n, "in1", b).unwrap();
    g.set_attribute(n, "operator", CompositeOperator::In).unwrap();

    let rect = IntRect::new(0, 0, 2, 2);
    assert!(g.output_rect(n, rect).unwrap().is_empty());
    assert!(g.render(n, rect).unwrap().is_transparent());
}

#[test]
fn output_rect_unions_inputs() {
    let mut g = FilterGraph::new();
    let a = g.add_surface(solid([0, 0, 0, 255]));
    let b = g.add_surface(RasterBuffer::filled(5, 1, [0, 0, 0, 255]).unwrap());
    let n = g.create_node(NodeKind::Composite);
    g.set_input(n, "in0", a).unwrap();
    g.set_input(n, "in1", b).unwrap();
    let rect = IntRect::new(0, 0, 10, 10);
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(0, 0, 5, 2));

    g.set_attribute(n, "operator", CompositeOperator::In).unwrap();
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(0, 0, 2, 1));
}

#[test]
fn arithmetic_selects_an_input() {
    let mut g = FilterGraph::new();
    let a = g.add_surface(solid([1, 2, 3, 255]));
    let b = g.add_surface(solid([9, 9, 9, 255]));
    let n = g.create_node(NodeKind::ArithmeticCombine);
    g.set_input(n, "in", a).unwrap();
    g.set_input(n, "in2", b).unwrap();
    g.set_attribute(n, "coefficients", [0.0f32, 1.0, 0.0, 0.0]).unwrap();
    assert_eq!(g.render(n, IntRect::new(0, 0, 2, 2)).unwrap(), solid([1, 2, 3, 255]));

    g.set_attribute(n, "coefficients", [0.0f32, 0.0, 1.0, 0.0]).unwrap();
    assert_eq!(g.render(n, IntRect::new(0, 0, 2, 2)).unwrap(), solid([9, 9, 9, 255]));
}

#[test]
fn arithmetic_constant_term_without_inputs_is_white() {
    let mut g = FilterGraph::new();
    let a = flood(&mut g, Color::transparent());
    let b = flood(&mut g, Color::transparent());
    let n = g.create_node(NodeKind::ArithmeticCombine);
    g.set_input(n, "in", a).unwrap();
    g.set_input(n, "in2", b).unwrap();
    g.set_attribute(n, "coefficients", [0.0f32, 0.0, 0.0, 1.0]).unwrap();

    let rect = IntRect::new(3, 3, 4, 4);
    assert_eq!(g.output_rect(n, rect).unwrap(), rect);
    let out = g.render(n, rect).unwrap();
    assert_eq!(out, RasterBuffer::filled(4, 4, [255; 4]).unwrap());
}

#[test]
fn arithmetic_rejects_wrong_coefficient_count() {
    let mut f = ArithmeticFilter::default();
    let err = f
        .set_attribute("coefficients", &vec![1.0f32, 2.0].into())
        .unwrap_err();
    assert!(err.to_string().contains("expects 4 numbers, got 2"));
}

#[test]
fn flood_fills_with_premultiplied_color() {
    let mut g = FilterGraph::new();
    let n = flood(&mut g, Color::new(1.0, 0.0, 0.0, 0.5));
    let rect = IntRect::new(-2, -2, 3, 3);
    assert_eq!(g.output_rect(n, rect).unwrap(), rect);
    let px = g.render(n, rect).unwrap().pixel(2, 2);
    assert_eq!(px[B], 0);
    assert_eq!(px[R], px[A]);
    assert!(px[A] == 127 || px[A] == 128);
}
