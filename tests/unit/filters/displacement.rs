use super::*;
use crate::graph::arena::FilterGraph;
use crate::graph::node::{NodeId, NodeKind};

fn numbered() -> RasterBuffer {
    RasterBuffer::from_fn(8, 8, |x, y| [(x * 10) as u8, (y * 10) as u8, 0, 255]).unwrap()
}

fn displacement(g: &mut FilterGraph, map_px: [u8; 4], scale: f32) -> NodeId {
    let src = g.add_surface(numbered());
    let map = g.add_surface(RasterBuffer::filled(8, 8, map_px).unwrap());
    let n = g.create_node(NodeKind::DisplacementMap);
    g.set_input(n, "in", src).unwrap();
    g.set_input(n, "in2", map).unwrap();
    g.set_attribute(n, "scale", scale).unwrap();
    n
}

fn map_pixel(r: u8, g: u8) -> [u8; 4] {
    let mut px = [0, 0, 0, 255];
    px[R] = r;
    px[G] = g;
    px
}

#[test]
fn zero_scale_is_identity() {
    let mut g = FilterGraph::new();
    let n = displacement(&mut g, map_pixel(255, 0), 0.0);
    assert_eq!(g.render(n, IntRect::new(0, 0, 8, 8)).unwrap(), numbered());
}

#[test]
fn map_channels_shift_the_lookup() {
    let mut g = FilterGraph::new();
    let n = displacement(&mut g, map_pixel(255, 128), 4.0);
    let out = g.render(n, IntRect::new(0, 0, 8, 8)).unwrap();
    assert_eq!(out.pixel(1, 1), [30, 10, 0, 255]);
    assert_eq!(out.pixel(5, 7), [70, 70, 0, 255]);
    assert_eq!(out.pixel(6, 0), [0; 4]);
}

#[test]
fn channel_selection() {
    let mut g = FilterGraph::new();
    let n = displacement(&mut g, map_pixel(255, 128), 4.0);
    g.set_attribute(n, "x_channel", ColorChannel::G).unwrap();
    g.set_attribute(n, "y_channel", ColorChannel::R).unwrap();
    let out = g.render(n, IntRect::new(0, 0, 8, 8)).unwrap();
    assert_eq!(out.pixel(1, 1), [10, 30, 0, 255]);
    assert!(g.set_attribute(n, "x_channel", "alpha").is_err());
}

#[test]
fn missing_map_renders_transparent() {
    let mut g = FilterGraph::new();
    let src = g.add_surface(numbered());
    let map = g.create_node(NodeKind::Flood);
    let n = g.create_node(NodeKind::DisplacementMap);
    g.set_input(n, "in", src).unwrap();
    g.set_input(n, "in2", map).unwrap();
    assert!(g.render(n, IntRect::new(0, 0, 8, 8)).unwrap().is_transparent());
}

#[test]
fn output_rect_allows_for_half_the_scale() {
    let mut g = FilterGraph::new();
    let n = displacement(&mut g, map_pixel(0, 0), 5.0);
    assert_eq!(
        g.output_rect(n, IntRect::new(-20, -20, 50, 50)).unwrap(),
        IntRect::new(-3, -3, 14, 14)
    );
}
