use super::*;
use crate::graph::arena::FilterGraph;
use crate::graph::node::NodeKind;

fn varied(alpha: u8) -> RasterBuffer {
    RasterBuffer::from_fn(8, 8, |x, y| {
        let c = (x * 31 + y * 7) as u8;
        [c, c.wrapping_mul(3), c.wrapping_add(90), alpha]
    })
    .unwrap()
}

#[test]
fn opaque_pixels_survive_a_round_trip() {
    let src = varied(255);
    let mut buf = src.clone();
    unpremultiply_in_place(&mut buf);
    assert_eq!(buf, src);
    premultiply_in_place(&mut buf);
    assert_eq!(buf, src);
}

#[test]
fn premultiply_scales_by_alpha() {
    let mut buf = RasterBuffer::filled(1, 1, [200, 100, 50, 128]).unwrap();
    premultiply_in_place(&mut buf);
    assert_eq!(buf.pixel(0, 0), [100, 50, 25, 128]);
}

#[test]
fn zero_alpha_unpremultiplies_to_zero() {
    let mut buf = RasterBuffer::filled(1, 1, [7, 8, 9, 0]).unwrap();
    unpremultiply_in_place(&mut buf);
    assert_eq!(buf.pixel(0, 0), [0, 0, 0, 0]);
}

#[test]
fn unpremultiply_saturates() {
    let mut buf = RasterBuffer::filled(1, 1, [64, 32, 0, 64]).unwrap();
    unpremultiply_in_place(&mut buf);
    assert_eq!(buf.pixel(0, 0), [255, 128, 0, 64]);
}

#[test]
fn nodes_pass_geometry_through_and_reject_attributes() {
    let mut g = FilterGraph::new();
    let s = g.add_surface(varied(255));
    let pre = g.create_node(NodeKind::Premultiply);
    g.set_input(pre, "in", s).unwrap();
    let un = g.create_node(NodeKind::Unpremultiply);
    g.set_input(un, "in", pre).unwrap();

    assert!(g.set_attribute(pre, "alpha", 1.0f32).is_err());
    let rect = IntRect::new(-4, -4, 20, 20);
    assert_eq!(g.output_rect(un, rect).unwrap(), IntRect::new(0, 0, 8, 8));
    let out = g.render(un, IntRect::new(0, 0, 8, 8)).unwrap();
    assert_eq!(out, varied(255));
}
