use super::*;
use crate::foundation::core::A;
use crate::graph::arena::FilterGraph;
use crate::graph::node::NodeKind;

#[test]
fn box_size_follows_three_pass_approximation() {
    assert_eq!(blur_box_size(0.0), 0);
    assert_eq!(blur_box_size(-1.0), 0);
    assert_eq!(blur_box_size(f32::NAN), 0);
    assert_eq!(blur_box_size(1.0), 2);
    assert_eq!(blur_box_size(10.0), 19);
    assert_eq!(blur_box_size(1.0e6), 1024);
}

#[test]
fn even_boxes_alternate_their_lobes() {
    assert_eq!(box_lobes(3), [(1, 1); 3]);
    assert_eq!(box_lobes(4), [(2, 1), (1, 2), (2, 2)]);
    assert_eq!(box_lobes(1), [(0, 0); 3]);
}

#[test]
fn uniform_lines_stay_uniform() {
    for v in [0u8, 1, 100, 200, 255] {
        let input = [v; 16];
        let mut output = [0u8; 16];
        box_blur_line(&input, &mut output, 2, 2);
        assert_eq!(output, input);
    }
}

#[test]
fn odd_boxes_spread_symmetrically() {
    let mut buf = RasterBuffer::from_fn(11, 1, |x, _| if x == 5 { [255; 4] } else { [0; 4] })
        .unwrap();
    blur_axis(&mut buf, 3, true);
    for k in 1..5 {
        assert_eq!(buf.pixel(5 - k, 0), buf.pixel(5 + k, 0));
    }
    assert!(buf.pixel(5, 0)[0] > buf.pixel(6, 0)[0]);
}

#[test]
fn horizontal_pass_keeps_rows_apart() {
    let mut buf = RasterBuffer::from_fn(8, 8, |_, y| if y == 3 { [255; 4] } else { [0; 4] })
        .unwrap();
    let src = buf.clone();
    blur_axis(&mut buf, 5, true);
    assert_eq!(buf, src);

    let mut columns = RasterBuffer::from_fn(8, 8, |x, _| [(x * 30) as u8; 4]).unwrap();
    blur_axis(&mut columns, 5, false);
    for y in 1..8 {
        assert_eq!(columns.row(y), columns.row(0));
    }
}

#[test]
fn zero_deviation_is_identity() {
    let mut g = FilterGraph::new();
    let src = RasterBuffer::from_fn(6, 6, |x, y| [(x * 40) as u8, (y * 40) as u8, 0, 255]).unwrap();
    let s = g.add_surface(src.clone());
    let n = g.create_node(NodeKind::GaussianBlur);
    g.set_input(n, "in", s).unwrap();
    g.set_attribute(n, "std_deviation", 0.0f32).unwrap();

    let rect = IntRect::new(-5, -5, 20, 20);
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(0, 0, 6, 6));
    assert_eq!(g.render(n, IntRect::new(0, 0, 6, 6)).unwrap(), src);
}

#[test]
fn gaussian_output_grows_by_the_blur_margin() {
    let mut g = FilterGraph::new();
    let s = g.add_surface(RasterBuffer::filled(4, 4, [255; 4]).unwrap());
    let n = g.create_node(NodeKind::GaussianBlur);
    g.set_input(n, "in", s).unwrap();
    g.set_attribute(n, "std_deviation", 1.0f32).unwrap();

    let rect = IntRect::new(-20, -20, 44, 44);
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(-3, -3, 10, 10));

    let out = g.render(n, IntRect::new(-3, -3, 10, 10)).unwrap();
    assert!(out.pixel(0, 0)[A] < out.pixel(5, 5)[A]);
    assert_eq!(out.pixel(4, 4), out.pixel(5, 5));
}

#[test]
fn directional_blur_only_spreads_along_its_axis() {
    let mut g = FilterGraph::new();
    let s = g.add_surface(RasterBuffer::filled(4, 4, [255; 4]).unwrap());
    let n = g.create_node(NodeKind::DirectionalBlur);
    g.set_input(n, "in", s).unwrap();
    g.set_attribute(n, "std_deviation", 2.0f32).unwrap();

    let rect = IntRect::new(-20, -20, 44, 44);
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(-6, 0, 16, 4));

    g.set_attribute(n, "direction", BlurDirection::Y).unwrap();
    assert_eq!(g.output_rect(n, rect).unwrap(), IntRect::new(0, -6, 4, 16));
}
