use super::*;
use crate::foundation::core::IntPoint;

fn numbered(rect: IntRect) -> RasterBuffer {
    RasterBuffer::from_fn(rect.width as u32, rect.height as u32, |x, y| {
        [x as u8 + 1, y as u8 + 1, 0, 255]
    })
    .unwrap()
}

#[test]
fn equal_rects_return_source() {
    let s = IntRect::new(3, 4, 2, 2);
    let src = numbered(s);
    let out = extend_to_rect(src.clone(), s, s, EdgeMode::Duplicate).unwrap();
    assert_eq!(out, src);
}

#[test]
fn none_mode_pads_with_transparent() {
    let s = IntRect::new(0, 0, 2, 2);
    let d = IntRect::new(-1, -1, 4, 4);
    let out = extend_to_rect(numbered(s), s, d, EdgeMode::None).unwrap();
    assert_eq!(out.pixel(0, 0), [0, 0, 0, 0]);
    assert_eq!(out.pixel(1, 1), [1, 1, 0, 255]);
    assert_eq!(out.pixel(2, 2), [2, 2, 0, 255]);
    assert_eq!(out.pixel(3, 3), [0, 0, 0, 0]);
}

#[test]
fn duplicate_mode_replicates_edges_and_corners() {
    let s = IntRect::new(0, 0, 2, 2);
    let d = IntRect::new(-2, -1, 6, 4);
    let out = extend_to_rect(numbered(s), s, d, EdgeMode::Duplicate).unwrap();
    // corners
    assert_eq!(out.pixel(0, 0), [1, 1, 0, 255]);
    assert_eq!(out.pixel(5, 3), [2, 2, 0, 255]);
    assert_eq!(out.pixel(5, 0), [2, 1, 0, 255]);
    // strips
    assert_eq!(out.pixel(0, 2), [1, 2, 0, 255]);
    assert_eq!(out.pixel(2, 0), [1, 1, 0, 255]);
    assert_eq!(out.pixel(3, 3), [2, 2, 0, 255]);
}

#[test]
fn duplicate_mode_without_overlap_is_transparent() {
    let s = IntRect::new(0, 0, 2, 2);
    let d = IntRect::new(10, 10, 2, 2);
    let out = extend_to_rect(numbered(s), s, d, EdgeMode::Duplicate).unwrap();
    assert!(out.is_transparent());
}

#[test]
fn wrap_mode_tiles_relative_to_source_origin() {
    let s = IntRect::new(1, 1, 2, 3);
    let d = IntRect::new(-2, -1, 7, 6);
    let src = numbered(s);
    let out = extend_to_rect(src.clone(), s, d, EdgeMode::Wrap).unwrap();
    for y in 0..d.height {
        for x in 0..d.width {
            let p = IntPoint::new(d.x + x, d.y + y);
            let sx = (p.x - s.x).rem_euclid(s.width);
            let sy = (p.y - s.y).rem_euclid(s.height);
            assert_eq!(out.pixel(x as u32, y as u32), src.pixel(sx as u32, sy as u32));
        }
    }
}

#[test]
fn edge_mode_parses_snake_case() {
    let m: EdgeMode = serde_json::from_str("\"duplicate\"").unwrap();
    assert_eq!(m, EdgeMode::Duplicate);
    assert_eq!(EdgeMode::default(), EdgeMode::None);
}
