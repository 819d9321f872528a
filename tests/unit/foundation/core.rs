use super::*;

#[test]
fn intersect_and_union_normalize_empty_results() {
    let a = IntRect::new(0, 0, 10, 10);
    let b = IntRect::new(20, 20, 5, 5);
    assert_eq!(a.intersect(&b), IntRect::ZERO);
    assert_eq!(a.union(&IntRect::new(50, 50, 0, 3)), a);
    assert_eq!(IntRect::new(4, 4, -1, 2).union(&IntRect::ZERO), IntRect::ZERO);
    assert_eq!(a.union(&b), IntRect::new(0, 0, 25, 25));
    assert_eq!(
        a.intersect(&IntRect::new(5, -5, 10, 10)),
        IntRect::new(5, 0, 5, 5)
    );
}

#[test]
fn inflate_deflate_and_translate() {
    let r = IntRect::new(2, 3, 4, 5);
    assert_eq!(r.inflate(1, 2), IntRect::new(1, 1, 6, 9));
    assert_eq!(r.inflate(1, 2).deflate(1, 2), r);
    assert_eq!(r.deflate(2, 0), IntRect::ZERO);
    assert_eq!(r.translate(IntPoint::new(-2, 7)), IntRect::new(0, 10, 4, 5));
    assert_eq!(
        r.inflate_margin(1, 0, 0, 2),
        IntRect::new(1, 3, 5, 7)
    );
}

#[test]
fn containment_treats_empty_as_contained() {
    let r = IntRect::new(0, 0, 4, 4);
    assert!(r.contains_rect(&IntRect::ZERO));
    assert!(r.contains_rect(&IntRect::new(1, 1, 3, 3)));
    assert!(!r.contains_rect(&IntRect::new(1, 1, 4, 3)));
    assert!(r.contains_point(IntPoint::new(3, 3)));
    assert!(!r.contains_point(IntPoint::new(4, 0)));
}

#[test]
fn rounding_from_float_rects() {
    let r = Rect::new(0.2, 0.7, 3.1, 4.0);
    assert_eq!(IntRect::round_out(r), IntRect::new(0, 0, 4, 4));
    assert_eq!(IntRect::round(r), IntRect::new(0, 1, 3, 3));
    assert_eq!(IntRect::new(1, 2, 3, 4).to_rect(), Rect::new(1.0, 2.0, 4.0, 6.0));
}

#[test]
fn color_premultiplies_to_bgra() {
    let px = Color::new(1.0, 0.5, 0.0, 0.5).to_premul_bgra();
    assert_eq!(px, [0, 64, 128, 128]);
    assert_eq!(Color::white().to_premul_bgra(), [255, 255, 255, 255]);
}

#[test]
fn matrix_row_major_layout() {
    let mut v = [0.0f32; 20];
    v[19] = 0.25;
    v[0] = 1.0;
    let m = Matrix5x4::from_row_major(&v);
    assert_eq!(m.rows[0][0], 1.0);
    assert_eq!(m.alpha_bias(), 0.25);
    assert_eq!(m.to_row_major(), v);
    assert_eq!(Matrix5x4::default(), Matrix5x4::identity());
}
