use super::*;
use crate::raster::edge::EdgeMode;

#[test]
fn typed_values_convert_to_expected_shapes() {
    assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
    assert_eq!(AttributeValue::from(2.5f32), AttributeValue::Float(2.5));
    assert_eq!(
        AttributeValue::from(IntRect::new(1, 2, 3, 4)),
        AttributeValue::Floats(vec![1.0, 2.0, 3.0, 4.0])
    );
    assert_eq!(
        AttributeValue::from(Rect::new(1.0, 2.0, 4.0, 6.0)),
        AttributeValue::Floats(vec![1.0, 2.0, 3.0, 4.0])
    );
    assert_eq!(
        AttributeValue::from(EdgeMode::Wrap),
        AttributeValue::Text("wrap".to_owned())
    );
}

#[test]
fn coercions_reject_wrong_shapes() {
    let v = AttributeValue::from(1.5f32);
    assert!(v.to_i32("n").is_err());
    assert!(v.to_bool("n").is_err());
    assert!(AttributeValue::from(-1i32).to_u32("n").is_err());
    assert_eq!(AttributeValue::from(7u32).to_u32("n").unwrap(), 7);

    let pair = AttributeValue::from([1.0f32, 2.0]);
    assert_eq!(pair.to_int_size("s").unwrap(), IntSize::new(1, 2));
    let err = pair.to_int_rect("r").unwrap_err();
    assert!(err.to_string().contains("expects 4 finite numbers"));
}

#[test]
fn non_finite_numbers_are_rejected() {
    assert!(AttributeValue::Float(f64::NAN).to_f32("x").is_err());
    assert!(AttributeValue::Floats(vec![1.0, f64::INFINITY]).to_floats("x").is_err());
}

#[test]
fn matrices_and_affines_round_trip() {
    let m = Matrix5x4::identity();
    assert_eq!(AttributeValue::from(m).to_matrix("m").unwrap(), m);

    let a = Affine::new([2.0, 0.0, 0.0, 3.0, 5.0, 7.0]);
    assert_eq!(AttributeValue::from(a).to_affine("a").unwrap(), a);
}

#[test]
fn enums_parse_from_snake_case_names() {
    let v = AttributeValue::Text("duplicate".to_owned());
    assert_eq!(v.to_enum::<EdgeMode>("edge_mode").unwrap(), EdgeMode::Duplicate);

    let err = AttributeValue::Text("clamp".to_owned())
        .to_enum::<EdgeMode>("edge_mode")
        .unwrap_err();
    assert!(err.to_string().contains("unknown EdgeMode `clamp`"));
    assert_eq!(EdgeMode::Wrap.as_str(), "wrap");
}

#[test]
fn json_values_map_to_untagged_variants() {
    let v = AttributeValue::from_json("x", &serde_json::json!(3)).unwrap();
    assert_eq!(v, AttributeValue::Float(3.0));
    let v = AttributeValue::from_json("x", &serde_json::json!([1, 2.5])).unwrap();
    assert_eq!(v, AttributeValue::Floats(vec![1.0, 2.5]));
    let v = AttributeValue::from_json("x", &serde_json::json!("over")).unwrap();
    assert_eq!(v, AttributeValue::Text("over".to_owned()));
    assert!(AttributeValue::from_json("x", &serde_json::json!({"a": 1})).is_err());
}
