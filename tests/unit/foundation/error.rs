use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FxError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        FxError::evaluation("x")
            .to_string()
            .contains("evaluation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
