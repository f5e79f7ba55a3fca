use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SlotframeError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        SlotframeError::decode("frame.png", "bad header")
            .to_string()
            .contains("decode error (frame.png): bad header")
    );
    assert!(
        SlotframeError::fetch("https://example.test/a.png", "404")
            .to_string()
            .contains("fetch error (https://example.test/a.png)")
    );
    assert!(
        SlotframeError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert_eq!(
        SlotframeError::slot_count_mismatch(4, 1).to_string(),
        "slot count mismatch: expected 4, got 1"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SlotframeError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
