use super::*;
use crate::encode::raster::OutputFormat;

#[test]
fn defaults_are_sequential_png() {
    let opts = ComposeOpts::default();
    assert_eq!(opts.max_concurrent_loads, 1);
    assert_eq!(opts.fetch_timeout(), Duration::from_secs(30));
    assert_eq!(opts.backend, BackendKind::Cpu);
    assert_eq!(opts.output.format, OutputFormat::Png);
    assert!(opts.validate().is_ok());
}

#[test]
fn partial_json_fills_defaults() {
    let opts: ComposeOpts =
        serde_json::from_str(r#"{"output": {"format": "jpeg"}, "max_concurrent_loads": 3}"#)
            .unwrap();
    assert_eq!(opts.max_concurrent_loads, 3);
    assert_eq!(opts.output.format, OutputFormat::Jpeg);
    assert!((opts.output.quality - 0.95).abs() < f32::EPSILON);
    assert_eq!(opts.fetch_timeout_secs, 30);
}

#[test]
fn validation_rejects_zero_values() {
    let zero_loads = ComposeOpts {
        max_concurrent_loads: 0,
        ..ComposeOpts::default()
    };
    assert!(matches!(
        zero_loads.validate(),
        Err(SlotframeError::InvalidInput(_))
    ));

    let zero_timeout = ComposeOpts {
        fetch_timeout_secs: 0,
        ..ComposeOpts::default()
    };
    assert!(zero_timeout.validate().is_err());
}

#[test]
fn from_path_reads_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"{"fetch_timeout_secs": 5}"#).unwrap();
    assert_eq!(ComposeOpts::from_path(&good).unwrap().fetch_timeout_secs, 5);

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, r#"{"output": {"quality": 2.0}}"#).unwrap();
    assert!(matches!(
        ComposeOpts::from_path(&bad),
        Err(SlotframeError::InvalidInput(_))
    ));

    let unknown = dir.path().join("unknown.json");
    std::fs::write(&unknown, r#"{"threads": 4}"#).unwrap();
    assert!(matches!(
        ComposeOpts::from_path(&unknown),
        Err(SlotframeError::InvalidInput(_))
    ));

    assert!(matches!(
        ComposeOpts::from_path(dir.path().join("missing.json")),
        Err(SlotframeError::Other(_))
    ));
}
