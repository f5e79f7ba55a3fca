use super::*;

/// Opaque frame of `width x height` with full-width transparent row bands `[y0, y1)`.
fn banded_frame(width: u32, height: u32, bands: &[(u32, u32)]) -> DecodedImage {
    let mut data = [40u8, 40, 40, 255].repeat((width * height) as usize);
    for &(y0, y1) in bands {
        let start = (y0 * width * 4) as usize;
        let end = (y1 * width * 4) as usize;
        data[start..end].fill(0);
    }
    DecodedImage::from_straight_rgba8(width, height, data).unwrap()
}

fn photo(w: u32, h: u32) -> DecodedImage {
    DecodedImage::from_straight_rgba8(w, h, [200u8, 10, 10, 255].repeat((w * h) as usize)).unwrap()
}

#[test]
fn two_band_frame_uses_detected_slots() {
    let frame = banded_frame(900, 1800, &[(200, 700), (1000, 1500)]);
    let plan = plan_slots(&frame, LayoutType::TwoSlot, BackendKind::Cpu).unwrap();
    assert_eq!(plan.source, SlotSource::Detected);
    assert_eq!(plan.slots.len(), 2);
    assert!(plan.slots[0].y < plan.slots[1].y);
    let (a, b) = (plan.slots[0].area(), plan.slots[1].area());
    assert!(a.abs_diff(b) * 50 <= a.max(b), "areas {a} vs {b}");
}

#[test]
fn opaque_frame_falls_back() {
    let frame = banded_frame(60, 180, &[]);
    let plan = plan_slots(&frame, LayoutType::ThreeSlot, BackendKind::Cpu).unwrap();
    assert_eq!(plan.source, SlotSource::Fallback);
    assert_eq!(plan.detected, 0);
    assert_eq!(plan.slots, fallback_slots(LayoutType::ThreeSlot.canvas(), 3));
}

#[test]
fn plan_is_deterministic() {
    let frame = banded_frame(450, 1800, &[(100, 400), (500, 800), (900, 1200), (1300, 1600)]);
    let a = plan_slots(&frame, LayoutType::FourSlot, BackendKind::Cpu).unwrap();
    let b = plan_slots(&frame, LayoutType::FourSlot, BackendKind::Cpu).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.source, SlotSource::Detected);
}

#[test]
fn compose_decoded_produces_layout_sized_png() {
    let frame = banded_frame(900, 1800, &[(200, 700), (1000, 1500)]);
    let photos = [photo(4, 3), photo(16, 9)];
    let out = compose_decoded(&frame, &photos, LayoutType::TwoSlot, &ComposeOpts::default()).unwrap();
    assert_eq!(out.mime_type, "image/png");
    assert_eq!((out.width, out.height), (900, 1800));
    assert_eq!(out.slot_source, SlotSource::Detected);

    let decoded = image::load_from_memory(&out.image).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (900, 1800));
    let center = out.slots[0];
    let px = decoded.get_pixel(center.x + center.w / 2, center.y + center.h / 2).0;
    assert!(px[0] > 180 && px[1] < 40, "{px:?}");
}

#[test]
fn compose_decoded_rejects_wrong_photo_count() {
    let frame = banded_frame(8, 8, &[]);
    let err = compose_decoded(&frame, &[photo(2, 2)], LayoutType::FourSlot, &ComposeOpts::default())
        .unwrap_err();
    assert!(matches!(err, SlotframeError::InvalidInput(_)));
}

#[test]
fn serialized_result_omits_image_bytes() {
    let result = CompositeResult {
        image: vec![1, 2, 3],
        mime_type: "image/png".to_string(),
        width: 900,
        height: 1800,
        slots: vec![SlotRect::new(1, 2, 3, 4)],
        slot_source: SlotSource::Fallback,
    };
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("image").is_none());
    assert_eq!(json["slot_source"], "fallback");
    assert_eq!(json["slots"][0]["w"], 3);
}

#[tokio::test]
async fn missing_frame_is_invalid_before_io() {
    let session = ComposeSession::new(ComposeOpts::default()).unwrap();
    let request = ComposeRequest {
        frame: None,
        photos: vec![ByteSource::File("/nonexistent/a.png".into()); 2],
        layout: LayoutType::TwoSlot,
    };
    let err = session
        .composite(request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SlotframeError::InvalidInput(_)));
}

#[tokio::test]
async fn cancelled_token_stops_the_pipeline() {
    let session = ComposeSession::new(ComposeOpts::default()).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();
    let request = ComposeRequest::new(
        ByteSource::memory("frame", vec![0u8; 4]),
        vec![ByteSource::memory("p", vec![0u8; 4]); 3],
        LayoutType::ThreeSlot,
    );
    let err = session.composite(request, &cancel).await.unwrap_err();
    assert!(matches!(err, SlotframeError::Cancelled));
}

#[tokio::test]
async fn until_cancelled_passes_through_results() {
    let cancel = CancellationToken::new();
    let v = until_cancelled(&cancel, async { Ok::<_, SlotframeError>(7) })
        .await
        .unwrap();
    assert_eq!(v, 7);
}
