use super::*;
use crate::foundation::core::{Canvas, Rect};
use crate::render::surface::{BackendKind, create_surface};

#[derive(Debug, PartialEq)]
enum Call {
    Fill([u8; 4]),
    Clip(Rect, f64),
    Pop,
    Cover(u32, Rect),
    Stretch(u32),
    Finish,
}

/// Records draw calls; images are identified by their width.
struct Recorder {
    canvas: Canvas,
    calls: Vec<Call>,
}

impl RasterSurface for Recorder {
    fn canvas(&self) -> Canvas {
        self.canvas
    }
    fn fill(&mut self, rgba: [u8; 4]) {
        self.calls.push(Call::Fill(rgba));
    }
    fn push_rounded_clip(&mut self, rect: Rect, radius: f64) {
        self.calls.push(Call::Clip(rect, radius));
    }
    fn pop_clip(&mut self) {
        self.calls.push(Call::Pop);
    }
    fn draw_image_cover(&mut self, image: &DecodedImage, slot: Rect) -> SlotframeResult<()> {
        self.calls.push(Call::Cover(image.width(), slot));
        Ok(())
    }
    fn draw_image_stretched(&mut self, image: &DecodedImage) -> SlotframeResult<()> {
        self.calls.push(Call::Stretch(image.width()));
        Ok(())
    }
    fn finish(&mut self) -> SlotframeResult<CanvasRGBA> {
        self.calls.push(Call::Finish);
        Ok(CanvasRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: Vec::new(),
            premultiplied: true,
        })
    }
}

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
    DecodedImage::from_straight_rgba8(w, h, rgba.repeat((w * h) as usize)).unwrap()
}

#[test]
fn layers_background_photos_then_frame() {
    let mut rec = Recorder {
        canvas: Canvas { width: 900, height: 1800 },
        calls: Vec::new(),
    };
    let frame = solid(9, 18, [0, 0, 0, 0]);
    let photos = [solid(4, 3, [255, 0, 0, 255]), solid(16, 9, [0, 255, 0, 255])];
    let slots = [SlotRect::new(107, 190, 686, 520), SlotRect::new(107, 990, 686, 520)];

    composite_slots(&mut rec, &frame, &photos, &slots, 2).unwrap();

    let r = 520.0 * 0.06;
    assert_eq!(
        rec.calls,
        vec![
            Call::Fill(BACKGROUND_RGBA),
            Call::Clip(slots[0].to_rect(), r),
            Call::Cover(4, slots[0].to_rect()),
            Call::Pop,
            Call::Clip(slots[1].to_rect(), r),
            Call::Cover(16, slots[1].to_rect()),
            Call::Pop,
            Call::Stretch(9),
            Call::Finish,
        ]
    );
}

#[test]
fn count_mismatch_fails_before_drawing() {
    let mut rec = Recorder {
        canvas: Canvas { width: 450, height: 1800 },
        calls: Vec::new(),
    };
    let frame = solid(1, 1, [0, 0, 0, 0]);
    let photos = [solid(1, 1, [0, 0, 0, 255])];
    let slots = [SlotRect::new(0, 0, 10, 10); 4];

    let err = composite_slots(&mut rec, &frame, &photos, &slots, 4).unwrap_err();
    assert!(matches!(
        err,
        SlotframeError::SlotCountMismatch {
            expected: 4,
            actual: 1
        }
    ));

    let four = [photos[0].clone(), photos[0].clone(), photos[0].clone(), photos[0].clone()];
    let err = composite_slots(&mut rec, &frame, &four, &slots[..3], 4).unwrap_err();
    assert!(matches!(err, SlotframeError::SlotCountMismatch { actual: 3, .. }));
    assert!(rec.calls.is_empty());
}

#[test]
fn out_of_bounds_slot_is_rejected() {
    let mut rec = Recorder {
        canvas: Canvas { width: 10, height: 10 },
        calls: Vec::new(),
    };
    let frame = solid(1, 1, [0, 0, 0, 0]);
    let photos = [solid(1, 1, [0, 0, 0, 255])];
    let err = composite_slots(&mut rec, &frame, &photos, &[SlotRect::new(5, 5, 6, 2)], 1)
        .unwrap_err();
    assert!(matches!(err, SlotframeError::InvalidInput(_)));
    assert!(rec.calls.is_empty());
}

#[test]
fn frame_overdraws_photo_outside_its_window() {
    let canvas = Canvas { width: 40, height: 80 };
    // Blue frame with a transparent window over rows 20..60, columns 4..36.
    let mut data = [0u8, 0, 255, 255].repeat(40 * 80);
    for y in 20..60 {
        for x in 4..36 {
            let i = (y * 40 + x) * 4;
            data[i..i + 4].copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    let frame = DecodedImage::from_straight_rgba8(40, 80, data).unwrap();
    let photo = solid(8, 6, [255, 0, 0, 255]);

    let mut surface = create_surface(BackendKind::Cpu, canvas).unwrap();
    let out = composite_slots(
        surface.as_mut(),
        &frame,
        &[photo],
        &[SlotRect::new(0, 10, 40, 60)],
        1,
    )
    .unwrap();

    let inside = out.pixel_at(20, 40).unwrap();
    assert!(inside[0] >= 250 && inside[2] <= 5, "{inside:?}");
    let border = out.pixel_at(20, 12).unwrap();
    assert!(border[2] >= 250 && border[0] <= 5, "{border:?}");
    assert_eq!(out.alpha_at(0, 0), Some(255));
}

#[test]
fn rasterize_frame_matches_native_size_alpha() {
    let mut data = [255u8, 255, 255, 255].repeat(6 * 6);
    for y in 2..5 {
        for x in 0..6 {
            let i = (y * 6 + x) * 4;
            data[i..i + 4].copy_from_slice(&[0, 0, 0, 0]);
        }
    }
    let frame = DecodedImage::from_straight_rgba8(6, 6, data).unwrap();
    let mut surface = create_surface(BackendKind::Cpu, Canvas { width: 6, height: 6 }).unwrap();
    let px = rasterize_frame(surface.as_mut(), &frame).unwrap();
    assert_eq!(px.alpha_at(2, 0), Some(255));
    assert!(px.alpha_at(2, 3).unwrap() < 22);
}
