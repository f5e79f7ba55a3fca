use super::*;

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DecodedImage {
    let data = rgba.repeat((w * h) as usize);
    DecodedImage::from_straight_rgba8(w, h, data).unwrap()
}

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| x.abs_diff(*y) <= 2)
}

#[test]
fn rejects_oversized_surfaces() {
    assert!(CpuSurface::new(Canvas { width: 70_000, height: 10 }).is_err());
}

#[test]
fn fill_covers_every_pixel() {
    let mut s = CpuSurface::new(Canvas { width: 8, height: 4 }).unwrap();
    s.fill([255, 255, 255, 255]);
    let out = s.finish().unwrap();
    assert_eq!(out.data.len(), 8 * 4 * 4);
    assert!(out.data.iter().all(|&b| b == 255));
}

#[test]
fn fresh_surface_is_transparent() {
    let mut s = CpuSurface::new(Canvas { width: 3, height: 3 }).unwrap();
    let out = s.finish().unwrap();
    assert!(out.data.iter().all(|&b| b == 0));
}

#[test]
fn cover_draw_is_clipped_to_rounded_slot() {
    let mut s = CpuSurface::new(Canvas { width: 100, height: 100 }).unwrap();
    s.fill([255, 255, 255, 255]);
    let slot = Rect::new(0.0, 0.0, 100.0, 75.0);
    s.push_rounded_clip(slot, 4.5);
    s.draw_image_cover(&solid(4, 3, [255, 0, 0, 255]), slot).unwrap();
    s.pop_clip();
    let out = s.finish().unwrap();

    assert!(close(out.pixel_at(50, 37).unwrap(), [255, 0, 0, 255]));
    // Rounded corner leaves the background visible.
    assert!(close(out.pixel_at(0, 0).unwrap(), [255, 255, 255, 255]));
    // Below the slot nothing was drawn.
    assert!(close(out.pixel_at(50, 90).unwrap(), [255, 255, 255, 255]));
}

#[test]
fn stretched_draw_fills_surface() {
    let mut data = Vec::new();
    data.extend_from_slice(&[255, 0, 0, 255]);
    data.extend_from_slice(&[0, 0, 255, 255]);
    let two_rows = DecodedImage::from_straight_rgba8(1, 2, data).unwrap();

    let mut s = CpuSurface::new(Canvas { width: 10, height: 20 }).unwrap();
    s.draw_image_stretched(&two_rows).unwrap();
    let out = s.finish().unwrap();
    assert!(close(out.pixel_at(5, 1).unwrap(), [255, 0, 0, 255]));
    assert!(close(out.pixel_at(5, 18).unwrap(), [0, 0, 255, 255]));
}

#[test]
fn finish_closes_dangling_clips_and_resets() {
    let mut s = CpuSurface::new(Canvas { width: 10, height: 10 }).unwrap();
    s.push_rounded_clip(Rect::new(0.0, 0.0, 5.0, 5.0), 1.0);
    s.fill([0, 255, 0, 255]);
    let first = s.finish().unwrap();
    assert!(close(first.pixel_at(2, 2).unwrap(), [0, 255, 0, 255]));
    assert_eq!(first.alpha_at(8, 8), Some(0));

    let second = s.finish().unwrap();
    assert!(second.data.iter().all(|&b| b == 0));
}
