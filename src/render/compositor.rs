use crate::assets::decode::DecodedImage;
use crate::foundation::core::SlotRect;
use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::layout::geometry::corner_radius;
use crate::render::surface::{CanvasRGBA, RasterSurface};

/// Opaque background painted under everything.
pub const BACKGROUND_RGBA: [u8; 4] = [255, 255, 255, 255];

/// Draw `frame` stretched over a cleared surface and read it back.
///
/// This normalizes frames of any native size to the surface's coordinate space before slot
/// detection.
pub fn rasterize_frame(
    surface: &mut dyn RasterSurface,
    frame: &DecodedImage,
) -> SlotframeResult<CanvasRGBA> {
    surface.draw_image_stretched(frame)?;
    surface.finish()
}

/// Composite `photos` into `slots` and lay `frame` over them.
///
/// Layering: white background, then each photo clipped to its rounded slot, then the frame
/// stretched over the whole surface. Counts are checked before anything is drawn.
pub fn composite_slots(
    surface: &mut dyn RasterSurface,
    frame: &DecodedImage,
    photos: &[DecodedImage],
    slots: &[SlotRect],
    expected: usize,
) -> SlotframeResult<CanvasRGBA> {
    if photos.len() != expected {
        return Err(SlotframeError::slot_count_mismatch(expected, photos.len()));
    }
    if slots.len() != expected {
        return Err(SlotframeError::slot_count_mismatch(expected, slots.len()));
    }
    let canvas = surface.canvas();
    if let Some(bad) = slots.iter().find(|s| !s.fits_within(canvas)) {
        return Err(SlotframeError::invalid_input(format!(
            "slot {bad:?} lies outside the {}x{} canvas",
            canvas.width, canvas.height
        )));
    }

    surface.fill(BACKGROUND_RGBA);
    for (photo, slot) in photos.iter().zip(slots) {
        let rect = slot.to_rect();
        surface.push_rounded_clip(rect, corner_radius(*slot));
        surface.draw_image_cover(photo, rect)?;
        surface.pop_clip();
    }
    surface.draw_image_stretched(frame)?;
    surface.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
