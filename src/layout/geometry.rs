use crate::foundation::core::{Affine, Canvas, Rect, SlotRect, Vec2};

/// Width-to-height ratio every slot is fitted to.
///
/// Frames whose transparent windows are not 4:3 get a 4:3 photo area centered inside the
/// window; the frame's opaque border then covers any overlap.
pub const SLOT_ASPECT: f64 = 4.0 / 3.0;

/// Corner radius as a fraction of a slot's shorter side.
pub const CORNER_RADIUS_FRAC: f64 = 0.06;

/// Largest rectangle of aspect `aspect` centered on `bounds` and contained in it.
pub fn fit_aspect_centered(bounds: Rect, aspect: f64) -> Rect {
    let (w, h) = (bounds.width(), bounds.height());
    if w <= 0.0 || h <= 0.0 {
        return Rect::from_center_size(bounds.center(), (0.0, 0.0));
    }
    let (fw, fh) = if w / h > aspect {
        (h * aspect, h)
    } else {
        (w, w / aspect)
    };
    Rect::from_center_size(bounds.center(), (fw, fh))
}

/// Grow `rect` on every side by `frac` of its shorter side.
pub fn expand_by_shorter_side(rect: Rect, frac: f64) -> Rect {
    let m = rect.width().min(rect.height()) * frac;
    rect.inflate(m, m)
}

/// Clamp `rect` to `canvas` and snap it to whole pixels.
///
/// Returns `None` when nothing of the rectangle survives.
pub fn snap_to_canvas(rect: Rect, canvas: Canvas) -> Option<SlotRect> {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let x0 = rect.x0.round().clamp(0.0, cw) as u32;
    let x1 = rect.x1.round().clamp(0.0, cw) as u32;
    let y0 = rect.y0.round().clamp(0.0, ch) as u32;
    let y1 = rect.y1.round().clamp(0.0, ch) as u32;
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some(SlotRect::new(x0, y0, x1 - x0, y1 - y0))
}

/// Rounded-corner radius used when clipping a photo to `slot`.
pub fn corner_radius(slot: SlotRect) -> f64 {
    f64::from(slot.shorter_side()) * CORNER_RADIUS_FRAC
}

/// Placement of a source image that fully covers a slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Top-left corner of the scaled source in canvas space.
    pub offset: Vec2,
    /// Size of the scaled source.
    pub size: Vec2,
}

impl CoverFit {
    /// Source-pixel to canvas transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Canvas-space rectangle covered by the scaled source.
    pub fn drawn_rect(&self) -> Rect {
        Rect::new(
            self.offset.x,
            self.offset.y,
            self.offset.x + self.size.x,
            self.offset.y + self.size.y,
        )
    }
}

/// Scale `src_w x src_h` uniformly so it covers `slot`, cropping overflow evenly.
///
/// A source relatively wider than the slot is fitted by height and centered horizontally;
/// otherwise it is fitted by width and centered vertically.
pub fn cover_fit(src_w: u32, src_h: u32, slot: Rect) -> CoverFit {
    let sw = f64::from(src_w.max(1));
    let sh = f64::from(src_h.max(1));
    let src_aspect = sw / sh;
    let slot_aspect = slot.width() / slot.height().max(f64::EPSILON);

    let scale = if src_aspect > slot_aspect {
        slot.height() / sh
    } else {
        slot.width() / sw
    };
    let size = Vec2::new(sw * scale, sh * scale);
    let offset = Vec2::new(
        slot.x0 + (slot.width() - size.x) / 2.0,
        slot.y0 + (slot.height() - size.y) / 2.0,
    );
    CoverFit {
        scale,
        offset,
        size,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
