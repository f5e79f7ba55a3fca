use crate::foundation::core::{Canvas, SlotRect};
use crate::layout::geometry::SLOT_ASPECT;

/// Vertical gap before, between and after slots, as a fraction of canvas height.
pub const GAP_FRAC: f64 = 0.03;
/// Widest a fallback slot may be, as a fraction of canvas width.
pub const MAX_WIDTH_FRAC: f64 = 0.9;

/// Evenly spaced, horizontally centered slots stacked top to bottom.
///
/// Always returns exactly `count` rectangles inside `canvas`. When the gaps alone would eat the
/// whole height the gaps are dropped, and every rectangle is at least 1x1.
pub fn fallback_slots(canvas: Canvas, count: usize) -> Vec<SlotRect> {
    if count == 0 || canvas.width == 0 || canvas.height == 0 {
        return Vec::new();
    }
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let n = count as f64;

    let mut gap = ch * GAP_FRAC;
    let mut slot_h = (ch - gap * (n + 1.0)) / n;
    if slot_h < 1.0 {
        gap = 0.0;
        slot_h = ch / n;
    }
    let slot_w = (slot_h * SLOT_ASPECT).min(cw * MAX_WIDTH_FRAC);

    let w = (slot_w.floor() as u32).clamp(1, canvas.width);
    let x = (canvas.width - w) / 2;

    (0..count)
        .map(|i| {
            let top = gap + (i as f64) * (slot_h + gap);
            let y = (top.floor() as u32).min(canvas.height - 1);
            let h = (slot_h.floor() as u32).clamp(1, canvas.height - y);
            SlotRect::new(x, y, w, h)
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/fallback.rs"]
mod tests;
