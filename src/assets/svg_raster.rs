use crate::foundation::core::Canvas;
use crate::foundation::error::{SlotframeError, SlotframeResult};

/// Largest raster side we are willing to allocate for an SVG.
const MAX_DIM: u32 = 16_384;

/// Pick the raster size for an SVG: the requested canvas when given, its intrinsic size otherwise.
pub(crate) fn svg_raster_size(
    tree: &usvg::Tree,
    requested: Option<Canvas>,
) -> SlotframeResult<(u32, u32)> {
    fn to_px(v: f32) -> SlotframeResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(SlotframeError::Other(anyhow::anyhow!(
                "svg has invalid width/height"
            )));
        }
        Ok((v.ceil() as u32).max(1))
    }

    let (w, h) = match requested {
        Some(c) => (c.width, c.height),
        None => {
            let size = tree.size();
            (to_px(size.width())?, to_px(size.height())?)
        }
    };

    if w > MAX_DIM || h > MAX_DIM {
        return Err(SlotframeError::Other(anyhow::anyhow!(
            "svg raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

/// Render `tree` stretched to `width x height`, returning premultiplied RGBA8.
pub(crate) fn rasterize_svg_to_premul_rgba8(
    tree: &usvg::Tree,
    width: u32,
    height: u32,
) -> SlotframeResult<Vec<u8>> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| SlotframeError::Other(anyhow::anyhow!("failed to allocate svg pixmap")))?;

    let sx = (width as f32) / tree.size().width();
    let sy = (height as f32) / tree.size().height();
    let xform = resvg::tiny_skia::Transform::from_scale(sx, sy);

    resvg::render(tree, xform, &mut pixmap.as_mut());
    Ok(pixmap.take())
}
