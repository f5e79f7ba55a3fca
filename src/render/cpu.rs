use std::sync::Arc;

use kurbo::Shape;

use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Affine, BezPath, Canvas, Rect, RoundedRect};
use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::layout::geometry::cover_fit;
use crate::render::surface::{CanvasRGBA, RasterSurface};

/// [`RasterSurface`] backed by a `vello_cpu` render context.
pub struct CpuSurface {
    ctx: vello_cpu::RenderContext,
    width: u16,
    height: u16,
    clip_depth: usize,
}

impl CpuSurface {
    /// Allocate a transparent surface. Each side must fit in `u16`.
    pub fn new(canvas: Canvas) -> SlotframeResult<Self> {
        let width: u16 = canvas.width.try_into().map_err(|_| {
            SlotframeError::invalid_input(format!("surface width exceeds u16: {}", canvas.width))
        })?;
        let height: u16 = canvas.height.try_into().map_err(|_| {
            SlotframeError::invalid_input(format!("surface height exceeds u16: {}", canvas.height))
        })?;
        if width == 0 || height == 0 {
            return Err(SlotframeError::invalid_input("surface must be non-empty"));
        }
        Ok(Self {
            ctx: vello_cpu::RenderContext::new(width, height),
            width,
            height,
            clip_depth: 0,
        })
    }

    fn full_rect(&self) -> vello_cpu::kurbo::Rect {
        vello_cpu::kurbo::Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    fn draw_image_with(&mut self, image: &DecodedImage, transform: Affine) -> SlotframeResult<()> {
        let paint = image_paint(image)?;
        self.ctx.set_transform(affine_to_cpu(transform));
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(image.width()),
            f64::from(image.height()),
        ));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }
}

impl RasterSurface for CpuSurface {
    fn canvas(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    fn fill(&mut self, rgba: [u8; 4]) {
        let [r, g, b, a] = rgba;
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        let full = self.full_rect();
        self.ctx.fill_rect(&full);
    }

    fn push_rounded_clip(&mut self, rect: Rect, radius: f64) {
        let rr = RoundedRect::from_rect(rect, radius);
        let path = bezpath_to_cpu(&rr.to_path(0.1));
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&path);
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth > 0 {
            self.ctx.pop_layer();
            self.clip_depth -= 1;
        }
    }

    fn draw_image_cover(&mut self, image: &DecodedImage, slot: Rect) -> SlotframeResult<()> {
        let fit = cover_fit(image.width(), image.height(), slot);
        self.draw_image_with(image, fit.transform())
    }

    fn draw_image_stretched(&mut self, image: &DecodedImage) -> SlotframeResult<()> {
        let sx = f64::from(self.width) / f64::from(image.width());
        let sy = f64::from(self.height) / f64::from(image.height());
        self.draw_image_with(image, Affine::scale_non_uniform(sx, sy))
    }

    fn finish(&mut self) -> SlotframeResult<CanvasRGBA> {
        while self.clip_depth > 0 {
            self.pop_clip();
        }
        self.ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        self.ctx.render_to_pixmap(&mut pixmap);
        self.ctx.reset();

        Ok(CanvasRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }
}

fn image_paint(image: &DecodedImage) -> SlotframeResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(image.pixels(), image.width(), image.height())?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> SlotframeResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| SlotframeError::invalid_input(format!("image width exceeds u16: {width}")))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| SlotframeError::invalid_input(format!("image height exceeds u16: {height}")))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(SlotframeError::Other(anyhow::anyhow!(
            "pixmap byte len mismatch"
        )));
    }
    let pixels = bytes
        .chunks_exact(4)
        .map(|px| vello_cpu::peniko::color::PremulRgba8::from_u8_array([px[0], px[1], px[2], px[3]]))
        .collect::<Vec<_>>();
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
