use crate::assets::decode::DecodedImage;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::error::SlotframeResult;

/// Pixels read back from a [`RasterSurface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanvasRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl CanvasRGBA {
    /// Alpha of the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn alpha_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4 + 3;
        self.data.get(i).copied()
    }

    /// RGBA of the pixel at `(x, y)`, or `None` outside the canvas.
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Off-screen 2D drawing target used by detection and compositing.
///
/// Draw calls are recorded in order and resolved by [`RasterSurface::finish`]. Coordinates are
/// canvas pixels with the origin at the top-left.
pub trait RasterSurface {
    /// Surface dimensions.
    fn canvas(&self) -> Canvas;

    /// Cover the whole surface with a straight-alpha RGBA8 color.
    fn fill(&mut self, rgba: [u8; 4]);

    /// Restrict subsequent drawing to a rounded rectangle until the matching
    /// [`RasterSurface::pop_clip`].
    fn push_rounded_clip(&mut self, rect: Rect, radius: f64);

    /// Remove the most recent clip. No-op when no clip is active.
    fn pop_clip(&mut self);

    /// Draw `image` uniformly scaled to cover `slot`, centered, overflow cropped by the clip.
    fn draw_image_cover(&mut self, image: &DecodedImage, slot: Rect) -> SlotframeResult<()>;

    /// Draw `image` stretched over the entire surface.
    fn draw_image_stretched(&mut self, image: &DecodedImage) -> SlotframeResult<()>;

    /// Resolve recorded drawing and read back premultiplied pixels.
    ///
    /// Open clips are closed first. The surface is cleared afterwards and may be reused.
    fn finish(&mut self) -> SlotframeResult<CanvasRGBA>;
}

/// Available surface implementations.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// CPU rasterizer powered by `vello_cpu`.
    #[default]
    Cpu,
}

/// Allocate a transparent surface of `canvas` size.
pub fn create_surface(kind: BackendKind, canvas: Canvas) -> SlotframeResult<Box<dyn RasterSurface>> {
    match kind {
        BackendKind::Cpu => Ok(Box::new(crate::render::cpu::CpuSurface::new(canvas)?)),
    }
}
