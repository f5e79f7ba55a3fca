use std::io::Cursor;
use std::sync::Arc;

use anyhow::Context;
use image::ImageDecoder as _;

use crate::assets::svg_raster::{rasterize_svg_to_premul_rgba8, svg_raster_size};
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Raster images with a longer side are downscaled on decode, preserving aspect.
pub const MAX_DECODED_SIDE: u32 = 16_384;

/// Immutable decoded bitmap.
///
/// Pixels are premultiplied RGBA8, row-major, tightly packed. Clones share the pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl DecodedImage {
    /// Build from straight-alpha RGBA8 pixels.
    pub fn from_straight_rgba8(width: u32, height: u32, mut rgba: Vec<u8>) -> SlotframeResult<Self> {
        check_len(width, height, rgba.len())?;
        premultiply_rgba8_in_place(&mut rgba);
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Build from pixels that are already premultiplied.
    pub fn from_premul_rgba8(width: u32, height: u32, rgba: Vec<u8>) -> SlotframeResult<Self> {
        check_len(width, height, rgba.len())?;
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba),
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixel bytes.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba8_premul
    }

    /// Width divided by height.
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

fn check_len(width: u32, height: u32, len: usize) -> SlotframeResult<()> {
    if width == 0 || height == 0 {
        return Err(SlotframeError::invalid_input(format!(
            "image must be non-empty, got {width}x{height}"
        )));
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| SlotframeError::invalid_input("image size overflow"))?;
    if len != expected {
        return Err(SlotframeError::invalid_input(format!(
            "rgba8 buffer length {len} does not match {width}x{height}"
        )));
    }
    Ok(())
}

/// Decode encoded bytes from `origin` into a [`DecodedImage`].
///
/// Raster formats decode at their intrinsic display size: EXIF orientation is applied, and
/// images longer than [`MAX_DECODED_SIDE`] on either side are downscaled to fit. SVG documents
/// are rasterized at `raster_size` when given, otherwise at their intrinsic size. Any failure is
/// reported as [`SlotframeError::Decode`] naming `origin`.
pub fn decode_image(
    origin: &str,
    bytes: &[u8],
    raster_size: Option<Canvas>,
) -> SlotframeResult<DecodedImage> {
    decode_any(bytes, raster_size).map_err(|e| SlotframeError::decode(origin, format!("{e:#}")))
}

fn decode_any(bytes: &[u8], raster_size: Option<Canvas>) -> anyhow::Result<DecodedImage> {
    if image::guess_format(bytes).is_err() && looks_like_svg(bytes) {
        return decode_svg(bytes, raster_size);
    }
    decode_raster(bytes)
}

fn decode_raster(bytes: &[u8]) -> anyhow::Result<DecodedImage> {
    let mut decoder = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("guess image format")?
        .into_decoder()
        .context("open image decoder")?;
    let orientation = decoder.orientation().context("read image orientation")?;
    let mut dyn_img =
        image::DynamicImage::from_decoder(decoder).context("decode image from memory")?;
    dyn_img.apply_orientation(orientation);

    if dyn_img.width() > MAX_DECODED_SIDE || dyn_img.height() > MAX_DECODED_SIDE {
        tracing::debug!(
            width = dyn_img.width(),
            height = dyn_img.height(),
            "downscaling oversized image"
        );
        dyn_img = dyn_img.resize(
            MAX_DECODED_SIDE,
            MAX_DECODED_SIDE,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(DecodedImage::from_straight_rgba8(
        width,
        height,
        rgba.into_raw(),
    )?)
}

fn decode_svg(bytes: &[u8], raster_size: Option<Canvas>) -> anyhow::Result<DecodedImage> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
    let (w, h) = svg_raster_size(&tree, raster_size)?;
    let data = rasterize_svg_to_premul_rgba8(&tree, w, h)?;
    Ok(DecodedImage::from_premul_rgba8(w, h, data)?)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with('<') && text.contains("<svg")
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
