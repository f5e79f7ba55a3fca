use std::fmt;
use std::io::Cursor;
use std::str::FromStr;

use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::foundation::math::unpremultiply_rgba8_in_place;
use crate::render::surface::CanvasRGBA;

/// Default quality for lossy formats.
pub const DEFAULT_QUALITY: f32 = 0.95;

/// Encoded output format.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// JPEG at [`EncodeOpts::quality`]. Alpha is dropped.
    Jpeg,
}

impl OutputFormat {
    /// MIME type of encoded bytes.
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = SlotframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(SlotframeError::invalid_input(format!(
                "unknown output format '{other}' (expected png or jpeg)"
            ))),
        }
    }
}

/// Output encoding settings.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EncodeOpts {
    /// Output format.
    pub format: OutputFormat,
    /// Quality in `(0, 1]`, used only by lossy formats.
    pub quality: f32,
}

impl Default for EncodeOpts {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl EncodeOpts {
    /// Reject qualities outside `(0, 1]`.
    pub fn validate(&self) -> SlotframeResult<()> {
        if !self.quality.is_finite() || self.quality <= 0.0 || self.quality > 1.0 {
            return Err(SlotframeError::invalid_input(format!(
                "output quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        Ok(())
    }

    fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

/// Encoded image bytes plus their MIME type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// MIME type of `bytes`.
    pub mime_type: &'static str,
}

/// Encode surface pixels.
///
/// Fails with [`SlotframeError::Encode`] when the encoder errors or produces no bytes.
pub fn encode_canvas(pixels: &CanvasRGBA, opts: &EncodeOpts) -> SlotframeResult<EncodedImage> {
    opts.validate()?;

    let mut data = pixels.data.clone();
    if pixels.premultiplied {
        unpremultiply_rgba8_in_place(&mut data);
    }
    let rgba = image::RgbaImage::from_raw(pixels.width, pixels.height, data).ok_or_else(|| {
        SlotframeError::encode(format!(
            "pixel buffer does not match {}x{}",
            pixels.width, pixels.height
        ))
    })?;

    let mut buf = Vec::new();
    match opts.format {
        OutputFormat::Png => image::DynamicImage::ImageRgba8(rgba)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| SlotframeError::encode(e.to_string()))?,
        OutputFormat::Jpeg => {
            let rgb = image::DynamicImage::ImageRgba8(rgba).to_rgb8();
            let encoder =
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, opts.jpeg_quality());
            rgb.write_with_encoder(encoder)
                .map_err(|e| SlotframeError::encode(e.to_string()))?;
        }
    }

    if buf.is_empty() {
        return Err(SlotframeError::encode("encoder produced no data"));
    }
    Ok(EncodedImage {
        bytes: buf,
        mime_type: opts.format.mime_type(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/encode/raster.rs"]
mod tests;
