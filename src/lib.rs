//! Slotframe composites photos into the transparent windows of a decorative frame graphic.
//!
//! The pipeline is session-oriented:
//!
//! - Build a [`ComposeSession`] from [`ComposeOpts`]
//! - Submit a [`ComposeRequest`] naming a frame, photos and a [`LayoutType`]
//! - Receive a [`CompositeResult`] with the encoded image and the slot geometry used
//!
//! Slots are found by scanning the frame's alpha channel for transparent horizontal bands. When
//! the scan does not find exactly the layout's slot count, a deterministic evenly spaced layout is
//! used instead.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod encode;
mod foundation;
mod layout;
mod render;
mod session;

pub use crate::foundation::core::{
    Affine, Canvas, LAYOUT_HEIGHT, LayoutType, Rect, SlotRect, SlotSource, Vec2,
};
pub use crate::foundation::error::{SlotframeError, SlotframeResult};

pub use crate::assets::decode::{DecodedImage, MAX_DECODED_SIDE, decode_image};
pub use crate::assets::loader::ImageLoader;
pub use crate::assets::source::ByteSource;
pub use crate::encode::raster::{
    DEFAULT_QUALITY, EncodeOpts, EncodedImage, OutputFormat, encode_canvas,
};
pub use crate::layout::detect::{Band, DetectOpts, detect_slots};
pub use crate::layout::fallback::fallback_slots;
pub use crate::layout::geometry::{
    CORNER_RADIUS_FRAC, CoverFit, SLOT_ASPECT, corner_radius, cover_fit,
};
pub use crate::render::compositor::{BACKGROUND_RGBA, composite_slots, rasterize_frame};
pub use crate::render::cpu::CpuSurface;
pub use crate::render::surface::{BackendKind, CanvasRGBA, RasterSurface, create_surface};
pub use crate::session::compose_session::{
    ComposeRequest, ComposeSession, ComposeStage, CompositeResult, SlotPlan, compose_decoded,
    composite, plan_slots,
};
pub use crate::session::opts::ComposeOpts;

pub use tokio_util::sync::CancellationToken;
