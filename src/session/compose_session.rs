use std::future::Future;

use anyhow::Context as _;
use futures_util::{StreamExt as _, TryStreamExt as _, stream};
use tokio_util::sync::CancellationToken;

use crate::assets::decode::DecodedImage;
use crate::assets::loader::ImageLoader;
use crate::assets::source::ByteSource;
use crate::encode::raster::encode_canvas;
use crate::foundation::core::{LayoutType, SlotRect, SlotSource};
use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::layout::detect::{DetectOpts, detect_slots};
use crate::layout::fallback::fallback_slots;
use crate::render::compositor::{composite_slots, rasterize_frame};
use crate::render::surface::{BackendKind, CanvasRGBA, create_surface};
use crate::session::opts::ComposeOpts;

/// One compositing job.
#[derive(Clone, Debug)]
pub struct ComposeRequest {
    /// Frame graphic with transparent windows. Required.
    pub frame: Option<ByteSource>,
    /// Photos in slot order, top to bottom.
    pub photos: Vec<ByteSource>,
    /// Target layout.
    pub layout: LayoutType,
}

impl ComposeRequest {
    /// Request with a frame source set.
    pub fn new(frame: ByteSource, photos: Vec<ByteSource>, layout: LayoutType) -> Self {
        Self {
            frame: Some(frame),
            photos,
            layout,
        }
    }
}

/// Pipeline stage, reported in trace events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComposeStage {
    /// Request shape checks, before any IO.
    Validating,
    /// Frame load and slot detection.
    Detecting,
    /// Photo loads, drawing and encoding.
    Compositing,
    /// Result produced.
    Done,
}

/// Encoded composite plus the geometry it was drawn with.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CompositeResult {
    /// Encoded image bytes.
    #[serde(skip)]
    pub image: Vec<u8>,
    /// MIME type of `image`.
    pub mime_type: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Slots the photos were drawn into, top to bottom.
    pub slots: Vec<SlotRect>,
    /// Whether `slots` came from detection or the fallback layout.
    pub slot_source: SlotSource,
}

/// Slot geometry chosen for a frame.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SlotPlan {
    /// Slots to draw into, top to bottom.
    pub slots: Vec<SlotRect>,
    /// Where `slots` came from.
    pub source: SlotSource,
    /// Number of slots detection found before any fallback.
    pub detected: usize,
}

/// Async compositing pipeline.
///
/// A session owns its options and an HTTP client; it keeps no per-request state, so one session
/// may serve many concurrent requests.
#[derive(Clone, Debug)]
pub struct ComposeSession {
    opts: ComposeOpts,
    loader: ImageLoader,
}

impl ComposeSession {
    /// Validate `opts` and build the shared loader.
    pub fn new(opts: ComposeOpts) -> SlotframeResult<Self> {
        opts.validate()?;
        let loader = ImageLoader::new(opts.fetch_timeout())?;
        Ok(Self { opts, loader })
    }

    /// Options this session was built with.
    pub fn opts(&self) -> &ComposeOpts {
        &self.opts
    }

    /// Run the full pipeline for `request`.
    ///
    /// Fails without side effects when the request is malformed. Cancellation is observed before
    /// each load, before detection, before compositing and before encoding; a cancelled run
    /// returns [`SlotframeError::Cancelled`].
    #[tracing::instrument(
        skip(self, request, cancel),
        fields(layout = %request.layout, photos = request.photos.len())
    )]
    pub async fn composite(
        &self,
        request: ComposeRequest,
        cancel: &CancellationToken,
    ) -> SlotframeResult<CompositeResult> {
        enter_stage(ComposeStage::Validating);
        let ComposeRequest {
            frame,
            photos,
            layout,
        } = request;
        let frame = validate_request(frame, &photos, layout)?;
        let backend = self.opts.backend;

        enter_stage(ComposeStage::Detecting);
        let frame = until_cancelled(cancel, self.loader.load(&frame, Some(layout.canvas()))).await?;
        ensure_live(cancel)?;
        let plan = {
            let frame = frame.clone();
            tokio::task::spawn_blocking(move || plan_slots(&frame, layout, backend))
                .await
                .context("slot detection worker failed")??
        };

        enter_stage(ComposeStage::Compositing);
        let photos = self.load_photos(&photos, cancel).await?;
        ensure_live(cancel)?;
        let pixels = {
            let slots = plan.slots.clone();
            tokio::task::spawn_blocking(move || render_slots(&frame, &photos, &slots, layout, backend))
                .await
                .context("compositing worker failed")??
        };
        ensure_live(cancel)?;
        let output = self.opts.output;
        let encoded = tokio::task::spawn_blocking(move || encode_canvas(&pixels, &output))
            .await
            .context("encode worker failed")??;

        enter_stage(ComposeStage::Done);
        let canvas = layout.canvas();
        Ok(CompositeResult {
            image: encoded.bytes,
            mime_type: encoded.mime_type.to_string(),
            width: canvas.width,
            height: canvas.height,
            slots: plan.slots,
            slot_source: plan.source,
        })
    }

    /// Load `frame` and report the slots a composite would use, without loading photos.
    #[tracing::instrument(skip(self, frame, cancel), fields(frame = %frame, layout = %layout))]
    pub async fn detect(
        &self,
        frame: &ByteSource,
        layout: LayoutType,
        cancel: &CancellationToken,
    ) -> SlotframeResult<SlotPlan> {
        let frame = until_cancelled(cancel, self.loader.load(frame, Some(layout.canvas()))).await?;
        ensure_live(cancel)?;
        let backend = self.opts.backend;
        tokio::task::spawn_blocking(move || plan_slots(&frame, layout, backend))
            .await
            .context("slot detection worker failed")?
    }

    async fn load_photos(
        &self,
        photos: &[ByteSource],
        cancel: &CancellationToken,
    ) -> SlotframeResult<Vec<DecodedImage>> {
        stream::iter(photos)
            .map(|src| until_cancelled(cancel, self.loader.load(src, None)))
            .buffered(self.opts.max_concurrent_loads.max(1))
            .try_collect()
            .await
    }
}

/// Composite with default options and no cancellation.
pub async fn composite(
    frame: ByteSource,
    photos: Vec<ByteSource>,
    layout: LayoutType,
) -> SlotframeResult<CompositeResult> {
    let session = ComposeSession::new(ComposeOpts::default())?;
    session
        .composite(
            ComposeRequest::new(frame, photos, layout),
            &CancellationToken::new(),
        )
        .await
}

/// Detect, composite and encode already-decoded images on the calling thread.
///
/// `frame` may be any size; it is stretched to the layout canvas. Performs no IO.
pub fn compose_decoded(
    frame: &DecodedImage,
    photos: &[DecodedImage],
    layout: LayoutType,
    opts: &ComposeOpts,
) -> SlotframeResult<CompositeResult> {
    opts.validate()?;
    check_photo_count(photos.len(), layout)?;
    let plan = plan_slots(frame, layout, opts.backend)?;
    let pixels = render_slots(frame, photos, &plan.slots, layout, opts.backend)?;
    let encoded = encode_canvas(&pixels, &opts.output)?;
    Ok(CompositeResult {
        image: encoded.bytes,
        mime_type: encoded.mime_type.to_string(),
        width: pixels.width,
        height: pixels.height,
        slots: plan.slots,
        slot_source: plan.source,
    })
}

/// Detect slots in `frame`, substituting the fallback layout unless exactly the expected
/// number is found.
pub fn plan_slots(
    frame: &DecodedImage,
    layout: LayoutType,
    backend: BackendKind,
) -> SlotframeResult<SlotPlan> {
    let canvas = layout.canvas();
    let expected = layout.expected_slots();
    let mut surface = create_surface(backend, canvas)?;
    let pixels = rasterize_frame(surface.as_mut(), frame)?;
    drop(surface);

    let detected = detect_slots(&pixels, expected, &DetectOpts::for_layout(layout));
    if detected.len() == expected {
        tracing::debug!(slots = expected, "using detected slots");
        return Ok(SlotPlan {
            slots: detected,
            source: SlotSource::Detected,
            detected: expected,
        });
    }

    tracing::warn!(
        expected,
        detected = detected.len(),
        %layout,
        "slot detection mismatch, using fallback layout"
    );
    Ok(SlotPlan {
        slots: fallback_slots(canvas, expected),
        source: SlotSource::Fallback,
        detected: detected.len(),
    })
}

fn render_slots(
    frame: &DecodedImage,
    photos: &[DecodedImage],
    slots: &[SlotRect],
    layout: LayoutType,
    backend: BackendKind,
) -> SlotframeResult<CanvasRGBA> {
    let mut surface = create_surface(backend, layout.canvas())?;
    composite_slots(
        surface.as_mut(),
        frame,
        photos,
        slots,
        layout.expected_slots(),
    )
}

fn validate_request(
    frame: Option<ByteSource>,
    photos: &[ByteSource],
    layout: LayoutType,
) -> SlotframeResult<ByteSource> {
    let frame = frame.ok_or_else(|| SlotframeError::invalid_input("frame source is required"))?;
    check_photo_count(photos.len(), layout)?;
    Ok(frame)
}

fn check_photo_count(actual: usize, layout: LayoutType) -> SlotframeResult<()> {
    let expected = layout.expected_slots();
    if actual != expected {
        return Err(SlotframeError::invalid_input(format!(
            "{layout} layout needs {expected} photos, got {actual}"
        )));
    }
    Ok(())
}

fn enter_stage(stage: ComposeStage) {
    tracing::debug!(?stage, "compose stage");
}

fn ensure_live(cancel: &CancellationToken) -> SlotframeResult<()> {
    if cancel.is_cancelled() {
        return Err(SlotframeError::Cancelled);
    }
    Ok(())
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = SlotframeResult<T>>,
) -> SlotframeResult<T> {
    ensure_live(cancel)?;
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SlotframeError::Cancelled),
        res = fut => res,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/compose_session.rs"]
mod tests;
