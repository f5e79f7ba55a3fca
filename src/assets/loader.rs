use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::source::ByteSource;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SlotframeError, SlotframeResult};

/// Reads image bytes from files, URLs or memory and decodes them off the async executor.
///
/// The HTTP client is shared across loads; nothing else is retained between calls.
#[derive(Clone, Debug)]
pub struct ImageLoader {
    http: reqwest::Client,
}

impl ImageLoader {
    /// Create a loader whose HTTP requests give up after `fetch_timeout`.
    pub fn new(fetch_timeout: Duration) -> SlotframeResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .context("build http client")?;
        Ok(Self { http })
    }

    /// Obtain the raw bytes of `source`.
    ///
    /// IO and transport failures, including non-success HTTP statuses, map to
    /// [`SlotframeError::Fetch`].
    pub async fn read_bytes(&self, source: &ByteSource) -> SlotframeResult<Arc<[u8]>> {
        match source {
            ByteSource::File(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| SlotframeError::fetch(source.to_string(), e.to_string()))?;
                Ok(bytes.into())
            }
            ByteSource::Url(url) => {
                let fetch_err = |e: reqwest::Error| SlotframeError::fetch(url.as_str(), e.to_string());
                let response = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(fetch_err)?
                    .error_for_status()
                    .map_err(fetch_err)?;
                let bytes = response.bytes().await.map_err(fetch_err)?;
                Ok(Arc::from(bytes.as_ref()))
            }
            ByteSource::Memory { bytes, .. } => Ok(Arc::clone(bytes)),
        }
    }

    /// Fetch and decode `source`.
    ///
    /// `raster_size` only affects vector sources, which are rasterized directly at that size.
    /// The encoded bytes are moved into the decode worker and dropped there on every path.
    #[tracing::instrument(skip(self, source), fields(source = %source))]
    pub async fn load(
        &self,
        source: &ByteSource,
        raster_size: Option<Canvas>,
    ) -> SlotframeResult<DecodedImage> {
        let bytes = self.read_bytes(source).await?;
        let origin = source.to_string();
        let decoded =
            tokio::task::spawn_blocking(move || decode_image(&origin, &bytes, raster_size))
                .await
                .context("image decode worker failed")??;
        tracing::debug!(
            width = decoded.width(),
            height = decoded.height(),
            "decoded image"
        );
        Ok(decoded)
    }
}
