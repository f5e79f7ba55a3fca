use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;

use crate::encode::raster::EncodeOpts;
use crate::foundation::error::{SlotframeError, SlotframeResult};
use crate::render::surface::BackendKind;

/// Options controlling a [`ComposeSession`](crate::ComposeSession).
///
/// Every field has a default, so a partial JSON document such as `{"output": {"format": "jpeg"}}`
/// is a valid configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeOpts {
    /// Upper bound on photo loads in flight. `1` loads sequentially.
    pub max_concurrent_loads: usize,
    /// Per-request timeout for URL sources, in seconds.
    pub fetch_timeout_secs: u64,
    /// Surface implementation used for detection and compositing.
    pub backend: BackendKind,
    /// Output encoding.
    pub output: EncodeOpts,
}

impl Default for ComposeOpts {
    fn default() -> Self {
        Self {
            max_concurrent_loads: 1,
            fetch_timeout_secs: 30,
            backend: BackendKind::Cpu,
            output: EncodeOpts::default(),
        }
    }
}

impl ComposeOpts {
    /// Load and validate options from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> SlotframeResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read compose options '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text).map_err(|e| {
            SlotframeError::invalid_input(format!(
                "compose options '{}': {e}",
                path.display()
            ))
        })?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject zero concurrency, zero timeouts and out-of-range output quality.
    pub fn validate(&self) -> SlotframeResult<()> {
        if self.max_concurrent_loads == 0 {
            return Err(SlotframeError::invalid_input(
                "max_concurrent_loads must be at least 1",
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err(SlotframeError::invalid_input(
                "fetch_timeout_secs must be at least 1",
            ));
        }
        self.output.validate()
    }

    /// [`Self::fetch_timeout_secs`] as a [`Duration`].
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/opts.rs"]
mod tests;
