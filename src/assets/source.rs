use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use url::Url;

use crate::foundation::error::{SlotframeError, SlotframeResult};

/// Where the bytes of an image come from.
///
/// The pipeline treats every variant the same way once the bytes are in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ByteSource {
    /// A local file.
    File(PathBuf),
    /// An `http`/`https` URL fetched with a GET request.
    Url(Url),
    /// Bytes already held by the caller.
    Memory {
        /// Label used in logs and errors.
        label: String,
        /// Encoded image bytes.
        bytes: Arc<[u8]>,
    },
}

impl ByteSource {
    /// Wrap in-memory bytes under `label`.
    pub fn memory(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Memory {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Parse a URL string, rejecting schemes other than `http` and `https`.
    pub fn url(s: &str) -> SlotframeResult<Self> {
        let url = Url::parse(s)
            .map_err(|e| SlotframeError::invalid_input(format!("invalid url '{s}': {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Url(url)),
            other => Err(SlotframeError::invalid_input(format!(
                "unsupported url scheme '{other}' in '{s}'"
            ))),
        }
    }
}

impl fmt::Display for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(p) => write!(f, "{}", p.display()),
            Self::Url(u) => write!(f, "{u}"),
            Self::Memory { label, .. } => write!(f, "memory:{label}"),
        }
    }
}

impl FromStr for ByteSource {
    type Err = SlotframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SlotframeError::invalid_input("image source must be non-empty"));
        }
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Self::url(s);
        }
        Ok(Self::File(PathBuf::from(s)))
    }
}

impl From<PathBuf> for ByteSource {
    fn from(p: PathBuf) -> Self {
        Self::File(p)
    }
}

impl From<Url> for ByteSource {
    fn from(u: Url) -> Self {
        Self::Url(u)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
