/// Convenience result type used across slotframe.
pub type SlotframeResult<T> = Result<T, SlotframeError>;

/// Top-level error taxonomy for the compositing pipeline.
///
/// Every failure propagates to the caller; nothing in the pipeline retries.
#[derive(thiserror::Error, Debug)]
pub enum SlotframeError {
    /// Caller supplied a missing frame or the wrong number of photos.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Bytes were obtained but could not be parsed as an image.
    #[error("decode error ({origin}): {message}")]
    Decode {
        /// Label of the byte source that failed.
        origin: String,
        /// Underlying decoder message.
        message: String,
    },

    /// Bytes could not be read from disk or fetched over HTTP.
    #[error("fetch error ({origin}): {message}")]
    Fetch {
        /// Label of the byte source that failed.
        origin: String,
        /// Underlying IO or transport message.
        message: String,
    },

    /// Photo or slot count does not match the layout's expected slot count.
    #[error("slot count mismatch: expected {expected}, got {actual}")]
    SlotCountMismatch {
        /// Slots required by the layout.
        expected: usize,
        /// Count actually supplied.
        actual: usize,
    },

    /// The final canvas produced no encoded bytes.
    #[error("encode error: {0}")]
    Encode(String),

    /// The caller cancelled the pipeline.
    #[error("compositing cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or worker tasks.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlotframeError {
    /// Build a [`SlotframeError::InvalidInput`] value.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Build a [`SlotframeError::Decode`] value.
    pub fn decode(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Build a [`SlotframeError::Fetch`] value.
    pub fn fetch(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Build a [`SlotframeError::SlotCountMismatch`] value.
    pub fn slot_count_mismatch(expected: usize, actual: usize) -> Self {
        Self::SlotCountMismatch { expected, actual }
    }

    /// Build a [`SlotframeError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
