//! Error types for rtprec-media.

use std::io;
use thiserror::Error;

/// Result type for rtprec-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rtprec-media operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The writer was closed, or its sink was dropped after a failed write.
    #[error("Sink not open")]
    SinkNotOpen,

    /// A codec was selected more than once while building writer options.
    #[error("Codec is already configured")]
    CodecAlreadyConfigured,

    /// The codec identifier is not one the IVF writer knows.
    #[error("Unsupported codec: {0}")]
    UnsupportedCodec(String),

    /// Payload does not fit the container's length encoding.
    #[error("Payload too large: {len} bytes (max: {max})")]
    PayloadTooLarge { len: usize, max: usize },

    /// Channel mapping family 0 only describes mono and stereo.
    #[error("Unsupported channel count: {0} (mapping family 0 allows 1 or 2)")]
    UnsupportedChannelCount(u8),

    /// The page found where the last written page should start is not that page.
    #[error("Last page (sequence {sequence}) not found at offset {offset}")]
    LastPageMismatch { sequence: u32, offset: u64 },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Offset index could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unsupported codec error.
    pub fn unsupported_codec(codec: impl Into<String>) -> Self {
        Self::UnsupportedCodec(codec.into())
    }
}
