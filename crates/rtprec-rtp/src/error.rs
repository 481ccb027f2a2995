//! Error types for rtprec-rtp.

use thiserror::Error;

/// Result type for rtprec-rtp operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for rtprec-rtp operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The packet payload is malformed for its codec.
    #[error("Depacketize error: {0}")]
    Depacketize(#[from] DepacketizeError),

    /// The container writer failed.
    #[error(transparent)]
    Media(#[from] rtprec_media::Error),
}

/// Malformed RTP payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepacketizeError {
    /// Payload carries no bytes at all.
    #[error("Empty payload")]
    Empty,

    /// Payload ends inside a header or element.
    #[error("Truncated payload: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    /// A LEB128 length does not terminate within 8 bytes.
    #[error("Invalid LEB128 length")]
    InvalidLeb128,
}

impl DepacketizeError {
    /// Create a truncation error.
    pub fn truncated(needed: usize, available: usize) -> Self {
        Self::Truncated { needed, available }
    }
}
