use bytes::Bytes;

use super::Depacketizer;
use crate::error::DepacketizeError;

/// Opus over RTP (RFC 7587): one packet carries exactly one Opus packet.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpusDepacketizer;

impl Depacketizer for OpusDepacketizer {
    type Output = Bytes;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Bytes, DepacketizeError> {
        if payload.is_empty() {
            return Err(DepacketizeError::Empty);
        }
        Ok(payload.clone())
    }
}
