//! RTP packet fields consumed by the recorders.

use bytes::Bytes;

/// One received RTP packet, header already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtpPacket {
    pub sequence_number: u16,
    /// Media timestamp in the codec's clock rate.
    pub timestamp: u32,
    /// Last packet of a frame.
    pub marker: bool,
    pub payload: Bytes,
}

impl RtpPacket {
    /// Create a packet.
    pub fn new(sequence_number: u16, timestamp: u32, marker: bool, payload: impl Into<Bytes>) -> Self {
        Self {
            sequence_number,
            timestamp,
            marker,
            payload: payload.into(),
        }
    }
}
