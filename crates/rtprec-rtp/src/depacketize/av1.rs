//! AV1 RTP payload format, aggregation header (section 4.4).
//!
//! ```text
//!  0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+
//! |Z|Y| W |N|-|-|-|
//! +-+-+-+-+-+-+-+-+
//! ```
//!
//! - `Z`: the first element continues an OBU from the previous packet
//! - `Y`: the last element continues in the next packet
//! - `W`: element count; 0 means every element carries a LEB128 length,
//!   otherwise the last of `W` elements runs to the end of the packet
//! - `N`: first packet of a coded video sequence

use bytes::{Bytes, BytesMut};

use super::Depacketizer;
use crate::error::DepacketizeError;

/// Read a LEB128 encoded unsigned integer.
///
/// Returns the value and the number of bytes consumed.
pub fn read_leb128(data: &[u8]) -> Result<(u64, usize), DepacketizeError> {
    let mut value = 0u64;
    for (i, &byte) in data.iter().take(8).enumerate() {
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if data.len() < 8 {
        Err(DepacketizeError::truncated(data.len() + 1, data.len()))
    } else {
        Err(DepacketizeError::InvalidLeb128)
    }
}

/// One parsed AV1 RTP payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Av1Packet {
    pub z: bool,
    pub y: bool,
    pub n: bool,
    /// OBU elements, possibly fragments at either end.
    pub elements: Vec<Bytes>,
}

/// Parses the aggregation header and splits the OBU elements.
#[derive(Debug, Default, Clone, Copy)]
pub struct Av1Depacketizer;

impl Depacketizer for Av1Depacketizer {
    type Output = Av1Packet;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Av1Packet, DepacketizeError> {
        let header = *payload.first().ok_or(DepacketizeError::Empty)?;
        let z = header & 0x80 != 0;
        let y = header & 0x40 != 0;
        let w = usize::from((header >> 4) & 0x03);
        let n = header & 0x08 != 0;

        let mut elements = Vec::new();
        let mut at = 1;
        while at < payload.len() {
            let last_counted = w != 0 && elements.len() + 1 == w;
            let len = if last_counted {
                payload.len() - at
            } else {
                let (len, read) = read_leb128(&payload[at..])?;
                at += read;
                usize::try_from(len).map_err(|_| DepacketizeError::InvalidLeb128)?
            };

            let end = at
                .checked_add(len)
                .filter(|&end| end <= payload.len())
                .ok_or_else(|| DepacketizeError::truncated(at.saturating_add(len), payload.len()))?;
            elements.push(payload.slice(at..end));
            at = end;

            if last_counted {
                break;
            }
        }

        if w != 0 && elements.len() != w {
            return Err(DepacketizeError::truncated(payload.len() + 1, payload.len()));
        }

        Ok(Av1Packet { z, y, n, elements })
    }
}

/// Joins OBU fragments across packets and yields complete OBUs.
#[derive(Debug, Default)]
pub struct ObuSplitter {
    fragment: Option<BytesMut>,
}

impl ObuSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one packet, returning the OBUs it completes in order.
    ///
    /// A continuation whose start was never seen is dropped, as is a pending
    /// fragment that the next packet does not continue. Zero-length OBUs are
    /// skipped.
    pub fn push(&mut self, packet: Av1Packet) -> Vec<Bytes> {
        let count = packet.elements.len();
        let mut obus = Vec::with_capacity(count);

        for (i, element) in packet.elements.into_iter().enumerate() {
            let continues_previous = i == 0 && packet.z;
            let continues_next = i + 1 == count && packet.y;

            let obu = if continues_previous {
                match self.fragment.take() {
                    Some(mut fragment) => {
                        fragment.extend_from_slice(&element);
                        fragment
                    }
                    None => {
                        tracing::debug!(len = element.len(), "dropping orphan OBU continuation");
                        continue;
                    }
                }
            } else {
                if let Some(stale) = self.fragment.take() {
                    tracing::debug!(len = stale.len(), "dropping unfinished OBU fragment");
                }
                BytesMut::from(&element[..])
            };

            if continues_next {
                self.fragment = Some(obu);
            } else if obu.is_empty() {
                tracing::trace!("skipping empty OBU element");
            } else {
                obus.push(obu.freeze());
            }
        }

        obus
    }

    /// Whether a fragment is waiting for its continuation.
    pub fn has_fragment(&self) -> bool {
        self.fragment.is_some()
    }
}
