//! VP8 payload descriptor (RFC 7741 section 4.2).
//!
//! ```text
//!      0 1 2 3 4 5 6 7
//!     +-+-+-+-+-+-+-+-+
//!     |X|R|N|S|R| PID |
//!     +-+-+-+-+-+-+-+-+
//! X:  |I|L|T|K| RSV   |
//!     +-+-+-+-+-+-+-+-+
//! I:  |M| PictureID   |
//!     +-+-+-+-+-+-+-+-+
//!     |   PictureID   |  (M set)
//!     +-+-+-+-+-+-+-+-+
//! L:  |   TL0PICIDX   |
//!     +-+-+-+-+-+-+-+-+
//! T/K:|TID|Y| KEYIDX  |
//!     +-+-+-+-+-+-+-+-+
//! ```

use bytes::Bytes;

use super::Depacketizer;
use crate::error::DepacketizeError;

/// One VP8 fragment with its descriptor flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vp8Fragment {
    /// VP8 bitstream bytes after the descriptor.
    pub payload: Bytes,
    /// First fragment of a partition (S bit).
    pub start: bool,
    /// Partition index (PID).
    pub partition_id: u8,
    /// Picture ID, 7 or 15 bits, when present.
    pub picture_id: Option<u16>,
    /// Start of partition 0 of an intra frame (inverse P bit of the frame tag).
    pub keyframe: bool,
}

/// Parses RFC 7741 payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct Vp8Depacketizer;

impl Depacketizer for Vp8Depacketizer {
    type Output = Vp8Fragment;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Vp8Fragment, DepacketizeError> {
        let data = &payload[..];
        let byte = |at: usize| {
            data.get(at)
                .copied()
                .ok_or_else(|| DepacketizeError::truncated(at + 1, data.len()))
        };

        let first = byte(0)?;
        let extended = first & 0x80 != 0;
        let start = first & 0x10 != 0;
        let partition_id = first & 0x07;

        let mut at = 1;
        let mut picture_id = None;
        if extended {
            let ext = byte(at)?;
            at += 1;

            if ext & 0x80 != 0 {
                let high = byte(at)?;
                at += 1;
                if high & 0x80 != 0 {
                    let low = byte(at)?;
                    at += 1;
                    picture_id = Some((u16::from(high & 0x7f) << 8) | u16::from(low));
                } else {
                    picture_id = Some(u16::from(high));
                }
            }
            // TL0PICIDX
            if ext & 0x40 != 0 {
                at += 1;
            }
            // TID/Y/KEYIDX
            if ext & 0x30 != 0 {
                at += 1;
            }
        }

        // The descriptor must be followed by at least one bitstream byte.
        let tag = byte(at)?;
        let keyframe = start && partition_id == 0 && tag & 0x01 == 0;

        Ok(Vp8Fragment {
            payload: payload.slice(at..),
            start,
            partition_id,
            picture_id,
            keyframe,
        })
    }
}
