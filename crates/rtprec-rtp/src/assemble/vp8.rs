use bytes::{Bytes, BytesMut};

use super::FrameAssembler;
use crate::depacketize::{Depacketizer, Vp8Depacketizer};
use crate::packet::RtpPacket;
use crate::Result;

/// Where the VP8 assembler is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No keyframe yet; everything else is dropped.
    AwaitingKeyframe,
    /// A keyframe has been seen. Never left again.
    Accumulating,
}

/// Joins VP8 fragments into frames, using the S bit for frame starts and the
/// RTP marker for frame ends.
#[derive(Debug)]
pub struct Vp8Assembler {
    depacketizer: Vp8Depacketizer,
    state: AssemblerState,
    current: Option<BytesMut>,
}

impl Vp8Assembler {
    pub fn new() -> Self {
        Self {
            depacketizer: Vp8Depacketizer,
            state: AssemblerState::AwaitingKeyframe,
            current: None,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }
}

impl Default for Vp8Assembler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameAssembler for Vp8Assembler {
    fn push(&mut self, packet: &RtpPacket) -> Result<Vec<Bytes>> {
        let fragment = self.depacketizer.depacketize(&packet.payload)?;

        if self.state == AssemblerState::AwaitingKeyframe {
            if !fragment.keyframe {
                tracing::debug!(
                    sequence_number = packet.sequence_number,
                    "dropping VP8 packet before first keyframe"
                );
                return Ok(Vec::new());
            }
            self.state = AssemblerState::Accumulating;
        }

        if self.current.is_none() && !fragment.start {
            tracing::trace!(
                sequence_number = packet.sequence_number,
                "dropping VP8 continuation without frame start"
            );
            return Ok(Vec::new());
        }
        self.current
            .get_or_insert_with(BytesMut::new)
            .extend_from_slice(&fragment.payload);

        if !packet.marker {
            return Ok(Vec::new());
        }
        match self.current.take() {
            Some(frame) if !frame.is_empty() => Ok(vec![frame.freeze()]),
            _ => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_START: &[u8] = &[0x10, 0x10, 0x02, 0x00];
    const INTER_START: &[u8] = &[0x10, 0x31, 0x02];

    fn rtp(sequence_number: u16, marker: bool, payload: &[u8]) -> RtpPacket {
        RtpPacket::new(sequence_number, 0, marker, payload.to_vec())
    }

    #[test]
    fn test_three_fragments_make_one_frame() {
        let mut assembler = Vp8Assembler::new();

        assert!(assembler.push(&rtp(1, false, KEY_START)).unwrap().is_empty());
        assert!(assembler.push(&rtp(2, false, &[0x00, 0xaa, 0xbb])).unwrap().is_empty());
        let frames = assembler.push(&rtp(3, true, &[0x00, 0xcc])).unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(&frames[0][..], &[0x10, 0x02, 0x00, 0xaa, 0xbb, 0xcc]);
        assert_eq!(assembler.state(), AssemblerState::Accumulating);
    }

    #[test]
    fn test_drops_until_keyframe() {
        let mut assembler = Vp8Assembler::new();

        assert!(assembler.push(&rtp(1, true, INTER_START)).unwrap().is_empty());
        assert!(assembler.push(&rtp(2, true, &[0x00, 0x01])).unwrap().is_empty());
        assert_eq!(assembler.state(), AssemblerState::AwaitingKeyframe);

        assert_eq!(assembler.push(&rtp(3, true, KEY_START)).unwrap().len(), 1);
        // Inter frames are accepted once a keyframe has been seen.
        assert_eq!(assembler.push(&rtp(4, true, INTER_START)).unwrap().len(), 1);
    }

    #[test]
    fn test_continuation_without_start_is_dropped() {
        let mut assembler = Vp8Assembler::new();
        assembler.push(&rtp(1, true, KEY_START)).unwrap();

        assert!(assembler.push(&rtp(2, true, &[0x00, 0x55])).unwrap().is_empty());

        let frames = assembler.push(&rtp(3, true, INTER_START)).unwrap();
        assert_eq!(&frames[0][..], &[0x31, 0x02]);
    }

    #[test]
    fn test_malformed_payload() {
        let mut assembler = Vp8Assembler::new();
        let err = assembler.push(&rtp(1, true, &[0x10])).unwrap_err();
        assert!(matches!(err, crate::Error::Depacketize(_)));
    }
}
