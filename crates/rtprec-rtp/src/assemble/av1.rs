use bytes::Bytes;

use super::FrameAssembler;
use crate::depacketize::{Av1Depacketizer, Depacketizer, ObuSplitter};
use crate::packet::RtpPacket;
use crate::Result;

/// Forwards every complete AV1 OBU as its own frame.
#[derive(Debug, Default)]
pub struct Av1Assembler {
    depacketizer: Av1Depacketizer,
    splitter: ObuSplitter,
}

impl Av1Assembler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameAssembler for Av1Assembler {
    fn push(&mut self, packet: &RtpPacket) -> Result<Vec<Bytes>> {
        let av1 = self.depacketizer.depacketize(&packet.payload)?;
        Ok(self.splitter.push(av1))
    }
}
