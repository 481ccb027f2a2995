//! Frame assembly from RTP packets.
//!
//! An assembler owns the codec's depacketizer and whatever state spans
//! packets. Each pushed packet yields zero or more complete frames, ready for
//! the container writer.

mod av1;
mod vp8;

pub use av1::Av1Assembler;
pub use vp8::{AssemblerState, Vp8Assembler};

use bytes::Bytes;

use crate::packet::RtpPacket;
use crate::Result;

/// Turns a packet stream into complete frames.
pub trait FrameAssembler: Send {
    /// Consume one packet, returning the frames it completes in order.
    fn push(&mut self, packet: &RtpPacket) -> Result<Vec<Bytes>>;
}
