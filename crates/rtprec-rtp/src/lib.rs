//! Rtprec-Rtp: turn RTP packets into recorded media files.
//!
//! Packets flow through three stages:
//!
//! 1. A [`Depacketizer`] strips the codec's RTP payload header and reports
//!    fragmentation flags.
//! 2. A [`FrameAssembler`] joins fragments into complete frames (VP8) or
//!    complete OBUs (AV1).
//! 3. A recorder hands each frame to an `rtprec-media` container writer.
//!
//! # Modules
//!
//! - `packet` - The RTP fields the recorders need
//! - `depacketize` - VP8, Opus and AV1 payload formats
//! - `assemble` - Fragment-to-frame state machines
//! - `writer` - [`MediaWriter`] and the IVF / Ogg recorders

pub mod assemble;
pub mod depacketize;
pub mod error;
pub mod packet;
pub mod writer;

pub use assemble::{Av1Assembler, FrameAssembler, Vp8Assembler};
pub use depacketize::{
    Av1Depacketizer, Av1Packet, Depacketizer, ObuSplitter, OpusDepacketizer, Vp8Depacketizer,
    Vp8Fragment,
};
pub use error::{DepacketizeError, Error, Result};
pub use packet::RtpPacket;
pub use writer::{IvfRecorder, MediaWriter, OggRecorder};
