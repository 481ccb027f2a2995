//! RTP payload formats.
//!
//! Each depacketizer parses one packet's payload on its own. State that spans
//! packets lives in the assemblers, except for [`ObuSplitter`], which joins AV1
//! OBU fragments.

mod av1;
mod opus;
mod vp8;

pub use av1::{read_leb128, Av1Depacketizer, Av1Packet, ObuSplitter};
pub use opus::OpusDepacketizer;
pub use vp8::{Vp8Depacketizer, Vp8Fragment};

use bytes::Bytes;

use crate::error::DepacketizeError;

/// Parse the codec payload out of one RTP payload.
pub trait Depacketizer {
    /// What one packet yields.
    type Output;

    fn depacketize(&mut self, payload: &Bytes) -> Result<Self::Output, DepacketizeError>;
}
