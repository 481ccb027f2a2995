//! Rtprec-Media: IVF and Ogg Opus container writers.
//!
//! This crate serializes already-assembled compressed media frames into one of
//! two self-describing containers while keeping a time-to-byte-offset index
//! that players can use for seeking.
//!
//! # Modules
//!
//! - `ivf` - Framed video container (32-byte `DKIF` header, 20-byte frame records)
//! - `ogg` - Paged Opus audio container (`OggS` pages with lacing and CRC)
//! - `checksum` - Ogg page CRC table and running checksum
//! - `offsets` - Elapsed-milliseconds to cumulative-bytes index
//! - `sink` - Output sinks, seekable or streaming
//! - `clock` - Injectable millisecond clock
//!
//! # Finalization
//!
//! Both containers carry fields that are only known once the stream ends. On
//! close the IVF writer patches the frame count in its header and the Ogg
//! writer rewrites its last page as the end-of-stream page. Both steps need a
//! seekable sink; streaming sinks skip them silently.
//!
//! ```
//! use std::io::Cursor;
//! use rtprec_media::{IvfOptions, IvfWriter, VideoCodec};
//!
//! let options = IvfOptions::new().codec(VideoCodec::Vp8).unwrap();
//! let mut writer = IvfWriter::new(Cursor::new(Vec::new()), options).unwrap();
//! writer.write_frame(&[0x10, 0x02, 0x00]).unwrap();
//! let data = writer.finish().unwrap().into_inner();
//!
//! assert_eq!(&data[0..4], b"DKIF");
//! assert_eq!(u32::from_le_bytes(data[24..28].try_into().unwrap()), 1);
//! ```

pub mod checksum;
pub mod clock;
pub mod error;
pub mod ivf;
pub mod offsets;
pub mod ogg;
pub mod paths;
pub mod sink;

pub use checksum::ChecksumTable;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use ivf::{IvfOptions, IvfWriter, VideoCodec};
pub use offsets::{OffsetIndex, PlayOffset};
pub use ogg::{OggOptions, OggWriter, PageType};
pub use sink::{MediaSink, SeekableSink, Unseekable};

/// Externally visible lifecycle of a container writer.
///
/// A writer is handed out only after its header has been written, so the
/// first observable state is [`SessionState::HeaderWritten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Header (or header pages) written, no media yet.
    HeaderWritten,
    /// At least one frame or data page written.
    Writing,
    /// Sink released, either by `close` or after a failed write.
    Closed,
}
