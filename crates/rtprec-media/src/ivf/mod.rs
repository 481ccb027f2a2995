//! IVF framed video writer.
//!
//! Layout:
//! - 32-byte file header (`DKIF`, version, header size, FOURCC, dimensions,
//!   timebase, frame count, reserved)
//! - Per frame: 20-byte header (payload length, frame index, delay in ms)
//!   followed by the payload
//!
//! The frame count is unknown until the stream ends, so a provisional value is
//! written up front and patched on close when the sink is seekable.

mod header;

pub use header::{
    FileHeader, FrameHeader, FILE_HEADER_SIZE, FRAME_COUNT_OFFSET, FRAME_HEADER_SIZE,
    PROVISIONAL_FRAME_COUNT, SIGNATURE,
};

use std::fmt;
use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::offsets::OffsetIndex;
use crate::paths::offsets_path;
use crate::sink::MediaSink;
use crate::{Error, Result, SessionState};

/// Video codecs the IVF writer can label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodec {
    Vp8,
    Av1,
}

impl VideoCodec {
    /// FOURCC written into the file header.
    pub fn fourcc(&self) -> [u8; 4] {
        match self {
            Self::Vp8 => *b"VP80",
            Self::Av1 => *b"AV01",
        }
    }

    /// MIME type used to select this codec.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Vp8 => "video/VP8",
            Self::Av1 => "video/AV1",
        }
    }
}

impl fmt::Display for VideoCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

impl FromStr for VideoCodec {
    type Err = Error;

    /// Parse a MIME type. Matching ignores ASCII case.
    fn from_str(s: &str) -> Result<Self> {
        [Self::Vp8, Self::Av1]
            .into_iter()
            .find(|codec| codec.mime_type().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unsupported_codec(s))
    }
}

/// Construction options for [`IvfWriter`].
#[derive(Debug, Clone)]
pub struct IvfOptions {
    codec: Option<VideoCodec>,
    width: u16,
    height: u16,
    timebase_denominator: u32,
    timebase_numerator: u32,
    clock: Arc<dyn Clock>,
}

impl IvfOptions {
    /// Defaults: VP8 unless a codec is selected, 640x480, timebase 1/30.
    pub fn new() -> Self {
        Self {
            codec: None,
            width: 640,
            height: 480,
            timebase_denominator: 30,
            timebase_numerator: 1,
            clock: Arc::new(SystemClock),
        }
    }

    /// Select the codec. A codec can only be selected once.
    pub fn codec(mut self, codec: VideoCodec) -> Result<Self> {
        if self.codec.is_some() {
            return Err(Error::CodecAlreadyConfigured);
        }
        self.codec = Some(codec);
        Ok(self)
    }

    /// Select the codec by MIME type (`video/VP8` or `video/AV1`).
    pub fn mime_type(self, mime_type: &str) -> Result<Self> {
        if self.codec.is_some() {
            return Err(Error::CodecAlreadyConfigured);
        }
        let codec = mime_type.parse()?;
        self.codec(codec)
    }

    /// Set the frame dimensions written into the header.
    pub fn dimensions(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the timebase written into the header.
    pub fn timebase(mut self, denominator: u32, numerator: u32) -> Self {
        self.timebase_denominator = denominator;
        self.timebase_numerator = numerator;
        self
    }

    /// Use `clock` for inter-frame delays and the offset index.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Codec the writer will use.
    pub fn selected_codec(&self) -> VideoCodec {
        self.codec.unwrap_or(VideoCodec::Vp8)
    }
}

impl Default for IvfOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes assembled video frames to an IVF container.
///
/// Not safe for concurrent use; callers serialize access to one writer.
pub struct IvfWriter<W: MediaSink> {
    sink: Option<W>,
    header: FileHeader,
    clock: Arc<dyn Clock>,
    count: u64,
    offsets: OffsetIndex,
    offsets_path: Option<PathBuf>,
}

impl IvfWriter<File> {
    /// Create `path` and write the file header.
    ///
    /// The offset index is written to `<base-name>-offsets.json` beside it on close.
    pub fn create(path: impl AsRef<Path>, options: IvfOptions) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = Self::new(file, options)?;
        writer.offsets_path = Some(offsets_path(path));
        tracing::debug!(path = %path.display(), "created IVF file");
        Ok(writer)
    }
}

impl<W: MediaSink> IvfWriter<W> {
    /// Wrap `sink` and write the file header.
    pub fn new(sink: W, options: IvfOptions) -> Result<Self> {
        let header = FileHeader {
            codec: options.selected_codec(),
            width: options.width,
            height: options.height,
            timebase_denominator: options.timebase_denominator,
            timebase_numerator: options.timebase_numerator,
            frame_count: PROVISIONAL_FRAME_COUNT,
        };

        let mut writer = Self {
            sink: Some(sink),
            header,
            clock: options.clock,
            count: 0,
            offsets: OffsetIndex::new(),
            offsets_path: None,
        };

        let bytes = writer.header.to_bytes();
        writer.write_to_sink(&[&bytes[..]])?;
        tracing::debug!(codec = %writer.header.codec, "wrote IVF header");

        Ok(writer)
    }

    /// Write the offset index to `path` on close instead of the default sidecar.
    pub fn with_offsets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.offsets_path = Some(path.into());
        self
    }

    /// Append one complete frame.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        if self.sink.is_none() {
            return Err(Error::SinkNotOpen);
        }
        let len = u32::try_from(frame.len()).map_err(|_| Error::PayloadTooLarge {
            len: frame.len(),
            max: u32::MAX as usize,
        })?;

        let delay_ms = self.offsets.record(
            self.clock.now_millis(),
            (FRAME_HEADER_SIZE + frame.len()) as u64,
        );
        let header = FrameHeader {
            len,
            index: self.count,
            delay_ms,
        };
        self.count += 1;

        tracing::trace!(index = header.index, len, delay_ms, "writing IVF frame");
        self.write_to_sink(&[&header.to_bytes()[..], frame])
    }

    /// Finalize and release the sink.
    ///
    /// Safe to call more than once; calls after the first do nothing.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };
        self.finalize(&mut sink)
    }

    /// Finalize and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        let mut sink = self.sink.take().ok_or(Error::SinkNotOpen)?;
        self.finalize(&mut sink)?;
        Ok(sink)
    }

    /// Codec written into the header.
    pub fn codec(&self) -> VideoCodec {
        self.header.codec
    }

    /// Frames written so far.
    pub fn frame_count(&self) -> u64 {
        self.count
    }

    /// Offset index collected so far.
    pub fn offsets(&self) -> &OffsetIndex {
        &self.offsets
    }

    /// Where the offset index will be written on close, if anywhere.
    pub fn offsets_path(&self) -> Option<&Path> {
        self.offsets_path.as_deref()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        match (&self.sink, self.count) {
            (None, _) => SessionState::Closed,
            (Some(_), 0) => SessionState::HeaderWritten,
            (Some(_), _) => SessionState::Writing,
        }
    }

    fn finalize(&mut self, sink: &mut W) -> Result<()> {
        if let Some(path) = &self.offsets_path {
            self.offsets.write_json(path)?;
        }

        match sink.as_seekable() {
            Some(seekable) => {
                let count = u32::try_from(self.count).unwrap_or(u32::MAX);
                seekable.seek(SeekFrom::Start(FRAME_COUNT_OFFSET))?;
                seekable.write_all(&count.to_le_bytes())?;
                seekable.seek(SeekFrom::End(0))?;
            }
            None => tracing::warn!("IVF sink is not seekable, frame count left provisional"),
        }
        sink.flush()?;

        tracing::info!(frames = self.count, codec = %self.header.codec, "closed IVF writer");
        Ok(())
    }

    /// Write `bufs` in order. Any failure drops the sink.
    fn write_to_sink(&mut self, bufs: &[&[u8]]) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::SinkNotOpen)?;
        if let Err(err) = bufs.iter().try_for_each(|buf| sink.write_all(buf)) {
            self.sink = None;
            return Err(err.into());
        }
        Ok(())
    }
}

impl<W: MediaSink> fmt::Debug for IvfWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IvfWriter")
            .field("codec", &self.header.codec)
            .field("count", &self.count)
            .field("state", &self.state())
            .finish()
    }
}
