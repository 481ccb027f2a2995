//! Recorders: RTP packets in, container files out.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use rtprec_media::{
    IvfOptions, IvfWriter, MediaSink, OggOptions, OggWriter, SessionState, VideoCodec,
};

use crate::assemble::{Av1Assembler, FrameAssembler, Vp8Assembler};
use crate::depacketize::{Depacketizer, OpusDepacketizer};
use crate::packet::RtpPacket;
use crate::Result;

/// Sink for one RTP media stream.
pub trait MediaWriter: Send {
    /// Feed one packet. Empty payloads are ignored.
    fn write_rtp(&mut self, packet: &RtpPacket) -> Result<()>;

    /// Finalize the output. Later calls do nothing.
    fn close(&mut self) -> Result<()>;
}

/// Assembler matching the codec in the IVF header.
fn assembler_for(codec: VideoCodec) -> Box<dyn FrameAssembler> {
    match codec {
        VideoCodec::Vp8 => Box::new(Vp8Assembler::new()),
        VideoCodec::Av1 => Box::new(Av1Assembler::new()),
    }
}

/// Records a VP8 or AV1 RTP stream to IVF.
pub struct IvfRecorder<W: MediaSink> {
    writer: IvfWriter<W>,
    assembler: Box<dyn FrameAssembler>,
}

impl IvfRecorder<File> {
    /// Create an IVF file at `path`, with its offset sidecar beside it.
    pub fn create(path: impl AsRef<Path>, options: IvfOptions) -> Result<Self> {
        Ok(Self::new(IvfWriter::create(path, options)?))
    }
}

impl<W: MediaSink> IvfRecorder<W> {
    pub fn new(writer: IvfWriter<W>) -> Self {
        let assembler = assembler_for(writer.codec());
        Self { writer, assembler }
    }

    /// Write the offset index to `path` on close.
    pub fn with_offsets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.writer = self.writer.with_offsets_path(path);
        self
    }

    /// The underlying container writer.
    pub fn writer(&self) -> &IvfWriter<W> {
        &self.writer
    }

    /// Finalize and hand back the sink.
    pub fn finish(self) -> Result<W> {
        Ok(self.writer.finish()?)
    }
}

impl<W: MediaSink + Send> MediaWriter for IvfRecorder<W> {
    fn write_rtp(&mut self, packet: &RtpPacket) -> Result<()> {
        if self.writer.state() == SessionState::Closed {
            return Err(rtprec_media::Error::SinkNotOpen.into());
        }
        if packet.payload.is_empty() {
            return Ok(());
        }

        for frame in self.assembler.push(packet)? {
            self.writer.write_frame(&frame)?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.writer.close()?)
    }
}

impl<W: MediaSink> fmt::Debug for IvfRecorder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IvfRecorder")
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

/// Records an Opus RTP stream to Ogg.
#[derive(Debug)]
pub struct OggRecorder<W: MediaSink> {
    writer: OggWriter<W>,
    depacketizer: OpusDepacketizer,
}

impl OggRecorder<File> {
    /// Create an Ogg file at `path`, with its per-second offset sidecar beside it.
    pub fn create(path: impl AsRef<Path>, options: OggOptions) -> Result<Self> {
        Ok(Self::new(OggWriter::create(path, options)?))
    }
}

impl<W: MediaSink> OggRecorder<W> {
    pub fn new(writer: OggWriter<W>) -> Self {
        Self {
            writer,
            depacketizer: OpusDepacketizer,
        }
    }

    /// Write the per-second offset index to `path` on close.
    pub fn with_offsets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.writer = self.writer.with_offsets_path(path);
        self
    }

    /// The underlying container writer.
    pub fn writer(&self) -> &OggWriter<W> {
        &self.writer
    }

    /// Finalize and hand back the sink.
    pub fn finish(self) -> Result<W> {
        Ok(self.writer.finish()?)
    }
}

impl<W: MediaSink + Send> MediaWriter for OggRecorder<W> {
    fn write_rtp(&mut self, packet: &RtpPacket) -> Result<()> {
        if self.writer.state() == SessionState::Closed {
            return Err(rtprec_media::Error::SinkNotOpen.into());
        }
        if packet.payload.is_empty() {
            return Ok(());
        }

        let opus = self.depacketizer.depacketize(&packet.payload)?;
        self.writer.write_data(&opus, packet.timestamp)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(self.writer.close()?)
    }
}
