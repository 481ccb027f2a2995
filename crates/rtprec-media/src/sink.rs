//! Output sinks.
//!
//! Writers only need `Write` to record, but finalization seeks backward into
//! already written output. [`MediaSink`] lets a sink say whether it supports
//! that, so a file gets its header patched while a pipe is left alone.

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, Write};

/// Random-access sink used during finalization.
pub trait SeekableSink: Read + Write + Seek {}

impl<T: Read + Write + Seek> SeekableSink for T {}

/// Destination of a container writer.
pub trait MediaSink: Write {
    /// Random-access view of the sink, if it has one.
    fn as_seekable(&mut self) -> Option<&mut dyn SeekableSink> {
        None
    }
}

impl MediaSink for File {
    fn as_seekable(&mut self) -> Option<&mut dyn SeekableSink> {
        Some(self)
    }
}

impl MediaSink for Cursor<Vec<u8>> {
    fn as_seekable(&mut self) -> Option<&mut dyn SeekableSink> {
        Some(self)
    }
}

impl MediaSink for Vec<u8> {}

/// Wraps any writer as a streaming, non-seekable sink.
#[derive(Debug, Default)]
pub struct Unseekable<W>(pub W);

impl<W> Unseekable<W> {
    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> Write for Unseekable<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<W: Write> MediaSink for Unseekable<W> {}
