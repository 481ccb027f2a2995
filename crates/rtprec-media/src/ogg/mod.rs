//! Ogg Opus paged audio writer.
//!
//! Stream layout (RFC 7845):
//!
//! 1. Identification header page (`OpusHead`), beginning-of-stream, granule 0
//! 2. Comment header page (`OpusTags`), granule 0
//! 3. One page per audio packet, granule advancing by the RTP timestamp delta
//!
//! The last page must carry the end-of-stream flag, but the end is only known
//! on close. With a seekable sink the writer then steps back over the last
//! page and rewrites it in place with the flag set and a fresh checksum.

mod page;

pub use page::{
    build_page, page_size, segment_count, PageHeader, PageType, CHECKSUM_OFFSET,
    MAX_PAYLOAD_SIZE, MAX_SEGMENTS, PAGE_HEADER_SIZE, SIGNATURE,
};

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use rand::RngCore;

use crate::checksum::ChecksumTable;
use crate::clock::{Clock, SystemClock};
use crate::offsets::OffsetIndex;
use crate::paths::offsets_path;
use crate::sink::{MediaSink, SeekableSink};
use crate::{Error, Result, SessionState};

/// Identification header magic.
const ID_SIGNATURE: &[u8; 8] = b"OpusHead";
/// Comment header magic.
const COMMENT_SIGNATURE: &[u8; 8] = b"OpusTags";
/// Pre-skip recommended by RFC 7845, in 48 kHz samples.
pub const DEFAULT_PRE_SKIP: u16 = 3840;
/// Granule position of the first audio page. Only header pages carry 0.
const FIRST_DATA_GRANULE: u64 = 1;

/// Construction options for [`OggWriter`].
#[derive(Debug, Clone)]
pub struct OggOptions {
    sample_rate: u32,
    channel_count: u8,
    vendor: String,
    clock: Arc<dyn Clock>,
}

impl OggOptions {
    /// Defaults: 48 kHz stereo, vendor `rtprec`.
    pub fn new() -> Self {
        Self {
            sample_rate: 48_000,
            channel_count: 2,
            vendor: "rtprec".to_string(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Original input sample rate recorded in the identification header.
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Output channel count, 1 or 2.
    pub fn channel_count(mut self, channel_count: u8) -> Self {
        self.channel_count = channel_count;
        self
    }

    /// Vendor string written into the comment header.
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    /// Use `clock` for the offset index.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

impl Default for OggOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// What close needs to find and rewrite the most recent page.
#[derive(Debug, Clone, Copy)]
struct LastPage {
    header: PageHeader,
    payload_len: usize,
}

/// Writes Opus packets to an Ogg container, one packet per page.
///
/// Not safe for concurrent use; callers serialize access to one writer.
pub struct OggWriter<W: MediaSink> {
    sink: Option<W>,
    checksum: ChecksumTable,
    serial: u32,
    sample_rate: u32,
    channel_count: u8,
    vendor: String,
    page_index: u32,
    granule_position: u64,
    previous_timestamp: Option<u32>,
    data_pages: u64,
    last_page: Option<LastPage>,
    clock: Arc<dyn Clock>,
    offsets: OffsetIndex,
    offsets_path: Option<PathBuf>,
}

impl OggWriter<File> {
    /// Create `path` and write both header pages.
    ///
    /// The per-second offset index is written to `<base-name>-offsets.json`
    /// beside it on close.
    pub fn create(path: impl AsRef<Path>, options: OggOptions) -> Result<Self> {
        let path = path.as_ref();
        // Close reads the last page back before rewriting it.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut writer = Self::new(file, options)?;
        writer.offsets_path = Some(offsets_path(path));
        tracing::debug!(path = %path.display(), "created Ogg file");
        Ok(writer)
    }
}

impl<W: MediaSink> OggWriter<W> {
    /// Wrap `sink` with a random stream serial and write both header pages.
    pub fn new(sink: W, options: OggOptions) -> Result<Self> {
        Self::with_rng(sink, options, &mut rand::thread_rng())
    }

    /// Like [`OggWriter::new`], drawing the stream serial from `rng`.
    ///
    /// Fails with [`Error::UnsupportedChannelCount`] unless the channel count
    /// is 1 or 2.
    pub fn with_rng<R: RngCore + ?Sized>(sink: W, options: OggOptions, rng: &mut R) -> Result<Self> {
        if !(1..=2).contains(&options.channel_count) {
            return Err(Error::UnsupportedChannelCount(options.channel_count));
        }
        let mut writer = Self {
            sink: Some(sink),
            checksum: ChecksumTable::ogg(),
            serial: rng.next_u32(),
            sample_rate: options.sample_rate,
            channel_count: options.channel_count,
            vendor: options.vendor,
            page_index: 0,
            granule_position: FIRST_DATA_GRANULE,
            previous_timestamp: None,
            data_pages: 0,
            last_page: None,
            clock: options.clock,
            offsets: OffsetIndex::new(),
            offsets_path: None,
        };
        writer.write_headers()?;
        Ok(writer)
    }

    /// Write the per-second offset index to `path` on close.
    pub fn with_offsets_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.offsets_path = Some(path.into());
        self
    }

    /// Build a page for this stream without writing it.
    pub fn create_page(
        &self,
        payload: &[u8],
        page_type: PageType,
        granule_position: u64,
        sequence: u32,
    ) -> Result<BytesMut> {
        let header = PageHeader {
            page_type,
            granule_position,
            serial: self.serial,
            sequence,
        };
        build_page(&self.checksum, &header, payload)
    }

    /// Append one Opus packet as its own page.
    ///
    /// `timestamp` is the packet's RTP timestamp. The granule position moves
    /// by the difference to the previous packet's timestamp; the first packet
    /// does not move it.
    pub fn write_data(&mut self, payload: &[u8], timestamp: u32) -> Result<()> {
        if self.sink.is_none() {
            return Err(Error::SinkNotOpen);
        }

        let granule_position = match self.previous_timestamp {
            Some(previous) => self.granule_position + u64::from(timestamp.wrapping_sub(previous)),
            None => self.granule_position,
        };
        let header = PageHeader {
            page_type: PageType::ContinuationOfStream,
            granule_position,
            serial: self.serial,
            sequence: self.page_index,
        };
        let page = build_page(&self.checksum, &header, payload)?;

        self.previous_timestamp = Some(timestamp);
        self.granule_position = granule_position;
        self.data_pages += 1;

        tracing::trace!(
            sequence = header.sequence,
            granule_position,
            len = payload.len(),
            "writing Ogg page"
        );
        self.write_page(&page, header, payload.len())
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

    /// Stream serial number.
    pub fn serial(&self) -> u32 {
        self.serial
    }

    /// Granule position of the most recent audio page.
    pub fn granule_position(&self) -> u64 {
        self.granule_position
    }

    /// Pages written so far, header pages included.
    pub fn page_count(&self) -> u32 {
        self.page_index
    }

    /// Audio pages written so far.
    pub fn data_page_count(&self) -> u64 {
        self.data_pages
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
        match (&self.sink, self.data_pages) {
            (None, _) => SessionState::Closed,
            (Some(_), 0) => SessionState::HeaderWritten,
            (Some(_), _) => SessionState::Writing,
        }
    }

    fn write_headers(&mut self) -> Result<()> {
        // Identification header (RFC 7845 section 5.1)
        let mut id = BytesMut::with_capacity(19);
        id.put_slice(ID_SIGNATURE);
        id.put_u8(1); // version
        id.put_u8(self.channel_count);
        id.put_u16_le(DEFAULT_PRE_SKIP);
        id.put_u32_le(self.sample_rate);
        id.put_u16_le(0); // output gain
        id.put_u8(0); // channel mapping family: mono or stereo

        let header = self.next_header(PageType::BeginningOfStream);
        let page = build_page(&self.checksum, &header, &id)?;
        self.write_page(&page, header, id.len())?;

        // Comment header (RFC 7845 section 5.2)
        let vendor_len = comment_field_len(self.vendor.len())?;
        let mut comment = BytesMut::with_capacity(8 + 4 + self.vendor.len() + 4);
        comment.put_slice(COMMENT_SIGNATURE);
        comment.put_u32_le(vendor_len);
        comment.put_slice(self.vendor.as_bytes());
        comment.put_u32_le(0); // user comment list length

        let header = self.next_header(PageType::ContinuationOfStream);
        let page = build_page(&self.checksum, &header, &comment)?;
        self.write_page(&page, header, comment.len())?;

        tracing::debug!(
            serial = self.serial,
            sample_rate = self.sample_rate,
            channels = self.channel_count,
            "wrote Ogg Opus headers"
        );
        Ok(())
    }

    /// Header page at granule 0 taking the next sequence number.
    fn next_header(&self, page_type: PageType) -> PageHeader {
        PageHeader {
            page_type,
            granule_position: 0,
            serial: self.serial,
            sequence: self.page_index,
        }
    }

    /// Write a built page, record it in the offset index and remember it for close.
    /// Any failure drops the sink.
    fn write_page(&mut self, page: &[u8], header: PageHeader, payload_len: usize) -> Result<()> {
        let sink = self.sink.as_mut().ok_or(Error::SinkNotOpen)?;

        self.page_index += 1;
        self.offsets.record(self.clock.now_millis(), page.len() as u64);

        if let Err(err) = sink.write_all(page) {
            self.sink = None;
            return Err(err.into());
        }
        self.last_page = Some(LastPage {
            header,
            payload_len,
        });
        Ok(())
    }

    fn finalize(&mut self, sink: &mut W) -> Result<()> {
        if let Some(path) = &self.offsets_path {
            self.offsets.write_per_second_json(path)?;
        }

        match (sink.as_seekable(), self.last_page) {
            (Some(seekable), Some(last)) => {
                let offset = self.rewrite_as_end_of_stream(seekable, last)?;
                tracing::debug!(
                    sequence = last.header.sequence,
                    offset,
                    "marked last Ogg page as end of stream"
                );
            }
            (None, _) => {
                tracing::warn!("Ogg sink is not seekable, last page left without end-of-stream flag")
            }
            (Some(_), None) => {}
        }
        sink.flush()?;

        tracing::info!(
            pages = self.page_index,
            audio_pages = self.data_pages,
            granule_position = self.granule_position,
            "closed Ogg writer"
        );
        Ok(())
    }

    /// Step back over the last page, check it is the page we wrote, and
    /// rewrite it with the end-of-stream flag. Returns the page offset.
    fn rewrite_as_end_of_stream(&self, sink: &mut dyn SeekableSink, last: LastPage) -> Result<u64> {
        let segments = segment_count(last.payload_len);
        let header_len = PAGE_HEADER_SIZE + segments;
        let page_len = header_len + last.payload_len;

        let offset = sink.seek(SeekFrom::End(-(page_len as i64)))?;

        let mut found = vec![0u8; header_len];
        sink.read_exact(&mut found)?;
        let matches = &found[0..4] == SIGNATURE
            && found[14..18] == self.serial.to_le_bytes()
            && found[18..22] == last.header.sequence.to_le_bytes()
            && found[26] as usize == segments;
        if !matches {
            return Err(Error::LastPageMismatch {
                sequence: last.header.sequence,
                offset,
            });
        }

        let mut payload = vec![0u8; last.payload_len];
        sink.read_exact(&mut payload)?;

        let header = PageHeader {
            page_type: PageType::EndOfStream,
            ..last.header
        };
        let page = build_page(&self.checksum, &header, &payload)?;
        debug_assert_eq!(page.len(), page_len);

        sink.seek(SeekFrom::Start(offset))?;
        sink.write_all(&page)?;
        sink.seek(SeekFrom::End(0))?;

        Ok(offset)
    }
}

/// Length prefix of a comment header field.
fn comment_field_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::PayloadTooLarge {
        len,
        max: u32::MAX as usize,
    })
}

impl<W: MediaSink> fmt::Debug for OggWriter<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OggWriter")
            .field("serial", &self.serial)
            .field("pages", &self.page_index)
            .field("granule_position", &self.granule_position)
            .field("state", &self.state())
            .finish()
    }
}
