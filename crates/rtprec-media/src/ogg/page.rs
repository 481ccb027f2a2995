//! Ogg page framing.
//!
//! ```text
//!  0       4   5   6               14      18      22      26  27
//! +-------+---+---+---------------+-------+-------+-------+---+----------+---------+
//! | OggS  |ver|typ|granule pos    |serial |seq no |crc    |n  | lacing[n]| payload |
//! +-------+---+---+---------------+-------+-------+-------+---+----------+---------+
//! ```
//!
//! A payload of length `L` is laced as `L / 255` segments of 255 followed by
//! one segment of `L % 255`. The trailing segment is present even when it is
//! zero, so every page ends its packet unambiguously.

use bytes::{BufMut, BytesMut};

use crate::checksum::ChecksumTable;
use crate::{Error, Result};

/// Page signature.
pub const SIGNATURE: &[u8; 4] = b"OggS";
/// Size of the fixed page header, before the segment table.
pub const PAGE_HEADER_SIZE: usize = 27;
/// Offset of the checksum field.
pub const CHECKSUM_OFFSET: usize = 22;
/// Most segments one page can carry.
pub const MAX_SEGMENTS: usize = 255;
/// Largest payload that can be laced into one page.
pub const MAX_PAYLOAD_SIZE: usize = 255 * (MAX_SEGMENTS - 1) + 254;

/// Header type flags of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PageType {
    /// Page in the middle of the stream.
    ContinuationOfStream = 0x00,
    /// First page of the logical stream.
    BeginningOfStream = 0x02,
    /// Last page of the logical stream.
    EndOfStream = 0x04,
}

/// Fixed header fields of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    pub granule_position: u64,
    pub serial: u32,
    pub sequence: u32,
}

/// Number of lacing values needed for a payload of `len` bytes.
pub fn segment_count(len: usize) -> usize {
    len / 255 + 1
}

/// Total page size for a payload of `len` bytes.
pub fn page_size(len: usize) -> usize {
    PAGE_HEADER_SIZE + segment_count(len) + len
}

/// Serialize a page and fill in its checksum.
pub fn build_page(table: &ChecksumTable, header: &PageHeader, payload: &[u8]) -> Result<BytesMut> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(Error::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_SIZE,
        });
    }
    let segments = segment_count(payload.len());

    let mut page = BytesMut::with_capacity(page_size(payload.len()));
    page.put_slice(SIGNATURE);
    page.put_u8(0); // version
    page.put_u8(header.page_type as u8);
    page.put_u64_le(header.granule_position);
    page.put_u32_le(header.serial);
    page.put_u32_le(header.sequence);
    page.put_u32_le(0); // checksum, filled below
    page.put_u8(segments as u8);

    page.put_bytes(255, segments - 1);
    page.put_u8((payload.len() % 255) as u8);
    page.put_slice(payload);

    let checksum = table.checksum(&page);
    page[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 4].copy_from_slice(&checksum.to_le_bytes());

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(page_type: PageType) -> PageHeader {
        PageHeader {
            page_type,
            granule_position: 0x0102_0304_0506_0708,
            serial: 0xdead_beef,
            sequence: 7,
        }
    }

    fn lacing(page: &[u8]) -> &[u8] {
        let n = page[26] as usize;
        &page[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + n]
    }

    #[test]
    fn test_header_fields() {
        let table = ChecksumTable::ogg();
        let page = build_page(&table, &header(PageType::BeginningOfStream), b"abc").unwrap();

        assert_eq!(&page[0..4], b"OggS");
        assert_eq!(page[4], 0);
        assert_eq!(page[5], 0x02);
        assert_eq!(&page[6..14], &0x0102_0304_0506_0708u64.to_le_bytes());
        assert_eq!(&page[14..18], &0xdead_beefu32.to_le_bytes());
        assert_eq!(&page[18..22], &7u32.to_le_bytes());
        assert_eq!(page[26], 1);
        assert_eq!(lacing(&page), &[3]);
        assert_eq!(&page[28..], b"abc");
        assert_eq!(page.len(), page_size(3));
    }

    #[test]
    fn test_lacing_values() {
        let table = ChecksumTable::ogg();
        let h = header(PageType::ContinuationOfStream);

        for (len, expected) in [
            (0usize, vec![0u8]),
            (254, vec![254]),
            (255, vec![255, 0]),
            (300, vec![255, 45]),
            (510, vec![255, 255, 0]),
        ] {
            let page = build_page(&table, &h, &vec![0x55; len]).unwrap();
            assert_eq!(lacing(&page), expected.as_slice(), "len {len}");
            assert_eq!(segment_count(len), len / 255 + 1);
            assert_eq!(page.len(), page_size(len));
        }
    }

    #[test]
    fn test_largest_payload() {
        let table = ChecksumTable::ogg();
        let h = header(PageType::ContinuationOfStream);

        let page = build_page(&table, &h, &vec![0; MAX_PAYLOAD_SIZE]).unwrap();
        assert_eq!(page[26], 255);
        assert_eq!(*lacing(&page).last().unwrap(), 254);

        let err = build_page(&table, &h, &vec![0; MAX_PAYLOAD_SIZE + 1]).unwrap_err();
        assert!(matches!(err, Error::PayloadTooLarge { len: 65025, max: 65024 }));
    }

    #[test]
    fn test_checksum_reproducible() {
        let table = ChecksumTable::ogg();
        for len in [0usize, 1, 200, 255, 1000] {
            let payload: Vec<u8> = (0..len).map(|i| (i * 7) as u8).collect();
            let mut page = build_page(&table, &header(PageType::EndOfStream), &payload).unwrap();

            let stored = u32::from_le_bytes(page[22..26].try_into().unwrap());
            page[22..26].fill(0);
            assert_eq!(table.checksum(&page), stored);
        }
    }

    #[test]
    fn test_checksum_depends_on_type() {
        let table = ChecksumTable::ogg();
        let a = build_page(&table, &header(PageType::ContinuationOfStream), b"x").unwrap();
        let b = build_page(&table, &header(PageType::EndOfStream), b"x").unwrap();
        assert_eq!(a.len(), b.len());
        assert_ne!(&a[22..26], &b[22..26]);
    }
}
