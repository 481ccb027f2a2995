//! IVF file and frame header serialization.

use bytes::{BufMut, BytesMut};

use super::VideoCodec;

/// File signature.
pub const SIGNATURE: &[u8; 4] = b"DKIF";
/// Size of the file header in bytes.
pub const FILE_HEADER_SIZE: usize = 32;
/// Size of each frame record header in bytes.
pub const FRAME_HEADER_SIZE: usize = 20;
/// Offset of the frame count field inside the file header.
pub const FRAME_COUNT_OFFSET: u64 = 24;
/// Frame count written before the real one is known.
pub const PROVISIONAL_FRAME_COUNT: u32 = 900;

/// Fields of the 32-byte file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub codec: VideoCodec,
    pub width: u16,
    pub height: u16,
    pub timebase_denominator: u32,
    pub timebase_numerator: u32,
    pub frame_count: u32,
}

impl FileHeader {
    /// Serialize the header.
    pub fn to_bytes(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(FILE_HEADER_SIZE);
        buf.put_slice(SIGNATURE);
        buf.put_u16_le(0); // version
        buf.put_u16_le(FILE_HEADER_SIZE as u16);
        buf.put_slice(&self.codec.fourcc());
        buf.put_u16_le(self.width);
        buf.put_u16_le(self.height);
        buf.put_u32_le(self.timebase_denominator);
        buf.put_u32_le(self.timebase_numerator);
        buf.put_u32_le(self.frame_count);
        buf.put_u32_le(0); // reserved
        buf
    }
}

/// Fields of the 20-byte header preceding every frame payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Payload length in bytes.
    pub len: u32,
    /// Zero-based frame index.
    pub index: u64,
    /// Milliseconds since the previous frame was written.
    pub delay_ms: u64,
}

impl FrameHeader {
    /// Serialize the header.
    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut out = [0u8; FRAME_HEADER_SIZE];
        out[0..4].copy_from_slice(&self.len.to_le_bytes());
        out[4..12].copy_from_slice(&self.index.to_le_bytes());
        out[12..20].copy_from_slice(&self.delay_ms.to_le_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_header_layout() {
        let header = FileHeader {
            codec: VideoCodec::Av1,
            width: 1280,
            height: 720,
            timebase_denominator: 30,
            timebase_numerator: 1,
            frame_count: PROVISIONAL_FRAME_COUNT,
        };
        let bytes = header.to_bytes();

        assert_eq!(bytes.len(), FILE_HEADER_SIZE);
        assert_eq!(&bytes[0..4], b"DKIF");
        assert_eq!(&bytes[4..6], &[0, 0]);
        assert_eq!(&bytes[6..8], &[32, 0]);
        assert_eq!(&bytes[8..12], b"AV01");
        assert_eq!(&bytes[12..14], &1280u16.to_le_bytes());
        assert_eq!(&bytes[14..16], &720u16.to_le_bytes());
        assert_eq!(&bytes[16..20], &30u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &1u32.to_le_bytes());
        assert_eq!(&bytes[24..28], &900u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_frame_header_layout() {
        let header = FrameHeader {
            len: 3,
            index: 7,
            delay_ms: 33,
        };
        let bytes = header.to_bytes();

        assert_eq!(&bytes[0..4], &[3, 0, 0, 0]);
        assert_eq!(&bytes[4..12], &7u64.to_le_bytes());
        assert_eq!(&bytes[12..20], &33u64.to_le_bytes());
    }
}
