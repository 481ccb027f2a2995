//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which owns a temporary output directory, a
//! manual clock, and a [`Recorder`] wired to both.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rtprec::media::ManualClock;
use rtprec::rtp::RtpPacket;
use rtprec::{Recorder, RecorderConfig};
use tempfile::TempDir;

/// Recorder writing into a temporary directory under a manual clock.
pub struct TestHarness {
    pub dir: TempDir,
    pub clock: Arc<ManualClock>,
    pub recorder: Recorder,
}

impl TestHarness {
    /// Harness with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RecorderConfig::default())
    }

    /// Harness with `config`; its output directory is replaced by a temp dir.
    pub fn with_config(mut config: RecorderConfig) -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        config.output_dir = dir.path().join("recordings");

        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let recorder = Recorder::new(config)
            .expect("invalid test config")
            .with_clock(clock.clone());

        Self {
            dir,
            clock,
            recorder,
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("recordings")
    }

    pub fn read(&self, file: &str) -> Vec<u8> {
        std::fs::read(self.output_dir().join(file)).expect("missing output file")
    }

    pub fn read_json(&self, file: &str) -> serde_json::Value {
        let text = std::fs::read_to_string(self.output_dir().join(file))
            .expect("missing sidecar file");
        serde_json::from_str(&text).expect("sidecar is not JSON")
    }
}

/// Builds VP8 RTP packets: each frame is split over `fragments` packets.
pub struct Vp8Stream {
    sequence_number: u16,
    timestamp: u32,
}

impl Vp8Stream {
    pub fn new() -> Self {
        Self {
            sequence_number: 0,
            timestamp: 0,
        }
    }

    /// Packets of one frame whose bitstream is `frame`.
    pub fn frame(&mut self, keyframe: bool, frame: &[u8], fragments: usize) -> Vec<RtpPacket> {
        let mut bitstream = frame.to_vec();
        // Frame tag P bit: 0 for keyframes
        bitstream[0] = (bitstream[0] & !0x01) | u8::from(!keyframe);

        let chunk = bitstream.len().div_ceil(fragments);
        let chunks: Vec<&[u8]> = bitstream.chunks(chunk).collect();
        let last = chunks.len() - 1;

        let packets = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let descriptor = if i == 0 { 0x10 } else { 0x00 };
                let mut payload = vec![descriptor];
                payload.extend_from_slice(chunk);
                self.sequence_number = self.sequence_number.wrapping_add(1);
                RtpPacket::new(self.sequence_number, self.timestamp, i == last, payload)
            })
            .collect();

        self.timestamp = self.timestamp.wrapping_add(3000);
        packets
    }
}

/// Opus RTP packets 20 ms apart.
pub fn opus_packets(count: u16, first_timestamp: u32) -> Vec<RtpPacket> {
    (0..count)
        .map(|i| {
            let timestamp = first_timestamp.wrapping_add(u32::from(i) * 960);
            RtpPacket::new(i, timestamp, true, vec![0xfc, 0xff, 0xfe, i as u8])
        })
        .collect()
}

pub fn le_u32(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
}

pub fn le_u64(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap())
}

/// Split an Ogg stream into pages.
pub fn ogg_pages(data: &[u8]) -> Vec<&[u8]> {
    let mut pages = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let segments = data[pos + 26] as usize;
        let payload: usize = data[pos + 27..pos + 27 + segments]
            .iter()
            .map(|&v| v as usize)
            .sum();
        let end = pos + 27 + segments + payload;
        pages.push(&data[pos..end]);
        pos = end;
    }
    pages
}

pub fn exists(dir: &Path, file: &str) -> bool {
    dir.join(file).exists()
}
