//! Time-to-byte-offset index.
//!
//! Every emitted output unit records a pair of (elapsed milliseconds since the
//! first unit, cumulative bytes written). Elapsed time is measured with the
//! writer's clock, independently of any media timestamps. Players load the
//! index from the `-offsets.json` sidecar to seek without parsing the file.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::Result;

/// One entry of the per-second seek index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayOffset {
    /// Elapsed milliseconds at the sample.
    #[serde(rename = "time")]
    pub time_offset: u64,
    /// Cumulative bytes written at the sample.
    #[serde(rename = "bytes")]
    pub bytes_offset: u64,
}

/// Running elapsed-time to cumulative-bytes map.
#[derive(Debug, Clone, Default)]
pub struct OffsetIndex {
    entries: BTreeMap<u64, u64>,
    last_tick: Option<u64>,
    elapsed_ms: u64,
    bytes: u64,
}

impl OffsetIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an output unit of `len` bytes written at clock reading `now_ms`.
    ///
    /// The first call sets the time baseline, so the first unit lands at
    /// elapsed time 0 with its own length. Returns the milliseconds elapsed since the previous call,
    /// which is 0 for the first one. Clock readings that go backwards count as
    /// no elapsed time. A later unit landing on an already recorded millisecond
    /// replaces that entry.
    pub fn record(&mut self, now_ms: u64, len: u64) -> u64 {
        let last = self.last_tick.unwrap_or(now_ms);

        let delta = now_ms.saturating_sub(last);
        self.last_tick = Some(now_ms);
        self.bytes += len;
        self.elapsed_ms += delta;
        self.entries.insert(self.elapsed_ms, self.bytes);

        delta
    }

    /// Entries in ascending elapsed-time order.
    pub fn entries(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.entries.iter().map(|(&time, &bytes)| (time, bytes))
    }

    /// Number of distinct elapsed-time keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest elapsed time recorded, in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Cumulative bytes recorded.
    pub fn total_bytes(&self) -> u64 {
        self.bytes
    }

    /// Compress the index to one entry per whole elapsed second.
    ///
    /// Slot `n` holds the earliest sample whose elapsed time falls in
    /// `[n * 1000, (n + 1) * 1000)`. Only whole seconds are covered, so the
    /// trailing partial second is left out. Seconds without any sample are
    /// `None`.
    pub fn per_second(&self) -> Vec<Option<PlayOffset>> {
        let seconds = (self.elapsed_ms / 1000) as usize;
        let mut index = vec![None; seconds];

        for (time, bytes) in self.entries() {
            let slot = (time / 1000) as usize;
            if slot >= seconds {
                break;
            }
            if index[slot].is_none() {
                index[slot] = Some(PlayOffset {
                    time_offset: time,
                    bytes_offset: bytes,
                });
            }
        }

        index
    }

    /// Write the full map as a JSON object keyed by elapsed milliseconds.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, &self.entries)?;
        out.flush()?;
        Ok(())
    }

    /// Write the per-second index as a JSON array.
    pub fn write_per_second_json(&self, path: &Path) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut out, &self.per_second())?;
        out.flush()?;
        Ok(())
    }
}
