//! Millisecond clocks.
//!
//! Inter-frame delays and the offset index are measured in wall-clock time at
//! the moment of each write. Writers take the clock as a capability so tests
//! can drive time by hand and get byte-exact output.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of the current time in milliseconds.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds. Only differences between readings matter.
    fn now_millis(&self) -> u64;
}

/// Wall clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock reading `start` milliseconds.
    pub fn new(start: u64) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Set the clock to an absolute reading.
    pub fn set(&self, millis: u64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}
