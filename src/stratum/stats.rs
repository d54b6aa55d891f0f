//! Share counters and uptime

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Accepted/rejected share counts since process start
#[derive(Debug)]
pub struct ShareStats {
    accepted: AtomicU64,
    rejected: AtomicU64,
    started: Instant,
}

impl ShareStats {
    /// Start counting now
    pub fn new() -> Self {
        Self {
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Count an accepted share, returning the new total
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a rejected share, returning the new total
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Accepted shares so far
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Rejected shares so far
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Time since start
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    /// Uptime at whole-second resolution, e.g. `1h 2m 3s`
    pub fn uptime_display(&self) -> String {
        humantime::format_duration(Duration::from_secs(self.uptime().as_secs())).to_string()
    }
}

impl Default for ShareStats {
    fn default() -> Self {
        Self::new()
    }
}
