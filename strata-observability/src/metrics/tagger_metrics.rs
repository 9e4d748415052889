//! Tagger queue throughput (SPEC_FULL.md §4.3).

use serde::{Deserialize, Serialize};

/// Latest cumulative totals reported by the tagger's own atomic counters.
/// The tagger owns the counters; this struct just mirrors the last
/// observed snapshot for reporting alongside the rest of the system.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaggerMetrics {
    pub enqueued: u64,
    pub processed: u64,
    pub failed: u64,
    pub dropped: u64,
    pub active_workers: usize,
}

impl TaggerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, enqueued: u64, processed: u64, failed: u64, dropped: u64, active_workers: usize) {
        self.enqueued = enqueued;
        self.processed = processed;
        self.failed = failed;
        self.dropped = dropped;
        self.active_workers = active_workers;
    }

    /// Fraction of enqueue attempts that were dropped for a full queue.
    pub fn drop_rate(&self) -> f64 {
        if self.enqueued == 0 {
            return 0.0;
        }
        self.dropped as f64 / self.enqueued as f64
    }
}
