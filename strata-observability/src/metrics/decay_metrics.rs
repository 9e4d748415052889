//! Decay worker compression throughput (SPEC_FULL.md §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DecayMetrics {
    pub runs: u64,
    pub scanned: u64,
    pub eligible: u64,
    pub compressed: u64,
    pub failed: u64,
}

impl DecayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one compress-pass worth of tier stats.
    pub fn record(&mut self, scanned: u64, eligible: u64, compressed: u64, failed: u64) {
        self.runs += 1;
        self.scanned += scanned;
        self.eligible += eligible;
        self.compressed += compressed;
        self.failed += failed;
    }

    /// Share of eligible records that compressed without error.
    pub fn success_rate(&self) -> f64 {
        if self.eligible == 0 {
            return 1.0;
        }
        self.compressed as f64 / self.eligible as f64
    }
}
