//! Similarity-linker throughput (SPEC_FULL.md §4.5).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LinkerMetrics {
    pub runs: u64,
    pub scanned: u64,
    pub linked: u64,
    pub failed: u64,
}

impl LinkerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, scanned: u64, linked: u64, failed: u64) {
        self.runs += 1;
        self.scanned += scanned;
        self.linked += linked;
        self.failed += failed;
    }
}
