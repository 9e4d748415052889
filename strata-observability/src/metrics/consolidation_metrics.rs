//! Consolidation pass throughput (SPEC_FULL.md §4.6).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConsolidationMetrics {
    pub runs: u64,
    pub scanned: u64,
    pub clusters_found: u64,
    pub records_deleted: u64,
}

impl ConsolidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, scanned: u64, clusters_found: u64, records_deleted: u64) {
        self.runs += 1;
        self.scanned += scanned;
        self.clusters_found += clusters_found;
        self.records_deleted += records_deleted;
    }

    /// Average number of memories collapsed into their survivor per cluster found.
    pub fn avg_cluster_shrinkage(&self) -> f64 {
        if self.clusters_found == 0 {
            return 0.0;
        }
        self.records_deleted as f64 / self.clusters_found as f64
    }
}
