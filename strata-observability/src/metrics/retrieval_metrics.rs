//! Retrieval query performance (SPEC_FULL.md §4.7).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RetrievalMetrics {
    pub queries_served: u64,
    pub total_results_returned: u64,
    pub total_latency_ms: u64,
}

impl RetrievalMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result_count: usize, latency_ms: u64) {
        self.queries_served += 1;
        self.total_results_returned += result_count as u64;
        self.total_latency_ms += latency_ms;
    }

    pub fn avg_results_per_query(&self) -> f64 {
        if self.queries_served == 0 {
            return 0.0;
        }
        self.total_results_returned as f64 / self.queries_served as f64
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.queries_served == 0 {
            return 0.0;
        }
        self.total_latency_ms as f64 / self.queries_served as f64
    }
}
