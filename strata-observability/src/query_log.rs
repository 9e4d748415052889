//! Append-only retrieval query log: query text, latency, result count, and
//! the bias that was applied, kept as a bounded ring buffer for operator
//! inspection and latency percentile reporting.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_ENTRIES: usize = 50_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub query: String,
    pub owner_user_id: String,
    pub latency: Duration,
    pub result_count: usize,
    pub good_behavior_bias: f64,
    pub timestamp: DateTime<Utc>,
}

impl QueryLogEntry {
    pub fn new(
        query: impl Into<String>,
        owner_user_id: impl Into<String>,
        latency: Duration,
        result_count: usize,
        good_behavior_bias: f64,
    ) -> Self {
        Self {
            query: query.into(),
            owner_user_id: owner_user_id.into(),
            latency,
            result_count,
            good_behavior_bias,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryLog {
    entries: Vec<QueryLogEntry>,
    max_entries: usize,
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_entries: max_entries.max(1),
        }
    }

    /// Record a query, evicting the oldest entry first if at capacity.
    pub fn record(&mut self, entry: QueryLogEntry) {
        tracing::debug!(
            query = %entry.query,
            latency_ms = entry.latency.as_millis() as u64,
            result_count = entry.result_count,
            "retrieval query logged"
        );
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(..overflow);
        }
    }

    pub fn entries(&self) -> &[QueryLogEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn avg_latency(&self) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.entries.iter().map(|e| e.latency).sum();
        total / self.entries.len() as u32
    }

    /// Latency at percentile `p` in [0, 1], nearest-rank.
    pub fn latency_percentile(&self, p: f64) -> Duration {
        if self.entries.is_empty() {
            return Duration::ZERO;
        }
        let mut latencies: Vec<Duration> = self.entries.iter().map(|e| e.latency).collect();
        latencies.sort();
        let idx = ((p.clamp(0.0, 1.0) * (latencies.len() - 1) as f64).round() as usize).min(latencies.len() - 1);
        latencies[idx]
    }
}
