//! [`ObservabilityEngine`] ties metrics collection, the query log, and
//! health reporting together behind one handle the scheduler can hold
//! alongside the worker supervisor.

use crate::health::reporter::{HealthReport, HealthReporter, HealthSnapshot};
use crate::health::Recommendation;
use crate::metrics::MetricsCollector;
use crate::query_log::{QueryLog, QueryLogEntry};

#[derive(Debug, Default)]
pub struct ObservabilityEngine {
    pub metrics: MetricsCollector,
    pub query_log: QueryLog,
}

impl ObservabilityEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a health report from the given snapshot without mutating
    /// engine state; the caller assembles the snapshot from the latest
    /// worker stats each time it wants a report.
    pub fn health_report(&self, snapshot: &HealthSnapshot) -> HealthReport {
        HealthReporter::build(snapshot)
    }

    pub fn recommendations(&self, snapshot: &HealthSnapshot) -> Vec<Recommendation> {
        HealthReporter::recommendations(snapshot)
    }

    pub fn record_query(&mut self, entry: QueryLogEntry) {
        self.query_log.record(entry);
    }

    /// Reset all metric counters (periodic rotation or test isolation).
    pub fn reset_metrics(&mut self) {
        self.metrics.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_engine_reports_healthy_with_no_snapshot_data() {
        let engine = ObservabilityEngine::new();
        let snapshot = HealthSnapshot {
            embedding_service_healthy: true,
            llm_service_healthy: true,
            ..Default::default()
        };
        let report = engine.health_report(&snapshot);
        assert_eq!(report.overall_status, crate::health::HealthStatus::Healthy);
    }
}
