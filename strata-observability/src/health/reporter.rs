//! Aggregate health report generation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::recommendations::Recommendation;
use super::subsystem_checks::SubsystemChecker;
use super::{HealthStatus, SubsystemHealth};

/// Snapshot of worker and external-service state used to build a health
/// report. Populated by the scheduler from the latest metrics and the
/// tagger queue's own depth/capacity counters.
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub tagger_queue_depth: usize,
    pub tagger_queue_capacity: usize,
    pub tagger_dropped_total: u64,
    pub decay_failed_total: u64,
    pub linker_failed_total: u64,
    pub consolidation_failed_total: u64,
    pub embedding_service_healthy: bool,
    pub llm_service_healthy: bool,
}

/// Builds a [`HealthReport`] from a snapshot and subsystem checks.
pub struct HealthReporter;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall_status: HealthStatus,
    pub subsystems: Vec<SubsystemHealth>,
    pub generated_at: DateTime<Utc>,
}

impl HealthReporter {
    /// Generate a full health report from the given snapshot.
    pub fn build(snapshot: &HealthSnapshot) -> HealthReport {
        let subsystems = SubsystemChecker::check_all(snapshot);
        let overall_status = Self::derive_overall(&subsystems);

        HealthReport {
            overall_status,
            subsystems,
            generated_at: Utc::now(),
        }
    }

    /// Generate recommendations alongside the report.
    pub fn recommendations(snapshot: &HealthSnapshot) -> Vec<Recommendation> {
        super::recommendations::generate(snapshot)
    }

    /// Derive overall status: unhealthy if any subsystem is unhealthy,
    /// degraded if any is degraded, otherwise healthy.
    fn derive_overall(subsystems: &[SubsystemHealth]) -> HealthStatus {
        let mut worst = HealthStatus::Healthy;
        for s in subsystems {
            match s.status {
                HealthStatus::Unhealthy => return HealthStatus::Unhealthy,
                HealthStatus::Degraded => worst = HealthStatus::Degraded,
                HealthStatus::Healthy => {}
            }
        }
        worst
    }
}
