//! Per-subsystem health checks: tagger queue, decay worker, linker,
//! consolidator, and the two external services. Each returns
//! healthy/degraded/unhealthy with an optional human-readable message.

use super::reporter::HealthSnapshot;
use super::{HealthStatus, SubsystemHealth};

pub struct SubsystemChecker;

impl SubsystemChecker {
    pub fn check_all(snapshot: &HealthSnapshot) -> Vec<SubsystemHealth> {
        vec![
            Self::check_tagger(snapshot),
            Self::check_decay(snapshot),
            Self::check_linker(snapshot),
            Self::check_consolidation(snapshot),
            Self::check_embedding_service(snapshot),
            Self::check_llm_service(snapshot),
        ]
    }

    /// Degraded past 80% full (queue drops enqueues at capacity), unhealthy
    /// once any enqueue has actually been dropped.
    fn check_tagger(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let (status, message) = if snapshot.tagger_dropped_total > 0 {
            (
                HealthStatus::Unhealthy,
                Some(format!(
                    "{} tagger enqueues dropped for a full queue",
                    snapshot.tagger_dropped_total
                )),
            )
        } else if snapshot.tagger_queue_capacity > 0
            && snapshot.tagger_queue_depth * 100 / snapshot.tagger_queue_capacity > 80
        {
            (
                HealthStatus::Degraded,
                Some("tagger queue depth over 80% of capacity".into()),
            )
        } else {
            (HealthStatus::Healthy, None)
        };
        SubsystemHealth {
            name: "tagger".into(),
            status,
            message,
        }
    }

    fn check_decay(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let (status, message) = if snapshot.decay_failed_total > 10 {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "{} decay compressions failed this run",
                    snapshot.decay_failed_total
                )),
            )
        } else {
            (HealthStatus::Healthy, None)
        };
        SubsystemHealth {
            name: "decay".into(),
            status,
            message,
        }
    }

    fn check_linker(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let (status, message) = if snapshot.linker_failed_total > 10 {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "{} similarity-linking searches failed this run",
                    snapshot.linker_failed_total
                )),
            )
        } else {
            (HealthStatus::Healthy, None)
        };
        SubsystemHealth {
            name: "linker".into(),
            status,
            message,
        }
    }

    fn check_consolidation(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let (status, message) = if snapshot.consolidation_failed_total > 10 {
            (
                HealthStatus::Degraded,
                Some(format!(
                    "{} consolidation upserts failed this run",
                    snapshot.consolidation_failed_total
                )),
            )
        } else {
            (HealthStatus::Healthy, None)
        };
        SubsystemHealth {
            name: "consolidation".into(),
            status,
            message,
        }
    }

    fn check_embedding_service(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let status = if snapshot.embedding_service_healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        SubsystemHealth {
            name: "embedding_service".into(),
            status,
            message: (!snapshot.embedding_service_healthy).then(|| "embedding service unreachable".into()),
        }
    }

    fn check_llm_service(snapshot: &HealthSnapshot) -> SubsystemHealth {
        let status = if snapshot.llm_service_healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        };
        SubsystemHealth {
            name: "llm_service".into(),
            status,
            message: (!snapshot.llm_service_healthy).then(|| "chat LLM service unreachable".into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagger_degrades_past_eighty_percent_depth() {
        let snapshot = HealthSnapshot {
            tagger_queue_depth: 85,
            tagger_queue_capacity: 100,
            ..Default::default()
        };
        let health = SubsystemChecker::check_tagger(&snapshot);
        assert_eq!(health.status, HealthStatus::Degraded);
    }

    #[test]
    fn tagger_unhealthy_once_anything_is_dropped() {
        let snapshot = HealthSnapshot {
            tagger_dropped_total: 1,
            ..Default::default()
        };
        let health = SubsystemChecker::check_tagger(&snapshot);
        assert_eq!(health.status, HealthStatus::Unhealthy);
    }

    #[test]
    fn unreachable_embedding_service_is_unhealthy() {
        let snapshot = HealthSnapshot {
            embedding_service_healthy: false,
            ..Default::default()
        };
        let health = SubsystemChecker::check_embedding_service(&snapshot);
        assert_eq!(health.status, HealthStatus::Unhealthy);
    }
}
