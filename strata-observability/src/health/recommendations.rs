//! Actionable recommendations derived from a health snapshot.

use serde::{Deserialize, Serialize};

use super::reporter::HealthSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub message: String,
    pub action: String,
}

/// Generate recommendations from the current health snapshot.
pub fn generate(snapshot: &HealthSnapshot) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if snapshot.tagger_dropped_total > 0 {
        recs.push(Recommendation {
            severity: Severity::Warning,
            message: format!(
                "{} tagger enqueues dropped since startup",
                snapshot.tagger_dropped_total
            ),
            action: "increase tagger_queue_size or tagger_workers".into(),
        });
    }

    if snapshot.tagger_queue_capacity > 0
        && snapshot.tagger_queue_depth * 100 / snapshot.tagger_queue_capacity > 80
    {
        recs.push(Recommendation {
            severity: Severity::Info,
            message: "tagger queue depth is over 80% of capacity".into(),
            action: "watch for dropped enqueues on the next cycle".into(),
        });
    }

    if snapshot.decay_failed_total > 10 {
        recs.push(Recommendation {
            severity: Severity::Warning,
            message: format!("{} decay compressions failed", snapshot.decay_failed_total),
            action: "check the compression LLM's recent error rate".into(),
        });
    }

    if snapshot.linker_failed_total > 10 {
        recs.push(Recommendation {
            severity: Severity::Warning,
            message: format!(
                "{} similarity-linking searches failed",
                snapshot.linker_failed_total
            ),
            action: "check vector-store search availability".into(),
        });
    }

    if snapshot.consolidation_failed_total > 10 {
        recs.push(Recommendation {
            severity: Severity::Warning,
            message: format!(
                "{} consolidation upserts failed",
                snapshot.consolidation_failed_total
            ),
            action: "check vector-store write availability".into(),
        });
    }

    if !snapshot.embedding_service_healthy {
        recs.push(Recommendation {
            severity: Severity::Critical,
            message: "embedding service is unreachable".into(),
            action: "ingest and tagging cannot re-embed; check the embedding service".into(),
        });
    }

    if !snapshot.llm_service_healthy {
        recs.push(Recommendation {
            severity: Severity::Critical,
            message: "chat LLM service is unreachable".into(),
            action: "tagging, decay, and principle cycles will fail; check the LLM service".into(),
        });
    }

    recs
}
