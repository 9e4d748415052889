//! Inline co-occurrence tracking (SPEC_FULL.md §4.5): when a query returns
//! a result set S, for each ordered pair (a, b) with a != b, bump
//! `co_retrieval_counts[b]` on record a, but only if the last bump for
//! that pair was more than the throttle window ago. Patches only the
//! co-retrieval substructure.

use std::sync::Arc;

use chrono::Utc;
use strata_core::cancel::CancellationToken;
use strata_core::errors::CortexResult;
use strata_core::record::{CoRetrievalMetadata, MemoryId, RecordPatch};
use strata_core::traits::VectorStore;
use tracing::warn;

pub struct CoOccurrenceTracker {
    store: Arc<dyn VectorStore>,
    throttle_secs: i64,
}

impl CoOccurrenceTracker {
    pub fn new(store: Arc<dyn VectorStore>, throttle_secs: i64) -> Self {
        Self { store, throttle_secs }
    }

    /// Record co-occurrence for a retrieved result set. Fire-and-forget
    /// relative to the caller: errors are logged, never propagated.
    pub async fn record(&self, ids: &[MemoryId], token: &CancellationToken) {
        for a in ids {
            let Ok(Some(record_a)) = self.store.get(a, token).await else {
                continue;
            };
            let mut counts = record_a.co_retrieval.counts.clone();
            let mut last_increment = record_a.co_retrieval.last_increment.clone();
            let now = Utc::now().timestamp();
            let mut changed = false;

            for b in ids {
                if a == b {
                    continue;
                }
                let last = last_increment.get(&b.0).copied().unwrap_or(0);
                if now - last < self.throttle_secs {
                    continue;
                }
                *counts.entry(b.0.clone()).or_insert(0) += 1;
                last_increment.insert(b.0.clone(), now);
                changed = true;
            }

            if !changed {
                continue;
            }

            let patch = RecordPatch::CoRetrieval(CoRetrievalMetadata { counts, last_increment });
            if let Err(e) = self.store.patch(a, patch, token).await {
                warn!(id = %a.0, error = %e, "co-occurrence patch failed");
            }
        }
    }
}
