//! Retrieval orchestration (SPEC_FULL.md §4.7).

use std::sync::Arc;

use chrono::Utc;
use strata_core::cancel::CancellationToken;
use strata_core::errors::CortexResult;
use strata_core::record::{OutcomeTag, RecordPatch, Tier};
use strata_core::traits::{tier_filter, EmbeddingClient, FilterClause, ScoredRecord, SearchFilter, VectorStore};
use strata_linker::CoOccurrenceTracker;
use strata_storage::filter::{concept_tag_filter, merge, visibility_filter};
use tracing::warn;

use crate::rerank::rerank_results;

#[derive(Clone)]
pub struct RetrievalDeps {
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub co_occurrence: Arc<CoOccurrenceTracker>,
}

#[derive(Debug, Clone)]
pub struct RetrievalQuery {
    pub text: String,
    pub owner_user_id: String,
    pub include_personal: bool,
    pub include_collective: bool,
    pub tier: Option<Tier>,
    pub outcome: Option<OutcomeTag>,
    pub concept_tags: Vec<String>,
    pub limit: usize,
    pub min_score: f64,
    pub good_behavior_bias: f64,
}

pub async fn retrieve(
    deps: &RetrievalDeps,
    query: &RetrievalQuery,
    token: &CancellationToken,
) -> CortexResult<Vec<ScoredRecord>> {
    let query_vector = deps.embeddings.embed(&query.text, token).await?;

    let mut filter = visibility_filter(&query.owner_user_id, query.include_personal, query.include_collective);
    if let Some(tier) = query.tier {
        filter = merge(filter, tier_filter(tier));
    }
    if let Some(outcome) = query.outcome {
        let outcome_filter = SearchFilter::new().with_must(FilterClause::new("outcome_tag", vec![outcome.as_str().to_string()]));
        filter = merge(filter, outcome_filter);
    }
    if !query.concept_tags.is_empty() {
        filter = merge(filter, concept_tag_filter(&query.concept_tags));
    }

    let search_limit = query.limit.max(1) * 4;
    let results = deps.store.search(&query_vector, &filter, search_limit, token).await?;

    let above_floor: Vec<ScoredRecord> = results.into_iter().filter(|r| r.score >= query.min_score).collect();

    let mut reranked = rerank_results(above_floor, query.good_behavior_bias.clamp(0.0, 1.0));
    reranked.truncate(query.limit);

    spawn_followups(deps.clone(), &reranked);

    Ok(reranked)
}

/// Enqueue co-occurrence and access-metadata updates without making the
/// caller wait for them (SPEC_FULL.md §4.7, §5). These run against a
/// fresh cancellation token since the caller's own token may already be
/// torn down by the time they execute.
fn spawn_followups(deps: RetrievalDeps, results: &[ScoredRecord]) {
    if results.is_empty() {
        return;
    }
    let ids: Vec<_> = results.iter().map(|r| r.record.id.clone()).collect();
    let records = results.to_vec();

    tokio::spawn(async move {
        let token = CancellationToken::new();
        deps.co_occurrence.record(&ids, &token).await;

        for scored in &records {
            let patch = RecordPatch::AccessBump {
                access_count: scored.record.access_count + 1,
                last_accessed_at: Utc::now(),
            };
            if let Err(e) = deps.store.patch(&scored.record.id, patch, &token).await {
                warn!(id = %scored.record.id.0, error = %e, "access-metadata bump failed");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults_are_spelled_out_explicitly() {
        let query = RetrievalQuery {
            text: "hello".into(),
            owner_user_id: "u1".into(),
            include_personal: true,
            include_collective: false,
            tier: None,
            outcome: None,
            concept_tags: vec![],
            limit: 10,
            min_score: 0.0,
            good_behavior_bias: 0.0,
        };
        assert_eq!(query.limit, 10);
    }
}
