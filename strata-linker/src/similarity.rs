//! Offline similarity linking (SPEC_FULL.md §4.5): for each tier, scroll a
//! batch of records and, for any with room under `max_links_per_memory`,
//! search for same-tier neighbors above the similarity threshold. Only
//! `related_memories` is patched — the full record is never rewritten.

use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::constants::DEFAULT_LINKER_BATCH_SIZE;
use strata_core::errors::CortexResult;
use strata_core::record::{RecordPatch, Tier};
use strata_core::traits::{tier_filter, ScrollCursor, VectorStore};
use tracing::{info, warn};

#[derive(Clone)]
pub struct LinkerDeps {
    pub store: Arc<dyn VectorStore>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TierLinkStats {
    pub scanned: usize,
    pub linked: usize,
    pub failed: usize,
}

const TIERS: [Tier; 4] = [Tier::Recent, Tier::Medium, Tier::Long, Tier::Ancient];

pub async fn run_similarity_linking(
    deps: &LinkerDeps,
    config: &StrataConfig,
    token: &CancellationToken,
) -> CortexResult<[TierLinkStats; 4]> {
    let mut results = [TierLinkStats::default(); 4];
    for (idx, tier) in TIERS.into_iter().enumerate() {
        results[idx] = link_tier(deps, config, tier, token).await?;
    }
    Ok(results)
}

async fn link_tier(
    deps: &LinkerDeps,
    config: &StrataConfig,
    tier: Tier,
    token: &CancellationToken,
) -> CortexResult<TierLinkStats> {
    let mut stats = TierLinkStats::default();
    let filter = tier_filter(tier);

    let page = deps
        .store
        .scroll(&filter, ScrollCursor(None), DEFAULT_LINKER_BATCH_SIZE, token)
        .await?;
    stats.scanned = page.records.len();

    for record in &page.records {
        if record.related_memories.len() >= config.max_links_per_memory {
            continue;
        }
        let Some(embedding) = &record.embedding else {
            continue;
        };

        // Over-fetch since self and already-linked neighbors get filtered out below.
        let search_limit = (config.max_links_per_memory * 2).max(5);
        let results = match deps.store.search(embedding, &filter, search_limit, token).await {
            Ok(r) => r,
            Err(e) => {
                warn!(id = %record.id.0, error = %e, "similarity search failed, skipping record");
                stats.failed += 1;
                continue;
            }
        };

        let mut neighbors = record.related_memories.clone();
        for scored in results {
            if scored.score < config.similarity_threshold {
                continue;
            }
            if scored.record.id == record.id || neighbors.contains(&scored.record.id) {
                continue;
            }
            neighbors.push(scored.record.id.clone());
            if neighbors.len() >= config.max_links_per_memory {
                break;
            }
        }

        if neighbors.len() == record.related_memories.len() {
            continue;
        }

        match deps
            .store
            .patch(&record.id, RecordPatch::RelatedMemories(neighbors), token)
            .await
        {
            Ok(()) => stats.linked += 1,
            Err(e) => {
                warn!(id = %record.id.0, error = %e, "related_memories patch failed");
                stats.failed += 1;
            }
        }
    }

    info!(
        tier = tier.as_str(),
        scanned = stats.scanned,
        linked = stats.linked,
        failed = stats.failed,
        "similarity linking pass complete for tier"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero() {
        let stats = TierLinkStats::default();
        assert_eq!(stats.scanned, 0);
        assert_eq!(stats.linked, 0);
    }
}
