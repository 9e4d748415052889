//! Scroll-and-rewrite orchestration for a consolidation pass
//! (SPEC_FULL.md §4.6). Bounded by `consolidation_scan_limit` records per
//! tier (the Open Question resolution: the O(n^2) pairwise scan is capped
//! rather than unbounded).

use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::errors::CortexResult;
use strata_core::record::{MemoryId, Tier};
use strata_core::traits::{tier_filter, ScrollCursor, VectorStore};
use tracing::{info, warn};

use crate::clustering::{cluster_by_similarity, pick_survivor, recompute_trust};

#[derive(Clone)]
pub struct ConsolidationDeps {
    pub store: Arc<dyn VectorStore>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TierConsolidationStats {
    pub scanned: usize,
    pub clusters_found: usize,
    pub records_deleted: usize,
}

const TIERS: [Tier; 4] = [Tier::Recent, Tier::Medium, Tier::Long, Tier::Ancient];

pub async fn run_consolidation_pass(
    deps: &ConsolidationDeps,
    config: &StrataConfig,
    token: &CancellationToken,
) -> CortexResult<[TierConsolidationStats; 4]> {
    let mut results = [TierConsolidationStats::default(); 4];
    for (idx, tier) in TIERS.into_iter().enumerate() {
        results[idx] = consolidate_tier(deps, config, tier, token).await?;
    }
    Ok(results)
}

async fn consolidate_tier(
    deps: &ConsolidationDeps,
    config: &StrataConfig,
    tier: Tier,
    token: &CancellationToken,
) -> CortexResult<TierConsolidationStats> {
    let mut stats = TierConsolidationStats::default();
    let filter = tier_filter(tier);

    let page = deps
        .store
        .scroll(&filter, ScrollCursor(None), config.consolidation_scan_limit, token)
        .await?;
    stats.scanned = page.records.len();

    let clusters = cluster_by_similarity(&page.records, config.duplicate_threshold);
    stats.clusters_found = clusters.len();

    for cluster in &clusters {
        let survivor = pick_survivor(&page.records, cluster).clone();
        let others: Vec<&strata_core::record::MemoryRecord> = cluster
            .iter()
            .map(|&idx| &page.records[idx])
            .filter(|r| r.id != survivor.id)
            .collect();

        let total_validation_count: u64 =
            survivor.validation_count + others.iter().map(|r| r.validation_count).sum::<u64>();
        let trust_score = recompute_trust(survivor.outcome_tag, total_validation_count);

        let mut related: Vec<MemoryId> = others.iter().map(|r| r.id.clone()).collect();
        related.truncate(config.max_links_per_memory);

        let mut updated_survivor = survivor.clone();
        updated_survivor.validation_count = total_validation_count;
        updated_survivor.trust_score = trust_score;
        updated_survivor.related_memories = related;

        if let Err(e) = deps.store.upsert(&updated_survivor, token).await {
            warn!(id = %survivor.id.0, error = %e, "consolidation survivor upsert failed, skipping cluster");
            continue;
        }

        for other in &others {
            match deps.store.delete(&other.id, token).await {
                Ok(()) => stats.records_deleted += 1,
                Err(e) => warn!(id = %other.id.0, error = %e, "consolidation delete failed"),
            }
        }
    }

    info!(
        tier = tier.as_str(),
        scanned = stats.scanned,
        clusters = stats.clusters_found,
        deleted = stats.records_deleted,
        "consolidation pass complete for tier"
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero() {
        let stats = TierConsolidationStats::default();
        assert_eq!(stats.scanned, 0);
        assert_eq!(stats.clusters_found, 0);
    }
}
