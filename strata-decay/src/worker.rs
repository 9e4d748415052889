//! Compress-pass driver (SPEC_FULL.md §4.4). For each tier transition,
//! scroll a batch-capped set of records in that tier, compress the
//! eligible ones, and upsert the full record with a refreshed embedding
//! (the vector is bound to `content`, so it must be regenerated). Failures
//! on individual memories are logged and skipped; the cycle continues.

use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::constants::{DEFAULT_DECAY_BATCH_CAP, DEFAULT_DECAY_TIMEOUT_SECS};
use strata_core::errors::CortexResult;
use strata_core::record::Tier;
use strata_core::traits::{tier_filter, ChatMessage, ChatRole, EmbeddingClient, LlmClient, ScrollCursor, VectorStore};
use tracing::{info, warn};

use crate::eligibility::is_eligible;
use crate::instructions::{compression_instruction, truncate_to_token_budget};

#[derive(Clone)]
pub struct DecayDeps {
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub llm: Arc<dyn LlmClient>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TierCompressionStats {
    pub scanned: usize,
    pub eligible: usize,
    pub compressed: usize,
    pub failed: usize,
}

/// Run one full compress pass across all three tier transitions.
pub async fn run_compress_pass(
    deps: &DecayDeps,
    config: &StrataConfig,
    token: &CancellationToken,
) -> CortexResult<[TierCompressionStats; 3]> {
    let mut results = [TierCompressionStats::default(); 3];
    for (idx, from_tier) in [Tier::Recent, Tier::Medium, Tier::Long].into_iter().enumerate() {
        results[idx] = compress_transition(deps, config, from_tier, token).await?;
    }
    Ok(results)
}

async fn compress_transition(
    deps: &DecayDeps,
    config: &StrataConfig,
    from_tier: Tier,
    token: &CancellationToken,
) -> CortexResult<TierCompressionStats> {
    let to_tier = from_tier.next().expect("transition tiers always have a next");
    let base_age_days = match from_tier {
        Tier::Recent => config.tier_age_days.recent_to_medium,
        Tier::Medium => config.tier_age_days.medium_to_long,
        Tier::Long => config.tier_age_days.long_to_ancient,
        Tier::Ancient => unreachable!("ancient is a terminal tier"),
    };

    let mut stats = TierCompressionStats::default();
    let filter = tier_filter(from_tier);
    let now = chrono::Utc::now();

    let page = deps
        .store
        .scroll(&filter, ScrollCursor(None), DEFAULT_DECAY_BATCH_CAP, token)
        .await?;
    stats.scanned = page.records.len();

    for record in &page.records {
        let eligible = is_eligible(
            record.created_at,
            now,
            record.importance_score,
            record.access_count,
            config.importance_modifier,
            config.access_modifier,
            base_age_days,
        );
        if !eligible {
            continue;
        }
        stats.eligible += 1;

        match compress_one(deps, record, to_tier, config.max_page_tokens, token).await {
            Ok(()) => stats.compressed += 1,
            Err(e) => {
                warn!(id = %record.id.0, error = %e, "compression failed, skipping");
                stats.failed += 1;
            }
        }
    }

    info!(
        from = from_tier.as_str(),
        to = to_tier.as_str(),
        scanned = stats.scanned,
        eligible = stats.eligible,
        compressed = stats.compressed,
        failed = stats.failed,
        "decay compress pass complete for tier transition"
    );
    Ok(stats)
}

async fn compress_one(
    deps: &DecayDeps,
    record: &strata_core::record::MemoryRecord,
    to_tier: Tier,
    max_page_tokens: usize,
    token: &CancellationToken,
) -> CortexResult<()> {
    let instruction = compression_instruction(to_tier);
    let (content, truncated) = truncate_to_token_budget(&record.content, max_page_tokens);
    if truncated {
        warn!(id = %record.id.0, max_page_tokens, "content truncated before compression prompt");
    }
    let messages = [
        ChatMessage {
            role: ChatRole::System,
            content: instruction.to_string(),
        },
        ChatMessage {
            role: ChatRole::User,
            content,
        },
    ];
    let compressed = deps
        .llm
        .complete(
            &messages,
            0.0,
            Duration::from_secs(DEFAULT_DECAY_TIMEOUT_SECS),
            token,
        )
        .await?;

    let embedding = deps.embeddings.embed(&compressed, token).await?;

    let mut updated = record.clone();
    if updated.compressed_from.is_none() {
        updated.compressed_from = Some(record.content.clone());
    }
    updated.content = compressed;
    updated.tier = to_tier;
    updated.embedding = Some(embedding);

    deps.store.upsert(&updated, token).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_default_to_zero() {
        let stats = TierCompressionStats::default();
        assert_eq!(stats.scanned, 0);
        assert_eq!(stats.compressed, 0);
    }
}
