//! Contrastive extraction (SPEC_FULL.md §4.8): sample up to 50 good and 50
//! bad memories, pair up to 10 of them, and ask a small LLM for one
//! behavioral rule explaining the difference per pair.

use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::constants::{
    DEFAULT_PRINCIPLE_TIMEOUT_SECS, MIN_PRINCIPLE_CONFIDENCE, PRINCIPLE_CONTENT_LEN_RANGE,
};
use strata_core::errors::CortexResult;
use strata_core::record::{MemoryId, OutcomeTag};
use strata_core::traits::{ChatMessage, ChatRole, FilterClause, LlmClient, ScrollCursor, SearchFilter, VectorStore};
use tracing::warn;

use crate::sexpr::parse_principle_sexpr;

const SAMPLE_SIZE: usize = 50;
const MAX_PAIRS: usize = 10;

const SYSTEM_PROMPT: &str = "You compare one memory with a good outcome against one with a bad outcome. \
Respond with exactly one S-expression of the form \
(principle \"...\" confidence 0.xx reasoning \"...\") where the principle is a single \
behavioral rule of 10 to 25 words explaining the difference, and confidence is your \
self-reported confidence in [0, 1].";

#[derive(Debug, Clone)]
pub struct PrincipleCandidate {
    pub content: String,
    pub rating: f64,
    pub evidence_ids: Vec<MemoryId>,
    pub frequency: u32,
}

/// Summary of one extraction cycle, so an operator can tell *why* a cycle
/// produced few or no candidates rather than only seeing the final count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionStats {
    pub attempted: u32,
    pub accepted: u32,
    pub rejected_bad_length: u32,
    pub rejected_low_confidence: u32,
    pub rejected_unparseable: u32,
    pub call_failed: u32,
}

#[derive(Clone)]
pub struct CandidateDeps {
    pub store: Arc<dyn VectorStore>,
    pub llm: Arc<dyn LlmClient>,
}

pub async fn extract_candidates(
    deps: &CandidateDeps,
    token: &CancellationToken,
) -> CortexResult<(Vec<PrincipleCandidate>, ExtractionStats)> {
    let good = sample_by_outcome(deps, OutcomeTag::Good, token).await?;
    let bad = sample_by_outcome(deps, OutcomeTag::Bad, token).await?;

    let mut stats = ExtractionStats::default();
    if good.is_empty() || bad.is_empty() {
        return Ok((Vec::new(), stats));
    }

    let pair_count = good.len().min(bad.len()).min(MAX_PAIRS);
    let mut candidates = Vec::with_capacity(pair_count);

    for i in 0..pair_count {
        let good_memory = &good[i];
        let bad_memory = &bad[i];
        stats.attempted += 1;

        let prompt = format!(
            "Good outcome memory: \"{}\"\nBad outcome memory: \"{}\"",
            good_memory.content, bad_memory.content
        );
        let messages = [
            ChatMessage {
                role: ChatRole::System,
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: ChatRole::User,
                content: prompt,
            },
        ];

        let raw = match deps
            .llm
            .complete(&messages, 0.3, Duration::from_secs(DEFAULT_PRINCIPLE_TIMEOUT_SECS), token)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "contrastive extraction call failed, skipping pair");
                stats.call_failed += 1;
                continue;
            }
        };

        let Some(parsed) = parse_principle_sexpr(&raw) else {
            stats.rejected_unparseable += 1;
            continue;
        };

        let len = parsed.content.chars().count();
        if len < PRINCIPLE_CONTENT_LEN_RANGE.0 || len > PRINCIPLE_CONTENT_LEN_RANGE.1 {
            stats.rejected_bad_length += 1;
            continue;
        }
        if parsed.confidence < MIN_PRINCIPLE_CONFIDENCE {
            stats.rejected_low_confidence += 1;
            continue;
        }

        stats.accepted += 1;
        candidates.push(PrincipleCandidate {
            content: parsed.content,
            rating: parsed.confidence,
            evidence_ids: vec![good_memory.id.clone(), bad_memory.id.clone()],
            frequency: 1,
        });
    }

    Ok((candidates, stats))
}

async fn sample_by_outcome(
    deps: &CandidateDeps,
    outcome: OutcomeTag,
    token: &CancellationToken,
) -> CortexResult<Vec<strata_core::record::MemoryRecord>> {
    let filter = SearchFilter::new().with_must(FilterClause::new("outcome_tag", vec![outcome.as_str().to_string()]));
    let page = deps.store.scroll(&filter, ScrollCursor(None), SAMPLE_SIZE, token).await?;
    Ok(page.records)
}
