//! Identity evolution (SPEC_FULL.md §4.8): a separate, slower routine that
//! only ever touches slot 0. Evidence is gathered over two channels —
//! semantic search against a fixed set of identity queries, and a
//! filtered scroll over good-outcome memories tagged with a
//! self-knowledge-adjacent concept — then a large LLM proposes a new
//! identity string, accepted only above a confidence floor and only when
//! it actually changes anything.

use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::constants::{
    DEFAULT_PRINCIPLE_TIMEOUT_SECS, IDENTITY_SLOT, MAX_IDENTITY_LEN, MIN_IDENTITY_CONFIDENCE,
    MIN_IDENTITY_EVIDENCE,
};
use strata_core::errors::CortexResult;
use strata_core::record::{MemoryRecord, OutcomeTag};
use strata_core::traits::{
    ChatMessage, ChatRole, EmbeddingClient, FilterClause, LlmClient, PrincipleStore, ScrollCursor,
    SearchFilter, VectorStore,
};
use tracing::info;

const IDENTITY_QUERIES: &[&str] = &[
    "Who am I and what defines my personality?",
    "What are my core values and principles?",
    "How do I typically approach problems?",
    "What have I learned about myself recently?",
    "What is my purpose in these conversations?",
];

const SELF_KNOWLEDGE_CONCEPTS: &[&str] = &["learning", "self-knowledge", "strategy"];

const EVIDENCE_SEARCH_LIMIT: usize = 10;
const EVIDENCE_SCROLL_LIMIT: usize = 25;

const SYSTEM_PROMPT: &str = "You are refining a conversational agent's self-identity description \
from evidence of its recent good-outcome behavior. Propose an identity string of 200 characters \
or fewer, along with your confidence in [0, 1] that this is an improvement over the current one. \
Respond with exactly one S-expression of the form \
(principle \"...\" confidence 0.xx reasoning \"...\").";

#[derive(Clone)]
pub struct IdentityDeps {
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub llm: Arc<dyn LlmClient>,
    pub principle_store: Arc<dyn PrincipleStore>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdentityOutcome {
    Updated { new_identity: String },
    ValidatedUnchanged,
    InsufficientEvidence { evidence_count: usize },
    RejectedLowConfidence,
}

pub async fn run_identity_evolution(
    deps: &IdentityDeps,
    token: &CancellationToken,
) -> CortexResult<IdentityOutcome> {
    let evidence = gather_evidence(deps, token).await?;
    if evidence.len() < MIN_IDENTITY_EVIDENCE {
        return Ok(IdentityOutcome::InsufficientEvidence {
            evidence_count: evidence.len(),
        });
    }

    let table = deps.principle_store.load_all().await?;
    let current_identity = table
        .get(IDENTITY_SLOT)
        .map(|s| s.content.clone())
        .unwrap_or_default();

    let evidence_text = evidence
        .iter()
        .map(|r| format!("- {}", r.content))
        .collect::<Vec<_>>()
        .join("\n");
    let prompt = format!(
        "Current identity: \"{current_identity}\"\n\nRecent evidence of good-outcome behavior:\n{evidence_text}"
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
    let raw = deps
        .llm
        .complete(&messages, 0.4, Duration::from_secs(DEFAULT_PRINCIPLE_TIMEOUT_SECS), token)
        .await?;

    let Some(parsed) = crate::sexpr::parse_principle_sexpr(&raw) else {
        return Ok(IdentityOutcome::RejectedLowConfidence);
    };

    let proposed: String = parsed.content.chars().take(MAX_IDENTITY_LEN).collect();

    if parsed.confidence < MIN_IDENTITY_CONFIDENCE {
        bump_validation_only(deps).await?;
        return Ok(IdentityOutcome::RejectedLowConfidence);
    }

    if proposed == current_identity {
        bump_validation_only(deps).await?;
        return Ok(IdentityOutcome::ValidatedUnchanged);
    }

    let mut table = table;
    table.rate_only(IDENTITY_SLOT, Some(parsed.confidence))?;
    let mut entry = table
        .get(IDENTITY_SLOT)
        .cloned()
        .expect("identity slot always present");
    entry.content = proposed.clone();
    deps.principle_store.save_slot(&entry).await?;

    info!(new_identity = %proposed, confidence = parsed.confidence, "identity slot updated");
    Ok(IdentityOutcome::Updated {
        new_identity: proposed,
    })
}

async fn bump_validation_only(deps: &IdentityDeps) -> CortexResult<()> {
    let mut table = deps.principle_store.load_all().await?;
    table.rate_only(IDENTITY_SLOT, None)?;
    let entry = table.get(IDENTITY_SLOT).expect("identity slot always present");
    deps.principle_store.save_slot(entry).await
}

async fn gather_evidence(deps: &IdentityDeps, token: &CancellationToken) -> CortexResult<Vec<MemoryRecord>> {
    let mut evidence = Vec::new();

    for query in IDENTITY_QUERIES {
        let query_vector = deps.embeddings.embed(query, token).await?;
        let results = deps
            .store
            .search(&query_vector, &SearchFilter::new(), EVIDENCE_SEARCH_LIMIT, token)
            .await?;
        evidence.extend(results.into_iter().map(|r| r.record));
    }

    let concept_filter = SELF_KNOWLEDGE_CONCEPTS
        .iter()
        .fold(SearchFilter::new(), |f, concept| {
            f.with_should(FilterClause::new("concept_tags", vec![concept.to_string()]))
        })
        .with_must(FilterClause::new(
            "outcome_tag",
            vec![OutcomeTag::Good.as_str().to_string()],
        ));
    let page = deps
        .store
        .scroll(&concept_filter, ScrollCursor(None), EVIDENCE_SCROLL_LIMIT, token)
        .await?;
    evidence.extend(page.records);

    evidence.sort_by(|a, b| a.id.0.cmp(&b.id.0));
    evidence.dedup_by(|a, b| a.id == b.id);

    Ok(evidence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_queries_are_non_empty_and_within_count() {
        assert!(!IDENTITY_QUERIES.is_empty());
        assert!(IDENTITY_QUERIES.len() < MIN_IDENTITY_EVIDENCE * 3);
    }
}
