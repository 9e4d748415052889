//! Worker pool that drains the tagger queue (SPEC_FULL.md §4.3, §5).
//! Workers share one receiver; only one worker dequeues at a time, the
//! rest wait on the receiver's mutex. LLM calls retry up to 3 attempts
//! with linear backoff on retryable errors only; storage and embedding
//! calls are never retried here.

use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::constants::{
    DEFAULT_INITIAL_TRUST, DEFAULT_TAGGER_MAX_RETRIES, DEFAULT_TAGGER_RETRY_DELAY_SECS,
    DEFAULT_TAGGER_TIMEOUT_SECS, DEFAULT_TAGGER_WORKERS,
};
use strata_core::errors::CortexResult;
use strata_core::record::{MemoryId, OutcomeTag, RecordPatch};
use strata_core::traits::{EmbeddingClient, LlmClient, VectorStore};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, warn};

use crate::concepts::extract_concepts;
use crate::outcome::{analyze_outcome, OutcomeAnalysis};
use crate::queue::TaggerHandle;
use crate::stats::TaggerStats;

#[derive(Clone)]
pub struct TaggerDeps {
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub llm: Arc<dyn LlmClient>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaggerWorkerConfig {
    pub pool_size: usize,
    pub llm_timeout: Duration,
    pub max_retries: u32,
    pub retry_delay_base: Duration,
}

impl Default for TaggerWorkerConfig {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_TAGGER_WORKERS,
            llm_timeout: Duration::from_secs(DEFAULT_TAGGER_TIMEOUT_SECS),
            max_retries: DEFAULT_TAGGER_MAX_RETRIES,
            retry_delay_base: Duration::from_secs(DEFAULT_TAGGER_RETRY_DELAY_SECS),
        }
    }
}

pub fn spawn_workers(
    receiver: mpsc::Receiver<MemoryId>,
    deps: TaggerDeps,
    stats: Arc<TaggerStats>,
    config: TaggerWorkerConfig,
) -> TaggerHandle {
    let token = CancellationToken::new();
    let receiver = Arc::new(Mutex::new(receiver));
    let mut joins = Vec::with_capacity(config.pool_size);

    for worker_id in 0..config.pool_size {
        let receiver = receiver.clone();
        let deps = deps.clone();
        let stats = stats.clone();
        let token = token.clone();

        joins.push(tokio::spawn(async move {
            stats.worker_started();
            loop {
                let next = {
                    let mut rx = receiver.lock().await;
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => None,
                        id = rx.recv() => id,
                    }
                };
                let Some(id) = next else { break };

                match run_once(&id, &deps, &config, &token).await {
                    Ok(Some(())) => stats.record_processed(),
                    Ok(None) => debug!(worker_id, id = %id.0, "skipped: already tagged or gone"),
                    Err(e) => {
                        warn!(worker_id, id = %id.0, error = %e, "tag attempt failed");
                        stats.record_failed();
                    }
                }
            }
            stats.worker_stopped();
        }));
    }

    TaggerHandle { token, joins, stats }
}

async fn run_once(
    id: &MemoryId,
    deps: &TaggerDeps,
    config: &TaggerWorkerConfig,
    token: &CancellationToken,
) -> CortexResult<Option<()>> {
    let Some(record) = deps.store.get(id, token).await? else {
        return Ok(None);
    };
    if record.outcome_tag != OutcomeTag::Unset {
        return Ok(None);
    }

    let outcome = retry_outcome(deps.llm.as_ref(), &record.content, config, token).await?;
    let concepts = retry_concepts(deps.llm.as_ref(), &record.content, config, token).await?;

    if record.embedding.is_none() {
        let embedding = deps.embeddings.embed(&record.content, token).await?;
        let mut reembedded = record.clone();
        reembedded.embedding = Some(embedding);
        deps.store.upsert(&reembedded, token).await?;
    }

    let patch = RecordPatch::Tagged {
        outcome_tag: outcome.outcome,
        concept_tags: concepts,
        trust_score: DEFAULT_INITIAL_TRUST,
        validation_count: 1,
    };
    deps.store.patch(id, patch, token).await?;
    Ok(Some(()))
}

async fn retry_outcome(
    llm: &dyn LlmClient,
    content: &str,
    config: &TaggerWorkerConfig,
    token: &CancellationToken,
) -> CortexResult<OutcomeAnalysis> {
    let mut attempt = 1;
    loop {
        match analyze_outcome(llm, content, config.llm_timeout, token).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                backoff(attempt, config.retry_delay_base, token).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn retry_concepts(
    llm: &dyn LlmClient,
    content: &str,
    config: &TaggerWorkerConfig,
    token: &CancellationToken,
) -> CortexResult<Vec<String>> {
    let mut attempt = 1;
    loop {
        match extract_concepts(llm, content, config.llm_timeout, token).await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < config.max_retries => {
                backoff(attempt, config.retry_delay_base, token).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn backoff(attempt: u32, base: Duration, token: &CancellationToken) {
    let delay = base * attempt;
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = token.cancelled() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_defaults() {
        let config = TaggerWorkerConfig::default();
        assert_eq!(config.pool_size, DEFAULT_TAGGER_WORKERS);
        assert_eq!(config.max_retries, DEFAULT_TAGGER_MAX_RETRIES);
    }
}
