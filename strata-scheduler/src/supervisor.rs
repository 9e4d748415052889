//! Worker lifecycle supervisor (SPEC_FULL.md §4.9): starts the tagger
//! queue, the decay worker, the linker worker, and the principle worker,
//! each with its own cancellation token, and coordinates a single
//! graceful shutdown across all of them. The consolidator has no
//! schedule option of its own in configuration, so it rides the decay
//! worker's ticker — the two are both tier-maintenance passes over the
//! same records and a decay cycle is the natural point to also collapse
//! duplicates it may have just exposed (see DESIGN.md).

use std::sync::Arc;
use std::time::Duration;

use strata_consolidation::{run_consolidation_pass, ConsolidationDeps};
use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::errors::CortexResult;
use strata_core::traits::{EmbeddingClient, LlmClient, PrincipleStore, VectorStore};
use strata_decay::{run_compress_pass, DecayDeps};
use strata_linker::{run_similarity_linking, LinkerDeps};
use strata_observability::health::reporter::HealthSnapshot;
use strata_observability::metrics::MetricsCollector;
use strata_principles::{
    extract_candidates, run_evolution, run_identity_evolution, CandidateDeps, EvolutionDeps, IdentityDeps,
};
use strata_storage::client::VectorStoreConfig;
use strata_tagger::queue::{TaggerHandle, TaggerQueue};
use strata_tagger::stats::TaggerStats;
use strata_tagger::worker::{spawn_workers, TaggerDeps, TaggerWorkerConfig};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::ticker::spawn_periodic;

/// Everything the supervisor needs to construct and wire up every
/// worker. All fields are trait objects except the two concrete HTTP
/// configs needed for one-time startup bootstrap.
#[derive(Clone)]
pub struct SupervisorDeps {
    pub store: Arc<dyn VectorStore>,
    pub embeddings: Arc<dyn EmbeddingClient>,
    pub llm: Arc<dyn LlmClient>,
    pub principle_store: Arc<dyn PrincipleStore>,
    pub vector_store_config: VectorStoreConfig,
}

/// A running set of background workers. Drop does not stop them —
/// call `shutdown` explicitly for a graceful stop with a final report.
pub struct Supervisor {
    tagger_queue: TaggerQueue,
    tagger_handle: TaggerHandle,
    decay_token: CancellationToken,
    decay_join: JoinHandle<()>,
    linker_token: CancellationToken,
    linker_join: JoinHandle<()>,
    principle_token: CancellationToken,
    principle_join: JoinHandle<()>,
    metrics: Arc<Mutex<MetricsCollector>>,
}

#[derive(Debug, Default, Clone)]
pub struct SupervisorShutdownReport {
    pub tagger: strata_tagger::stats::TaggerStatsSnapshot,
    pub metrics: MetricsCollector,
}

impl Supervisor {
    /// Ensure the vector-store collection exists, then start every
    /// periodic worker. Each ticker's first run fires immediately; later
    /// runs wait out its configured period (§4.4's rule, applied to all
    /// three tickers per DESIGN.md).
    pub async fn start(deps: SupervisorDeps, config: StrataConfig) -> CortexResult<Self> {
        let startup_token = CancellationToken::new();
        strata_storage::collection::ensure_collection(
            &reqwest::Client::new(),
            &deps.vector_store_config,
            &startup_token,
        )
        .await?;

        let metrics = Arc::new(Mutex::new(MetricsCollector::new()));

        let tagger_stats = Arc::new(TaggerStats::new());
        let (tagger_queue, receiver) = TaggerQueue::with_capacity(config.tagger.queue_size, tagger_stats.clone());
        let tagger_handle = spawn_workers(
            receiver,
            TaggerDeps {
                store: deps.store.clone(),
                embeddings: deps.embeddings.clone(),
                llm: deps.llm.clone(),
            },
            tagger_stats,
            TaggerWorkerConfig {
                pool_size: config.tagger.workers,
                llm_timeout: Duration::from_secs(config.tagger.base_timeout_secs),
                max_retries: config.tagger.max_retries,
                retry_delay_base: Duration::from_secs(config.tagger.retry_delay_secs),
            },
        );

        let decay_token = CancellationToken::new();
        let decay_join = spawn_decay_ticker(deps.clone(), config.clone(), decay_token.clone(), metrics.clone());

        let linker_token = CancellationToken::new();
        let linker_join = spawn_linker_ticker(deps.clone(), config.clone(), linker_token.clone(), metrics.clone());

        let principle_token = CancellationToken::new();
        let principle_join =
            spawn_principle_ticker(deps.clone(), config.clone(), principle_token.clone(), metrics.clone());

        Ok(Self {
            tagger_queue,
            tagger_handle,
            decay_token,
            decay_join,
            linker_token,
            linker_join,
            principle_token,
            principle_join,
            metrics,
        })
    }

    /// Handle callers use to enqueue newly-ingested memories for tagging.
    pub fn tagger_queue(&self) -> &TaggerQueue {
        &self.tagger_queue
    }

    /// Snapshot of worker health for observability. Service-reachability
    /// flags are left to the caller to fill in from its own probes.
    pub async fn health_snapshot(&self) -> HealthSnapshot {
        let tagger_stats = self.tagger_handle.stats();
        let metrics = self.metrics.lock().await;
        HealthSnapshot {
            tagger_queue_depth: self.tagger_queue.depth(),
            tagger_queue_capacity: self.tagger_queue.capacity(),
            tagger_dropped_total: tagger_stats.dropped,
            decay_failed_total: metrics.decay.failed,
            linker_failed_total: metrics.linker.failed,
            consolidation_failed_total: 0,
            embedding_service_healthy: true,
            llm_service_healthy: true,
        }
    }

    /// Signal every worker to stop, wait for each to join, then return a
    /// final stats snapshot. Workers are restartable: calling `start`
    /// again with the same deps resumes from a clean state.
    pub async fn shutdown(self) -> SupervisorShutdownReport {
        self.decay_token.cancel();
        self.linker_token.cancel();
        self.principle_token.cancel();

        let tagger = self.tagger_handle.shutdown().await;
        let _ = self.decay_join.await;
        let _ = self.linker_join.await;
        let _ = self.principle_join.await;

        let metrics = *self.metrics.lock().await;
        info!("scheduler: all workers stopped");
        SupervisorShutdownReport { tagger, metrics }
    }
}

fn spawn_decay_ticker(
    deps: SupervisorDeps,
    config: StrataConfig,
    token: CancellationToken,
    metrics: Arc<Mutex<MetricsCollector>>,
) -> JoinHandle<()> {
    let period = Duration::from_secs(config.decay_schedule_hours * 3600);
    let decay_deps = DecayDeps {
        store: deps.store.clone(),
        embeddings: deps.embeddings.clone(),
        llm: deps.llm.clone(),
    };
    let consolidation_deps = ConsolidationDeps {
        store: deps.store.clone(),
    };
    spawn_periodic(period, token.clone(), move || {
        let decay_deps = decay_deps.clone();
        let consolidation_deps = consolidation_deps.clone();
        let config = config.clone();
        let token = token.clone();
        let metrics = metrics.clone();
        async move {
            match run_compress_pass(&decay_deps, &config, &token).await {
                Ok(stats) => {
                    let mut m = metrics.lock().await;
                    for s in stats {
                        m.decay
                            .record(s.scanned as u64, s.eligible as u64, s.compressed as u64, s.failed as u64);
                    }
                }
                Err(e) => warn!(error = %e, "decay compress pass failed"),
            }

            match run_consolidation_pass(&consolidation_deps, &config, &token).await {
                Ok(stats) => {
                    let mut m = metrics.lock().await;
                    for s in stats {
                        m.consolidation
                            .record(s.scanned as u64, s.clusters_found as u64, s.records_deleted as u64);
                    }
                }
                Err(e) => warn!(error = %e, "consolidation pass failed"),
            }
        }
    })
}

fn spawn_linker_ticker(
    deps: SupervisorDeps,
    config: StrataConfig,
    token: CancellationToken,
    metrics: Arc<Mutex<MetricsCollector>>,
) -> JoinHandle<()> {
    let period = Duration::from_secs(config.linker_schedule_hours * 3600);
    let linker_deps = LinkerDeps { store: deps.store.clone() };
    spawn_periodic(period, token.clone(), move || {
        let linker_deps = linker_deps.clone();
        let config = config.clone();
        let token = token.clone();
        let metrics = metrics.clone();
        async move {
            match run_similarity_linking(&linker_deps, &config, &token).await {
                Ok(stats) => {
                    let mut m = metrics.lock().await;
                    for s in stats {
                        m.linker.record(s.scanned as u64, s.linked as u64, s.failed as u64);
                    }
                }
                Err(e) => warn!(error = %e, "similarity linking pass failed"),
            }
        }
    })
}

fn spawn_principle_ticker(
    deps: SupervisorDeps,
    config: StrataConfig,
    token: CancellationToken,
    metrics: Arc<Mutex<MetricsCollector>>,
) -> JoinHandle<()> {
    let period = Duration::from_secs(config.principle_schedule_hours * 3600);
    let candidate_deps = CandidateDeps {
        store: deps.store.clone(),
        llm: deps.llm.clone(),
    };
    let evolution_deps = EvolutionDeps {
        embeddings: deps.embeddings.clone(),
        llm: deps.llm.clone(),
        principle_store: deps.principle_store.clone(),
    };
    let identity_deps = IdentityDeps {
        store: deps.store.clone(),
        embeddings: deps.embeddings.clone(),
        llm: deps.llm.clone(),
        principle_store: deps.principle_store.clone(),
    };
    spawn_periodic(period, token.clone(), move || {
        let candidate_deps = candidate_deps.clone();
        let evolution_deps = evolution_deps.clone();
        let identity_deps = identity_deps.clone();
        let token = token.clone();
        let metrics = metrics.clone();
        async move {
            let (candidates, extraction_stats) = match extract_candidates(&candidate_deps, &token).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "principle candidate extraction failed");
                    return;
                }
            };
            info!(
                attempted = extraction_stats.attempted,
                accepted = extraction_stats.accepted,
                rejected_bad_length = extraction_stats.rejected_bad_length,
                rejected_low_confidence = extraction_stats.rejected_low_confidence,
                rejected_unparseable = extraction_stats.rejected_unparseable,
                call_failed = extraction_stats.call_failed,
                "principle candidate extraction cycle complete"
            );

            {
                let mut m = metrics.lock().await;
                m.principles.record_candidates(candidates.len() as u64);
            }

            match run_evolution(&evolution_deps, candidates, &token).await {
                Ok(outcomes) => {
                    let mut m = metrics.lock().await;
                    for outcome in outcomes {
                        match outcome {
                            strata_principles::EvolutionOutcome::NewConcept { .. } => m.principles.record_new_concept(),
                            strata_principles::EvolutionOutcome::Merged { .. } => m.principles.record_merge(),
                            strata_principles::EvolutionOutcome::Replaced { .. } => m.principles.record_replace(),
                            strata_principles::EvolutionOutcome::Discarded => m.principles.record_discard(),
                            strata_principles::EvolutionOutcome::NoChange => {}
                        }
                    }
                }
                Err(e) => warn!(error = %e, "principle evolution failed"),
            }

            match run_identity_evolution(&identity_deps, &token).await {
                Ok(strata_principles::IdentityOutcome::Updated { .. }) => {
                    let mut m = metrics.lock().await;
                    m.principles.record_identity_update();
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "identity evolution failed"),
            }
        }
    })
}
