use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::record::MemoryId;
use strata_principles::candidate::PrincipleCandidate;
use strata_principles::evolution::{run_evolution, EvolutionDeps, EvolutionOutcome};
use test_fixtures::{FakeEmbeddingClient, FakeLlmClient, FakePrincipleStore};

fn candidate(content: &str, rating: f64) -> PrincipleCandidate {
    PrincipleCandidate {
        content: content.to_string(),
        rating,
        evidence_ids: vec![MemoryId::new(), MemoryId::new()],
        frequency: 1,
    }
}

#[tokio::test]
async fn first_candidate_fills_the_lowest_empty_engine_slot() {
    let principle_store = Arc::new(FakePrincipleStore::new());
    let deps = EvolutionDeps {
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::new()),
        principle_store: principle_store.clone(),
    };
    let token = CancellationToken::new();

    let outcomes = run_evolution(&deps, vec![candidate("always review before merging", 0.8)], &token)
        .await
        .unwrap();

    assert_eq!(outcomes, vec![EvolutionOutcome::NewConcept { slot: 4 }]);
    let table = principle_store.snapshot().await;
    assert_eq!(table.get(4).unwrap().content, "always review before merging");
}

#[tokio::test]
async fn a_near_identical_candidate_merges_into_the_existing_slot() {
    let principle_store = Arc::new(FakePrincipleStore::new());
    let deps = EvolutionDeps {
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::with_responses(["always review before merging code"])),
        principle_store: principle_store.clone(),
    };
    let token = CancellationToken::new();

    run_evolution(&deps, vec![candidate("always review before merging", 0.8)], &token)
        .await
        .unwrap();
    let outcomes = run_evolution(&deps, vec![candidate("always review before merging", 0.85)], &token)
        .await
        .unwrap();

    assert_eq!(outcomes, vec![EvolutionOutcome::Merged { slot: 4 }]);
}
