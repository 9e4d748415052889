use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::record::{MemoryRecord, OutcomeTag, Owner};
use strata_core::traits::VectorStore;
use strata_principles::identity::{run_identity_evolution, IdentityDeps, IdentityOutcome};
use test_fixtures::{FakeEmbeddingClient, FakeLlmClient, FakePrincipleStore, FakeVectorStore};

fn good_memory(content: &str) -> MemoryRecord {
    let mut record = MemoryRecord::new(content.into(), Owner::Collective, 0.5);
    record.outcome_tag = OutcomeTag::Good;
    record.concept_tags = vec!["learning".into()];
    record.embedding = Some(test_fixtures::embedding::hash_embed(content, 8));
    record
}

#[tokio::test]
async fn insufficient_evidence_when_the_store_is_nearly_empty() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    store.upsert(&good_memory("first lesson"), &token).await.unwrap();

    let deps = IdentityDeps {
        store,
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::new()),
        principle_store: Arc::new(FakePrincipleStore::new()),
    };

    let outcome = run_identity_evolution(&deps, &token).await.unwrap();
    assert!(matches!(outcome, IdentityOutcome::InsufficientEvidence { evidence_count: 1 }));
}

#[tokio::test]
async fn a_confident_proposal_that_differs_updates_the_identity_slot() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    for i in 0..5 {
        store.upsert(&good_memory(&format!("lesson {i}")), &token).await.unwrap();
    }

    let llm = Arc::new(FakeLlmClient::with_responses([
        r#"(principle "a careful, test-driven collaborator" confidence 0.9 reasoning "evidence supports it")"#,
    ]));
    let principle_store = Arc::new(FakePrincipleStore::new());
    let deps = IdentityDeps {
        store,
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm,
        principle_store: principle_store.clone(),
    };

    let outcome = run_identity_evolution(&deps, &token).await.unwrap();
    assert_eq!(
        outcome,
        IdentityOutcome::Updated {
            new_identity: "a careful, test-driven collaborator".to_string()
        }
    );

    let table = principle_store.snapshot().await;
    assert_eq!(table.get(0).unwrap().content, "a careful, test-driven collaborator");
}
