use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::record::{MemoryRecord, OutcomeTag, Owner};
use strata_core::traits::VectorStore;
use strata_principles::candidate::{extract_candidates, CandidateDeps};
use test_fixtures::{FakeLlmClient, FakeVectorStore};

fn tagged(content: &str, outcome: OutcomeTag) -> MemoryRecord {
    let mut record = MemoryRecord::new(content.into(), Owner::Collective, 0.4);
    record.outcome_tag = outcome;
    record
}

#[tokio::test]
async fn a_well_formed_reply_produces_one_rated_candidate() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    store.upsert(&tagged("wrote tests first", OutcomeTag::Good), &token).await.unwrap();
    store.upsert(&tagged("skipped tests", OutcomeTag::Bad), &token).await.unwrap();

    let llm = Arc::new(FakeLlmClient::with_responses([
        r#"(principle "always write a test before merging" confidence 0.9 reasoning "explains itself")"#,
    ]));
    let deps = CandidateDeps { store: store.clone(), llm };

    let (candidates, stats) = extract_candidates(&deps, &token).await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].content, "always write a test before merging");
    assert!((candidates[0].rating - 0.9).abs() < 1e-9);
    assert_eq!(candidates[0].evidence_ids.len(), 2);
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.accepted, 1);
}

#[tokio::test]
async fn no_candidates_are_extracted_without_both_outcome_classes() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    store.upsert(&tagged("wrote tests first", OutcomeTag::Good), &token).await.unwrap();

    let llm = Arc::new(FakeLlmClient::new());
    let deps = CandidateDeps { store: store.clone(), llm };

    let (candidates, stats) = extract_candidates(&deps, &token).await.unwrap();
    assert!(candidates.is_empty());
    assert_eq!(stats.attempted, 0);
}

#[tokio::test]
async fn a_low_confidence_reply_is_discarded() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    store.upsert(&tagged("wrote tests first", OutcomeTag::Good), &token).await.unwrap();
    store.upsert(&tagged("skipped tests", OutcomeTag::Bad), &token).await.unwrap();

    let llm = Arc::new(FakeLlmClient::with_responses([
        r#"(principle "always write a test before merging" confidence 0.1 reasoning "not confident")"#,
    ]));
    let deps = CandidateDeps { store: store.clone(), llm };

    let (candidates, stats) = extract_candidates(&deps, &token).await.unwrap();
    assert!(candidates.is_empty());
    assert_eq!(stats.rejected_low_confidence, 1);
}
