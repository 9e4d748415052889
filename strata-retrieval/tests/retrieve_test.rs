use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::record::{MemoryRecord, Owner};
use strata_core::traits::VectorStore;
use strata_linker::CoOccurrenceTracker;
use strata_retrieval::{retrieve, RetrievalDeps, RetrievalQuery};
use test_fixtures::embedding::hash_embed;
use test_fixtures::{FakeEmbeddingClient, FakeVectorStore};

fn query(text: &str) -> RetrievalQuery {
    RetrievalQuery {
        text: text.to_string(),
        owner_user_id: "u1".into(),
        include_personal: true,
        include_collective: true,
        tier: None,
        outcome: None,
        concept_tags: vec![],
        limit: 5,
        min_score: 0.0,
        good_behavior_bias: 0.0,
    }
}

#[tokio::test]
async fn retrieve_returns_the_closest_visible_record() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let mut mine = MemoryRecord::new("retry backoff configuration notes".into(), Owner::Personal("u1".into()), 0.5);
    mine.embedding = Some(hash_embed("retry backoff", 8));
    let mut other = MemoryRecord::new("unrelated gardening tips".into(), Owner::Personal("u2".into()), 0.5);
    other.embedding = Some(hash_embed("gardening", 8));

    let mine_id = mine.id.clone();
    store.upsert(&mine, &token).await.unwrap();
    store.upsert(&other, &token).await.unwrap();

    let deps = RetrievalDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        co_occurrence: Arc::new(CoOccurrenceTracker::new(store.clone(), 3600)),
    };

    let mut q = query("retry backoff");
    q.include_collective = false;
    let results = retrieve(&deps, &q, &token).await.unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].record.id, mine_id);
}

#[tokio::test]
async fn a_user_without_visibility_into_either_side_sees_nothing() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let mut record = MemoryRecord::new("some note".into(), Owner::Personal("u2".into()), 0.5);
    record.embedding = Some(hash_embed("some note", 8));
    store.upsert(&record, &token).await.unwrap();

    let deps = RetrievalDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        co_occurrence: Arc::new(CoOccurrenceTracker::new(store.clone(), 3600)),
    };

    let mut q = query("some note");
    q.include_personal = false;
    q.include_collective = false;
    let results = retrieve(&deps, &q, &token).await.unwrap();

    assert!(results.is_empty());
}
