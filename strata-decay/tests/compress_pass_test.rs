use std::sync::Arc;

use chrono::{Duration, Utc};
use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::record::{MemoryRecord, Owner, Tier};
use strata_core::traits::VectorStore;
use strata_decay::worker::{run_compress_pass, DecayDeps};
use test_fixtures::{FakeEmbeddingClient, FakeLlmClient, FakeVectorStore};

fn aged_record(content: &str, days_old: i64) -> MemoryRecord {
    let mut record = MemoryRecord::new(content.into(), Owner::Collective, 0.1);
    record.created_at = Utc::now() - Duration::days(days_old);
    record.embedding = Some(vec![0.1; 8]);
    record
}

#[tokio::test]
async fn eligible_recent_memories_compress_into_the_medium_tier() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    let old = aged_record("a long story about a bug fix", 20);
    let id = old.id.clone();
    store.upsert(&old, &token).await.unwrap();

    let deps = DecayDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::new().with_default("compressed summary")),
    };
    let config = StrataConfig::default();

    let stats = run_compress_pass(&deps, &config, &token).await.unwrap();

    assert_eq!(stats[0].scanned, 1);
    assert_eq!(stats[0].eligible, 1);
    assert_eq!(stats[0].compressed, 1);

    let updated = store.get(&id, &token).await.unwrap().unwrap();
    assert_eq!(updated.tier, Tier::Medium);
    assert_eq!(updated.content, "compressed summary");
    assert_eq!(updated.compressed_from.as_deref(), Some("a long story about a bug fix"));
}

#[tokio::test]
async fn fresh_memories_are_scanned_but_not_compressed() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    let fresh = aged_record("just happened", 0);
    store.upsert(&fresh, &token).await.unwrap();

    let deps = DecayDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::new()),
    };
    let config = StrataConfig::default();

    let stats = run_compress_pass(&deps, &config, &token).await.unwrap();
    assert_eq!(stats[0].scanned, 1);
    assert_eq!(stats[0].eligible, 0);
    assert_eq!(stats[0].compressed, 0);
}
