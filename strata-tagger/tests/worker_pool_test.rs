use std::sync::Arc;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use strata_core::record::{MemoryRecord, OutcomeTag, Owner};
use strata_core::traits::VectorStore;
use strata_tagger::worker::{spawn_workers, TaggerDeps, TaggerWorkerConfig};
use strata_tagger::{TaggerQueue, TaggerStats};
use test_fixtures::{FakeEmbeddingClient, FakeLlmClient, FakeVectorStore};

fn config() -> TaggerWorkerConfig {
    TaggerWorkerConfig {
        pool_size: 2,
        llm_timeout: Duration::from_secs(5),
        max_retries: 3,
        retry_delay_base: Duration::from_millis(1),
    }
}

#[tokio::test]
async fn an_untagged_record_is_tagged_and_reembedded() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    let record = MemoryRecord::new("wrote a regression test before the fix".into(), Owner::Collective, 0.4);
    let id = record.id.clone();
    store.upsert(&record, &token).await.unwrap();

    let llm = Arc::new(FakeLlmClient::with_responses([
        r#"{"outcome": "good", "confidence": 0.95}"#,
        r#"["problem-solving", "technical", "learning"]"#,
    ]));
    let deps = TaggerDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm,
    };

    let stats = Arc::new(TaggerStats::new());
    let (queue, receiver) = TaggerQueue::with_capacity(8, stats.clone());
    let handle = spawn_workers(receiver, deps, stats, config());

    assert!(queue.enqueue(id.clone()));
    for _ in 0..200 {
        if handle.stats().processed == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let snapshot = handle.shutdown().await;
    assert_eq!(snapshot.processed, 1);
    assert_eq!(snapshot.failed, 0);

    let tagged = store.get(&id, &token).await.unwrap().unwrap();
    assert_eq!(tagged.outcome_tag, OutcomeTag::Good);
    assert!(tagged.concept_tags.contains(&"problem-solving".to_string()));
    assert!(tagged.embedding.is_some());
    assert_eq!(tagged.validation_count, 1);
}

#[tokio::test]
async fn an_already_tagged_record_is_skipped() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();
    let mut record = MemoryRecord::new("already classified".into(), Owner::Collective, 0.4);
    record.outcome_tag = OutcomeTag::Neutral;
    let id = record.id.clone();
    store.upsert(&record, &token).await.unwrap();

    let deps = TaggerDeps {
        store: store.clone(),
        embeddings: Arc::new(FakeEmbeddingClient::new(8)),
        llm: Arc::new(FakeLlmClient::new()),
    };

    let stats = Arc::new(TaggerStats::new());
    let (queue, receiver) = TaggerQueue::with_capacity(8, stats.clone());
    let handle = spawn_workers(receiver, deps, stats, config());

    assert!(queue.enqueue(id));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let snapshot = handle.shutdown().await;
    assert_eq!(snapshot.processed, 0);
    assert_eq!(snapshot.failed, 0);
}
