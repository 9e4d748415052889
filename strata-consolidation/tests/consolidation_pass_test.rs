use std::sync::Arc;

use strata_consolidation::{run_consolidation_pass, ConsolidationDeps};
use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::record::{MemoryRecord, Owner};
use strata_core::traits::VectorStore;
use test_fixtures::FakeVectorStore;

fn near_duplicate(importance: f64) -> MemoryRecord {
    let mut record = MemoryRecord::new("duplicated note".into(), Owner::Collective, importance);
    record.embedding = Some(vec![1.0, 0.0]);
    record
}

#[tokio::test]
async fn a_three_way_duplicate_cluster_collapses_to_one_survivor() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let low = near_duplicate(0.2);
    let mid = near_duplicate(0.5);
    let high = near_duplicate(0.9);
    let survivor_id = high.id.clone();
    let low_id = low.id.clone();
    let mid_id = mid.id.clone();

    for record in [&low, &mid, &high] {
        store.upsert(record, &token).await.unwrap();
    }

    let deps = ConsolidationDeps { store: store.clone() };
    let config = StrataConfig::default();

    let stats = run_consolidation_pass(&deps, &config, &token).await.unwrap();
    assert_eq!(stats[0].scanned, 3);
    assert_eq!(stats[0].clusters_found, 1);
    assert_eq!(stats[0].records_deleted, 2);

    assert!(store.get(&low_id, &token).await.unwrap().is_none());
    assert!(store.get(&mid_id, &token).await.unwrap().is_none());
    let survivor = store.get(&survivor_id, &token).await.unwrap().unwrap();
    assert_eq!(survivor.validation_count, 0);
    assert!(survivor.related_memories.contains(&low_id));
    assert!(survivor.related_memories.contains(&mid_id));
}

#[tokio::test]
async fn two_similar_records_are_below_the_minimum_cluster_size_and_survive() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let a = near_duplicate(0.5);
    let b = near_duplicate(0.5);
    store.upsert(&a, &token).await.unwrap();
    store.upsert(&b, &token).await.unwrap();

    let deps = ConsolidationDeps { store: store.clone() };
    let config = StrataConfig::default();

    let stats = run_consolidation_pass(&deps, &config, &token).await.unwrap();
    assert_eq!(stats[0].scanned, 2);
    assert_eq!(stats[0].clusters_found, 0);
    assert_eq!(stats[0].records_deleted, 0);
    assert_eq!(store.len().await, 2);
}
