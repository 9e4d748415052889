use std::sync::Arc;

use strata_core::cancel::CancellationToken;
use strata_core::config::StrataConfig;
use strata_core::record::{MemoryRecord, Owner};
use strata_core::traits::VectorStore;
use strata_linker::{run_similarity_linking, LinkerDeps};
use test_fixtures::embedding::hash_embed;
use test_fixtures::FakeVectorStore;

#[tokio::test]
async fn near_duplicate_records_in_the_same_tier_get_linked() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let mut a = MemoryRecord::new("how to configure the retry backoff".into(), Owner::Collective, 0.3);
    a.embedding = Some(hash_embed("retry backoff", 8));
    let mut b = MemoryRecord::new("notes on retry backoff configuration".into(), Owner::Collective, 0.3);
    b.embedding = Some(hash_embed("retry backoff", 8));

    let a_id = a.id.clone();
    let b_id = b.id.clone();
    store.upsert(&a, &token).await.unwrap();
    store.upsert(&b, &token).await.unwrap();

    let deps = LinkerDeps { store: store.clone() };
    let mut config = StrataConfig::default();
    config.similarity_threshold = 0.5;

    let stats = run_similarity_linking(&deps, &config, &token).await.unwrap();
    assert_eq!(stats[0].scanned, 2);
    assert_eq!(stats[0].linked, 2);

    let updated_a = store.get(&a_id, &token).await.unwrap().unwrap();
    assert!(updated_a.related_memories.contains(&b_id));
    let updated_b = store.get(&b_id, &token).await.unwrap().unwrap();
    assert!(updated_b.related_memories.contains(&a_id));
}

#[tokio::test]
async fn records_already_at_the_link_cap_are_scanned_but_not_relinked() {
    let store = Arc::new(FakeVectorStore::new());
    let token = CancellationToken::new();

    let mut config = StrataConfig::default();
    config.max_links_per_memory = 1;
    config.similarity_threshold = 0.5;

    let mut a = MemoryRecord::new("alpha".into(), Owner::Collective, 0.3);
    a.embedding = Some(hash_embed("shared-topic", 8));
    let mut b = MemoryRecord::new("beta".into(), Owner::Collective, 0.3);
    b.embedding = Some(hash_embed("shared-topic", 8));
    a.related_memories = vec![b.id.clone()];

    store.upsert(&a, &token).await.unwrap();
    store.upsert(&b, &token).await.unwrap();

    let deps = LinkerDeps { store: store.clone() };
    let stats = run_similarity_linking(&deps, &config, &token).await.unwrap();

    assert_eq!(stats[0].scanned, 2);
    assert_eq!(stats[0].linked, 1, "only b, which had room, should be patched");
}
