//! In-memory [`VectorStore`] double. Holds records in an ordinary
//! `HashMap` behind a `tokio::sync::Mutex` and evaluates filters the same
//! way `strata-storage::filter::to_wire_filter` describes them: an
//! AND-of-must combined with an OR-of-should, one clause matching if the
//! record's value for that field is any of the clause's values.

use std::collections::HashMap;

use async_trait::async_trait;
use strata_core::cancel::CancellationToken;
use strata_core::errors::{CortexError, CortexResult};
use strata_core::record::{MemoryId, MemoryRecord, RecordPatch};
use strata_core::traits::{FilterClause, ScoredRecord, ScrollCursor, ScrollPage, SearchFilter, VectorStore};
use tokio::sync::Mutex;

#[derive(Default)]
pub struct FakeVectorStore {
    records: Mutex<HashMap<String, MemoryRecord>>,
}

impl FakeVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with records, as a test's arrange step would.
    pub fn with_records(records: impl IntoIterator<Item = MemoryRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.id.0.clone(), r)).collect();
        Self { records: Mutex::new(map) }
    }

    /// Snapshot every record currently held, for assertions after a pass runs.
    pub async fn all_records(&self) -> Vec<MemoryRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

fn field_value(record: &MemoryRecord, field: &str) -> Option<Vec<String>> {
    match field {
        "tier" => Some(vec![record.tier.as_str().to_string()]),
        "user_id" => record.owner.user_id().map(|id| vec![id.to_string()]),
        "is_collective" => Some(vec![record.owner.is_collective().to_string()]),
        "outcome_tag" => Some(vec![record.outcome_tag.as_str().to_string()]),
        "concept_tags" => Some(record.concept_tags.clone()),
        _ => None,
    }
}

fn clause_matches(record: &MemoryRecord, clause: &FilterClause) -> bool {
    match field_value(record, &clause.field) {
        Some(values) => values.iter().any(|v| clause.values.contains(v)),
        None => false,
    }
}

fn record_matches(record: &MemoryRecord, filter: &SearchFilter) -> bool {
    let must_ok = filter.must.iter().all(|c| clause_matches(record, c));
    let should_ok = filter.should.is_empty() || filter.should.iter().any(|c| clause_matches(record, c));
    must_ok && should_ok
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

#[async_trait]
impl VectorStore for FakeVectorStore {
    async fn upsert(&self, record: &MemoryRecord, token: &CancellationToken) -> CortexResult<()> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        let mut record = record.clone();
        record.sanitize_utf8();
        self.records.lock().await.insert(record.id.0.clone(), record);
        Ok(())
    }

    async fn get(&self, id: &MemoryId, token: &CancellationToken) -> CortexResult<Option<MemoryRecord>> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        Ok(self.records.lock().await.get(&id.0).cloned())
    }

    async fn get_batch(
        &self,
        ids: &[MemoryId],
        token: &CancellationToken,
    ) -> CortexResult<Vec<MemoryRecord>> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        let guard = self.records.lock().await;
        Ok(ids.iter().filter_map(|id| guard.get(&id.0).cloned()).collect())
    }

    async fn scroll(
        &self,
        filter: &SearchFilter,
        cursor: ScrollCursor,
        limit: usize,
        token: &CancellationToken,
    ) -> CortexResult<ScrollPage> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        let guard = self.records.lock().await;
        let mut matching: Vec<&MemoryRecord> = guard.values().filter(|r| record_matches(r, filter)).collect();
        matching.sort_by(|a, b| a.id.0.cmp(&b.id.0));

        let offset: usize = cursor.0.as_deref().and_then(|s| s.parse().ok()).unwrap_or(0);
        let page: Vec<MemoryRecord> = matching.iter().skip(offset).take(limit).map(|r| (*r).clone()).collect();
        let next = if offset + page.len() < matching.len() {
            ScrollCursor(Some((offset + page.len()).to_string()))
        } else {
            ScrollCursor(None)
        };
        Ok(ScrollPage { records: page, next })
    }

    async fn search(
        &self,
        query_vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
        token: &CancellationToken,
    ) -> CortexResult<Vec<ScoredRecord>> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        if limit == 0 {
            return Ok(Vec::new());
        }
        let guard = self.records.lock().await;
        let mut scored: Vec<ScoredRecord> = guard
            .values()
            .filter(|r| record_matches(r, filter))
            .filter_map(|r| {
                let embedding = r.embedding.as_ref()?;
                Some(ScoredRecord {
                    record: r.clone(),
                    score: cosine_similarity(query_vector, embedding),
                })
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn patch(&self, id: &MemoryId, patch: RecordPatch, token: &CancellationToken) -> CortexResult<()> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        let mut guard = self.records.lock().await;
        let record = guard
            .get_mut(&id.0)
            .ok_or_else(|| CortexError::NotFound(id.0.clone()))?;
        match patch {
            RecordPatch::Tagged {
                outcome_tag,
                concept_tags,
                trust_score,
                validation_count,
            } => {
                record.outcome_tag = outcome_tag;
                record.concept_tags = concept_tags;
                record.trust_score = trust_score;
                record.validation_count = validation_count;
            }
            RecordPatch::RelatedMemories(ids) => record.related_memories = ids,
            RecordPatch::AccessBump {
                access_count,
                last_accessed_at,
            } => {
                record.access_count = access_count;
                record.last_accessed_at = last_accessed_at;
            }
            RecordPatch::CoRetrieval(meta) => record.co_retrieval = meta,
            RecordPatch::Trust {
                trust_score,
                validation_count,
            } => {
                record.trust_score = trust_score;
                record.validation_count = validation_count;
            }
        }
        Ok(())
    }

    async fn delete(&self, id: &MemoryId, token: &CancellationToken) -> CortexResult<()> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        self.records.lock().await.remove(&id.0);
        Ok(())
    }

    async fn count(&self, filter: &SearchFilter, token: &CancellationToken) -> CortexResult<u64> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        let guard = self.records.lock().await;
        Ok(guard.values().filter(|r| record_matches(r, filter)).count() as u64)
    }
}
