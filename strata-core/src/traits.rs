//! Shared trait boundaries implemented by the adapter crates and consumed
//! by every worker. Keeping these in `strata-core` lets `test-fixtures`
//! provide in-memory fakes that every other crate's tests can share.

use async_trait::async_trait;

use crate::cancel::CancellationToken;
use crate::errors::CortexResult;
use crate::record::{MemoryId, MemoryRecord, RecordPatch, Tier};

/// A single filter clause: field equals one of a set of values.
#[derive(Debug, Clone)]
pub struct FilterClause {
    pub field: String,
    pub values: Vec<String>,
}

impl FilterClause {
    pub fn new(field: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            field: field.into(),
            values,
        }
    }
}

/// AND-of-must clauses combined with an OR-of-should clause set
/// (spec.md §4.1's filter composition rules).
#[derive(Debug, Clone, Default)]
pub struct SearchFilter {
    pub must: Vec<FilterClause>,
    pub should: Vec<FilterClause>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_must(mut self, clause: FilterClause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn with_should(mut self, clause: FilterClause) -> Self {
        self.should.push(clause);
        self
    }
}

/// An opaque continuation cursor for scrolls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrollCursor(pub Option<String>);

pub struct ScrollPage {
    pub records: Vec<MemoryRecord>,
    pub next: ScrollCursor,
}

#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub record: MemoryRecord,
    pub score: f64,
}

/// Typed operations over the external vector index (spec.md §4.1).
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, record: &MemoryRecord, token: &CancellationToken) -> CortexResult<()>;

    async fn get(&self, id: &MemoryId, token: &CancellationToken) -> CortexResult<Option<MemoryRecord>>;

    async fn get_batch(
        &self,
        ids: &[MemoryId],
        token: &CancellationToken,
    ) -> CortexResult<Vec<MemoryRecord>>;

    async fn scroll(
        &self,
        filter: &SearchFilter,
        cursor: ScrollCursor,
        limit: usize,
        token: &CancellationToken,
    ) -> CortexResult<ScrollPage>;

    async fn search(
        &self,
        query_vector: &[f32],
        filter: &SearchFilter,
        limit: usize,
        token: &CancellationToken,
    ) -> CortexResult<Vec<ScoredRecord>>;

    async fn patch(
        &self,
        id: &MemoryId,
        patch: RecordPatch,
        token: &CancellationToken,
    ) -> CortexResult<()>;

    async fn delete(&self, id: &MemoryId, token: &CancellationToken) -> CortexResult<()>;

    async fn count(&self, filter: &SearchFilter, token: &CancellationToken) -> CortexResult<u64>;
}

/// Embedding generation over the external embedding service.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str, token: &CancellationToken) -> CortexResult<Vec<f32>>;

    fn dimensions(&self) -> usize;
}

/// A single chat message for the LLM request shape (spec.md §6.2).
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
}

/// Chat completion over the external LLM service. A single call with a
/// caller-supplied deadline; retry policy is owned by each caller
/// (tagger, decay, principles apply different policies per spec §5).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        deadline: std::time::Duration,
        token: &CancellationToken,
    ) -> CortexResult<String>;
}

/// Relational principle store (spec.md §6.4). A trait boundary so the
/// principle engine can be tested against an in-memory fake without a
/// real relational store.
#[async_trait]
pub trait PrincipleStore: Send + Sync {
    async fn load_all(&self) -> CortexResult<crate::principle::PrincipleTable>;

    async fn save_slot(&self, slot: &crate::principle::PrincipleSlot) -> CortexResult<()>;
}

/// A tag for which tier a scroll/search targets, used by callers that
/// build a `SearchFilter` for a single tier (linker, consolidator, decay).
pub fn tier_filter(tier: Tier) -> SearchFilter {
    SearchFilter::new().with_must(FilterClause::new("tier", vec![tier.as_str().to_string()]))
}
