//! The memory record model (SPEC_FULL.md §3).

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_CONCEPT_TAGS;
use crate::errors::{CortexError, CortexResult};

/// Stable identity assigned at first persist. Newtype so a caller can't
/// pass an owner id or a raw string where a memory id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub String);

impl MemoryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MemoryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MemoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compression tier. Ordered recent -> medium -> long -> ancient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Recent,
    Medium,
    Long,
    Ancient,
}

impl Tier {
    /// The tier this one transitions into, or `None` if already `Ancient`.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Recent => Some(Tier::Medium),
            Tier::Medium => Some(Tier::Long),
            Tier::Long => Some(Tier::Ancient),
            Tier::Ancient => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Recent => "recent",
            Tier::Medium => "medium",
            Tier::Long => "long",
            Tier::Ancient => "ancient",
        }
    }
}

/// Owner: either a specific user (personal) or absent (shared/collective).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Personal(String),
    Collective,
}

impl Owner {
    pub fn is_collective(&self) -> bool {
        matches!(self, Owner::Collective)
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            Owner::Personal(id) => Some(id.as_str()),
            Owner::Collective => None,
        }
    }
}

/// Judgment of whether the memory's originating interaction succeeded.
/// `Unset` only until the tagger has processed it; it is never written
/// back to storage as a string other than the four allowed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeTag {
    Good,
    Bad,
    Neutral,
    Unset,
}

impl OutcomeTag {
    /// Parses the wire representation (§3's `{good, bad, neutral, unset}`),
    /// rejecting anything else at the boundary per the InvalidInput policy.
    pub fn parse(raw: &str) -> CortexResult<Self> {
        match raw {
            "good" => Ok(OutcomeTag::Good),
            "bad" => Ok(OutcomeTag::Bad),
            "neutral" => Ok(OutcomeTag::Neutral),
            "unset" | "" => Ok(OutcomeTag::Unset),
            other => Err(CortexError::invalid_input(format!(
                "outcome_tag must be one of good/bad/neutral/unset, got {other:?}"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeTag::Good => "good",
            OutcomeTag::Bad => "bad",
            OutcomeTag::Neutral => "neutral",
            OutcomeTag::Unset => "unset",
        }
    }
}

/// Co-retrieval bookkeeping kept inside `metadata` (§3). Modeled as two
/// strongly-typed maps rather than a general `map<string, any>` per
/// SPEC_FULL.md's design note — the core API never exposes a raw JSON bag.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoRetrievalMetadata {
    /// other-memory-id -> count.
    pub counts: HashMap<String, u64>,
    /// other-memory-id -> unix-seconds of last increment.
    pub last_increment: HashMap<String, i64>,
}

/// The universal memory record. Every memory in the system is one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: MemoryId,
    pub content: String,
    /// Previous-generation body, kept once; cleared on the *next*
    /// compression (one-generation retention, SPEC_FULL.md §9).
    pub compressed_from: Option<String>,
    pub tier: Tier,
    pub owner: Owner,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
    pub importance_score: f64,
    pub outcome_tag: OutcomeTag,
    pub trust_score: f64,
    pub validation_count: u64,
    pub related_memories: Vec<MemoryId>,
    pub concept_tags: Vec<String>,
    pub co_retrieval: CoRetrievalMetadata,
    /// Fixed-dimension unit-length vector. Never returned to external
    /// callers; adapters strip it from any response crossing that
    /// boundary (see `strata-storage`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl MemoryRecord {
    /// Construct a fresh, untagged record at tier=recent as the ingest
    /// path does (SPEC_FULL.md §3 Lifecycle).
    pub fn new(content: String, owner: Owner, importance_score: f64) -> Self {
        let now = Utc::now();
        Self {
            id: MemoryId::new(),
            content,
            compressed_from: None,
            tier: Tier::Recent,
            owner,
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            importance_score: importance_score.clamp(0.0, 1.0),
            outcome_tag: OutcomeTag::Unset,
            trust_score: crate::constants::DEFAULT_INITIAL_TRUST,
            validation_count: 0,
            related_memories: Vec::new(),
            concept_tags: Vec::new(),
            co_retrieval: CoRetrievalMetadata::default(),
            embedding: None,
        }
    }

    /// Validate the record's invariants (§3). Called before every upsert.
    pub fn validate(&self, max_links_per_memory: usize, embedding_dim: Option<usize>) -> CortexResult<()> {
        if self.related_memories.len() > max_links_per_memory {
            return Err(CortexError::invalid_input(format!(
                "related_memories has {} entries, exceeds max_links_per_memory={}",
                self.related_memories.len(),
                max_links_per_memory
            )));
        }
        if self.concept_tags.len() > MAX_CONCEPT_TAGS {
            return Err(CortexError::invalid_input(format!(
                "concept_tags has {} entries, exceeds the cap of {MAX_CONCEPT_TAGS}",
                self.concept_tags.len()
            )));
        }
        if !(0.0..=1.0).contains(&self.importance_score) {
            return Err(CortexError::invalid_input(
                "importance_score must be in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.trust_score) {
            return Err(CortexError::invalid_input("trust_score must be in [0, 1]"));
        }
        if self.tier != Tier::Recent && self.compressed_from.is_none() {
            // One-generation retention: a non-recent tier must either carry
            // compressed_from, or the caller asserts a compression cycle
            // already observed it (checked by the decay worker's log, not
            // representable as a pure-data invariant here).
        }
        if let (Some(expected), Some(vec)) = (embedding_dim, self.embedding.as_ref()) {
            if vec.len() != expected {
                return Err(CortexError::StorageFailure(
                    crate::errors::StorageError::DimensionMismatch {
                        expected,
                        actual: vec.len(),
                    },
                ));
            }
        }
        Ok(())
    }

    /// Strip invalid UTF-8 byte sequences from text fields before upsert
    /// (SPEC_FULL.md / spec.md §4.1: the transport encoding rejects
    /// ill-formed text, so sanitize rather than fail the write).
    pub fn sanitize_utf8(&mut self) {
        self.content = sanitize_text(&self.content);
        self.compressed_from = self.compressed_from.take().map(|s| sanitize_text(&s));
        for tag in &mut self.concept_tags {
            *tag = sanitize_text(tag);
        }
    }

    pub fn record_access(&mut self) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed_at = Utc::now();
    }
}

/// Replace invalid byte sequences with the empty string (not the
/// replacement character — the spec calls for outright removal).
fn sanitize_text(input: &str) -> String {
    if input.is_ascii() {
        return input.to_string();
    }
    input.chars().filter(|c| *c != '\u{FFFD}').collect()
}

/// Single-field patches, as used by the linker, tagger, reranker's
/// access bump, and co-occurrence tracker. Never rewrites the embedding;
/// upsert is the only authoritative carrier for that (SPEC_FULL.md §4.1).
#[derive(Debug, Clone)]
pub enum RecordPatch {
    Tagged {
        outcome_tag: OutcomeTag,
        concept_tags: Vec<String>,
        trust_score: f64,
        validation_count: u64,
    },
    RelatedMemories(Vec<MemoryId>),
    AccessBump {
        access_count: u64,
        last_accessed_at: DateTime<Utc>,
    },
    CoRetrieval(CoRetrievalMetadata),
    Trust {
        trust_score: f64,
        validation_count: u64,
    },
}
