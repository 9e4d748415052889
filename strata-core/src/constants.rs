/// Strata system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum number of related-memory ids retained per memory.
pub const DEFAULT_MAX_LINKS_PER_MEMORY: usize = 10;

/// Maximum number of concept tags per memory (spec invariant, not configurable).
pub const MAX_CONCEPT_TAGS: usize = 5;

/// Number of fixed principle slots: slot 0 (identity), 1-3 (admin), 4-10 (engine).
pub const PRINCIPLE_SLOT_COUNT: usize = 11;

/// Slots 1, 2, 3 are administrator-owned; their content is never mutated by the engine.
pub const ADMIN_SLOTS: [usize; 3] = [1, 2, 3];

/// Slot 0 holds the system's self-identity text.
pub const IDENTITY_SLOT: usize = 0;

/// Slots 4..=10 are engine-managed (fillable, mergeable, replaceable).
pub const ENGINE_SLOTS: [usize; 7] = [4, 5, 6, 7, 8, 9, 10];

/// Default initial trust score for a freshly tagged memory.
pub const DEFAULT_INITIAL_TRUST: f64 = 0.5;

/// Default scroll/page-iteration cap used by every capped-pagination loop
/// (adapter scrolls, migration backfill, consolidator scans). Prevents an
/// infinite loop on a malformed or adversarial continuation cursor.
pub const DEFAULT_MAX_SCROLL_ITERATIONS: usize = 100;

/// Default per-tier batch cap for the decay worker's compress pass.
pub const DEFAULT_DECAY_BATCH_CAP: usize = 100;

/// Default per-tier batch size for the linker's similarity-linking pass.
pub const DEFAULT_LINKER_BATCH_SIZE: usize = 50;

/// Default consolidator per-tier scan cap (Open Question in spec.md §9,
/// resolved here: bound the O(n^2) cluster scan to this many scrolled records).
pub const DEFAULT_CONSOLIDATION_SCAN_LIMIT: usize = 1000;

/// Default duplicate-cluster cosine-similarity threshold.
pub const DEFAULT_DUPLICATE_THRESHOLD: f64 = 0.95;

/// Minimum cluster size for the consolidator to collapse memories.
pub const MIN_DUPLICATE_CLUSTER_SIZE: usize = 3;

/// Default co-occurrence throttle window, in seconds (1 hour).
pub const DEFAULT_CO_OCCURRENCE_THROTTLE_SECS: i64 = 3600;

/// Default tagger queue capacity.
pub const DEFAULT_TAGGER_QUEUE_SIZE: usize = 1000;

/// Default tagger worker pool size.
pub const DEFAULT_TAGGER_WORKERS: usize = 3;

/// Default tagger batch size drained per decay cycle's tag pass.
pub const DEFAULT_TAGGER_BATCH_SIZE: usize = 50;

/// Default per-attempt tagger LLM deadline, in seconds.
pub const DEFAULT_TAGGER_TIMEOUT_SECS: u64 = 90;

/// Default maximum tagger LLM retry attempts.
pub const DEFAULT_TAGGER_MAX_RETRIES: u32 = 3;

/// Default tagger linear backoff base, in seconds (delay = attempt * base).
pub const DEFAULT_TAGGER_RETRY_DELAY_SECS: u64 = 5;

/// Default decay-worker LLM per-attempt deadline, in seconds. No retry.
pub const DEFAULT_DECAY_TIMEOUT_SECS: u64 = 60;

/// Default principle-engine LLM per-attempt deadline, in seconds. No retry.
pub const DEFAULT_PRINCIPLE_TIMEOUT_SECS: u64 = 30;

/// Default embedding-service call deadline, in seconds.
pub const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 15;

/// Minimum accepted confidence for a contrastive principle candidate.
pub const MIN_PRINCIPLE_CONFIDENCE: f64 = 0.6;

/// Accepted character-length window for a principle candidate's content.
pub const PRINCIPLE_CONTENT_LEN_RANGE: (usize, usize) = (10, 200);

/// Similarity below which a candidate is treated as a brand-new concept.
pub const PRINCIPLE_NEW_CONCEPT_THRESHOLD: f64 = 0.40;

/// Similarity above which two principles are merged rather than contrasted.
pub const PRINCIPLE_MERGE_THRESHOLD: f64 = 0.75;

/// Minimum rating margin required for a candidate to replace an existing
/// non-contradicting principle in the ambiguous [0.40, 0.75] similarity band.
pub const PRINCIPLE_REPLACE_MARGIN: f64 = 0.10;

/// Minimum pieces of evidence required before identity (slot 0) evolution runs.
pub const MIN_IDENTITY_EVIDENCE: usize = 5;

/// Minimum confidence required to accept a proposed identity string.
pub const MIN_IDENTITY_CONFIDENCE: f64 = 0.7;

/// Maximum length of the identity string (slot 0 content).
pub const MAX_IDENTITY_LEN: usize = 200;
