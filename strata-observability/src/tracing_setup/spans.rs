//! Span macros per background worker/query operation (tagger, decay,
//! linker, consolidation, principles, retrieval), each carrying the
//! fields an operator would want while grepping structured logs.

/// Span for a single retrieval query.
#[macro_export]
macro_rules! retrieval_span {
    ($query:expr, $owner:expr) => {
        tracing::info_span!("strata.retrieval", query = %$query, owner = %$owner)
    };
}

/// Span for one tagger worker's attempt at a single memory.
#[macro_export]
macro_rules! tagger_span {
    ($memory_id:expr) => {
        tracing::info_span!("strata.tagger", memory_id = %$memory_id)
    };
}

/// Span for one decay-worker compress pass over a tier transition.
#[macro_export]
macro_rules! decay_span {
    ($from_tier:expr, $to_tier:expr) => {
        tracing::info_span!("strata.decay", from_tier = %$from_tier, to_tier = %$to_tier)
    };
}

/// Span for one linker pass over a tier.
#[macro_export]
macro_rules! linker_span {
    ($tier:expr) => {
        tracing::info_span!("strata.linker", tier = %$tier)
    };
}

/// Span for one consolidation pass over a tier.
#[macro_export]
macro_rules! consolidation_span {
    ($tier:expr) => {
        tracing::info_span!("strata.consolidation", tier = %$tier)
    };
}

/// Span for one principle-engine cycle (extraction or evolution).
#[macro_export]
macro_rules! principle_span {
    ($phase:expr) => {
        tracing::info_span!("strata.principles", phase = %$phase)
    };
}

/// Span names as constants, for callers that need the bare string (log
/// filters, dashboards) rather than an active span.
pub mod names {
    pub const RETRIEVAL: &str = "strata.retrieval";
    pub const TAGGER: &str = "strata.tagger";
    pub const DECAY: &str = "strata.decay";
    pub const LINKER: &str = "strata.linker";
    pub const CONSOLIDATION: &str = "strata.consolidation";
    pub const PRINCIPLES: &str = "strata.principles";
}
