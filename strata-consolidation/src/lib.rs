//! # strata-consolidation
//!
//! Collapses clusters of near-identical memories within a tier into one
//! authoritative survivor (SPEC_FULL.md §4.6). Pure clustering/survivor
//! logic lives in `clustering`; the scroll-and-rewrite orchestration lives
//! in `engine`.

pub mod clustering;
pub mod engine;

pub use clustering::{cluster_by_similarity, cosine_similarity, pick_survivor, recompute_trust};
pub use engine::{run_consolidation_pass, ConsolidationDeps, TierConsolidationStats};
