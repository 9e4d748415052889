//! # strata-retrieval
//!
//! Query-time retrieval and reranking (SPEC_FULL.md §4.7): embed the
//! query, build the visibility/tier/outcome/concept filter, search,
//! drop below the score floor, optionally rerank by a good-behavior
//! bias, and return the top N. Co-occurrence and access-metadata
//! patches for the returned set are fire-and-forget relative to the
//! caller.

pub mod engine;
pub mod rerank;

pub use engine::{retrieve, RetrievalDeps, RetrievalQuery};
pub use rerank::rerank_results;
