//! # strata-storage
//!
//! HTTP adapter over the external vector index (SPEC_FULL.md §4.1, §6.3).
//! A point is `(id: UUID, vector: float[D], payload: map<string, value>)`.
//! This crate owns the wire DTOs, payload (de)serialization, filter
//! composition, collection bootstrap, and the one-time `memory_id`
//! backfill migration. It never retries — storage failures are not
//! retried by the core (spec.md §7).

pub mod client;
pub mod collection;
pub mod filter;
pub mod migration;
pub mod payload;

pub use client::{HttpVectorStore, VectorStoreConfig};
