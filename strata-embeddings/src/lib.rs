//! # strata-embeddings
//!
//! HTTP client for the external embedding service (SPEC_FULL.md §6.1).
//! Request: `{"input": <text>, "model": <name>}`. Response:
//! `{"data": [{"embedding": [float, ...]}]}`. A non-200 status or an empty
//! `data` array both surface as `CortexError::ExternalServiceFailure`.

pub mod client;

pub use client::{HttpEmbeddingClient, EmbeddingClientConfig};
