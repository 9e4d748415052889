//! # strata-llm
//!
//! HTTP client for the external chat LLM service (SPEC_FULL.md §6.2),
//! shared by the tagger, decay and principle engines. Each caller owns its
//! own retry policy: this crate makes a single call per invocation and
//! respects a caller-supplied deadline and cancellation token, but never
//! retries internally.

pub mod client;

pub use client::{HttpLlmClient, LlmClientConfig};
