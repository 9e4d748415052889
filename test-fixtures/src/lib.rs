//! # test-fixtures
//!
//! In-memory fakes of every `strata-core::traits` boundary, shared across
//! crates so a worker's logic (tagger, decay, linker, consolidation,
//! principles) can be exercised against real trait-object behavior
//! without a network.

pub mod embedding;
pub mod llm;
pub mod principle_store;
pub mod vector_store;

pub use embedding::FakeEmbeddingClient;
pub use llm::FakeLlmClient;
pub use principle_store::FakePrincipleStore;
pub use vector_store::FakeVectorStore;
