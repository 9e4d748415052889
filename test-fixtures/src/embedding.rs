//! Deterministic [`EmbeddingClient`] double. Hashes the input text into a
//! unit-length vector of the configured dimension rather than returning a
//! fixed all-zero vector, so cosine-similarity assertions in callers
//! (the linker, consolidation, retrieval) have something real to compare.

use async_trait::async_trait;
use strata_core::cancel::CancellationToken;
use strata_core::errors::{CortexError, CortexResult};
use strata_core::traits::EmbeddingClient;

pub struct FakeEmbeddingClient {
    dimensions: usize,
}

impl FakeEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl Default for FakeEmbeddingClient {
    fn default() -> Self {
        Self::new(8)
    }
}

/// Hash `text` into `dims` pseudo-random floats, then normalize to a unit
/// vector, so two equal-meaning fixture strings always embed identically.
pub fn hash_embed(text: &str, dims: usize) -> Vec<f32> {
    let mut state = 0xcbf29ce484222325u64;
    let mut vector = Vec::with_capacity(dims);
    for i in 0..dims {
        for byte in text.bytes().chain(std::iter::once(i as u8)) {
            state ^= byte as u64;
            state = state.wrapping_mul(0x100000001b3);
        }
        // Map the hash into [-1.0, 1.0).
        let value = ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0;
        vector.push(value as f32);
    }
    let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in &mut vector {
            *v /= norm;
        }
    }
    vector
}

#[async_trait]
impl EmbeddingClient for FakeEmbeddingClient {
    async fn embed(&self, text: &str, token: &CancellationToken) -> CortexResult<Vec<f32>> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        if text.is_empty() {
            return Err(CortexError::invalid_input("cannot embed empty text"));
        }
        Ok(hash_embed(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embed_is_deterministic_for_the_same_text() {
        let client = FakeEmbeddingClient::new(8);
        let token = CancellationToken::new();
        let a = client.embed("hello world", &token).await.unwrap();
        let b = client.embed("hello world", &token).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 8);
    }

    #[tokio::test]
    async fn embed_differs_for_different_text() {
        let client = FakeEmbeddingClient::new(8);
        let token = CancellationToken::new();
        let a = client.embed("alpha", &token).await.unwrap();
        let b = client.embed("beta", &token).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn embed_is_unit_length() {
        let client = FakeEmbeddingClient::new(16);
        let token = CancellationToken::new();
        let v = client.embed("some memory content", &token).await.unwrap();
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
