use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_core::cancel::CancellationToken;
use strata_core::constants::DEFAULT_EMBEDDING_TIMEOUT_SECS;
use strata_core::errors::{CortexError, CortexResult};
use strata_core::traits::EmbeddingClient;

#[derive(Debug, Clone)]
pub struct EmbeddingClientConfig {
    pub base_url: String,
    pub model: String,
    pub dimensions: usize,
    pub timeout: Duration,
}

impl EmbeddingClientConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
            dimensions,
            timeout: Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

pub struct HttpEmbeddingClient {
    http: reqwest::Client,
    config: EmbeddingClientConfig,
}

impl HttpEmbeddingClient {
    pub fn new(config: EmbeddingClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str, token: &CancellationToken) -> CortexResult<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text,
            model: &self.config.model,
        };
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));

        let call = async {
            let response = self
                .http
                .post(&url)
                .timeout(self.config.timeout)
                .json(&request)
                .send()
                .await
                .map_err(|e| CortexError::external_with_source("embedding", "request failed", e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CortexError::external(
                    "embedding",
                    format!("status {status}: {body}"),
                ));
            }

            let parsed: EmbeddingResponse = response
                .json()
                .await
                .map_err(|e| CortexError::external_with_source("embedding", "malformed response body", e))?;

            let embedding = parsed
                .data
                .into_iter()
                .next()
                .map(|d| d.embedding)
                .ok_or_else(|| CortexError::external("embedding", "response contained no embedding data"))?;

            if embedding.len() != self.config.dimensions {
                return Err(CortexError::external(
                    "embedding",
                    format!(
                        "dimension mismatch: configured {}, service returned {}",
                        self.config.dimensions,
                        embedding.len()
                    ),
                ));
            }

            Ok(embedding)
        };

        tokio::select! {
            result = call => result,
            _ = token.cancelled() => Err(CortexError::Cancelled),
        }
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_embedding_timeout() {
        let config = EmbeddingClientConfig::new("http://localhost:8081", "text-embed-v1", 384);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_EMBEDDING_TIMEOUT_SECS));
        assert_eq!(config.dimensions, 384);
    }

    #[tokio::test]
    async fn dimensions_reports_configured_value() {
        let config = EmbeddingClientConfig::new("http://localhost:8081", "text-embed-v1", 384);
        let client = HttpEmbeddingClient::new(config);
        assert_eq!(client.dimensions(), 384);
    }
}
