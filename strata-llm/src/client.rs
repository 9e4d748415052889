use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strata_core::cancel::CancellationToken;
use strata_core::errors::{CortexError, CortexResult};
use strata_core::traits::{ChatMessage, ChatRole, LlmClient};

#[derive(Debug, Clone)]
pub struct LlmClientConfig {
    pub base_url: String,
    pub model: String,
}

impl LlmClientConfig {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

fn role_str(role: ChatRole) -> &'static str {
    match role {
        ChatRole::System => "system",
        ChatRole::User => "user",
    }
}

pub struct HttpLlmClient {
    http: reqwest::Client,
    config: LlmClientConfig,
}

impl HttpLlmClient {
    pub fn new(config: LlmClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
        deadline: std::time::Duration,
        token: &CancellationToken,
    ) -> CortexResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: messages
                .iter()
                .map(|m| WireMessage {
                    role: role_str(m.role),
                    content: &m.content,
                })
                .collect(),
            temperature,
            stream: false,
        };
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        let call = async {
            let response = self
                .http
                .post(&url)
                .timeout(deadline)
                .json(&request)
                .send()
                .await
                .map_err(|e| CortexError::external_with_source("llm", "request failed", e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CortexError::external("llm", format!("status {status}: {body}")));
            }

            let parsed: ChatResponse = response
                .json()
                .await
                .map_err(|e| CortexError::external_with_source("llm", "malformed response body", e))?;

            parsed
                .choices
                .into_iter()
                .next()
                .map(|c| c.message.content)
                .ok_or_else(|| CortexError::external("llm", "response contained no choices"))
        };

        tokio::select! {
            result = call => result,
            _ = token.cancelled() => Err(CortexError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_str_maps_system_and_user() {
        assert_eq!(role_str(ChatRole::System), "system");
        assert_eq!(role_str(ChatRole::User), "user");
    }

    #[test]
    fn config_carries_model_and_base_url() {
        let config = LlmClientConfig::new("http://localhost:8082", "chat-v1");
        assert_eq!(config.model, "chat-v1");
        assert_eq!(config.base_url, "http://localhost:8082");
    }
}
