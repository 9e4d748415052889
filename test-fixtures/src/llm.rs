//! Scripted [`LlmClient`] double. A test queues up the responses it wants
//! the engine to receive, in call order; once the queue is empty it falls
//! back to a fixed default rather than panicking, so tests that don't care
//! about the LLM's exact output don't need to script every call.

use std::collections::VecDeque;

use async_trait::async_trait;
use strata_core::cancel::CancellationToken;
use strata_core::errors::{CortexError, CortexResult};
use strata_core::traits::{ChatMessage, LlmClient};
use tokio::sync::Mutex;

pub struct FakeLlmClient {
    responses: Mutex<VecDeque<String>>,
    default_response: String,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlmClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            default_response: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue responses to be returned in order, one per `complete` call.
    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            default_response: String::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Response returned for every call once the scripted queue runs dry.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_response = default.into();
        self
    }

    /// Number of `complete` calls made so far.
    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// The messages passed to the nth `complete` call, for assertions on
    /// what the engine actually asked the LLM.
    pub async fn call_messages(&self, index: usize) -> Option<Vec<ChatMessage>> {
        self.calls.lock().await.get(index).cloned()
    }
}

impl Default for FakeLlmClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmClient for FakeLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _temperature: f32,
        _deadline: std::time::Duration,
        token: &CancellationToken,
    ) -> CortexResult<String> {
        if token.is_cancelled() {
            return Err(CortexError::Cancelled);
        }
        self.calls.lock().await.push(messages.to_vec());
        let mut queue = self.responses.lock().await;
        Ok(queue.pop_front().unwrap_or_else(|| self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::traits::ChatRole;
    use std::time::Duration;

    fn message() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: ChatRole::User,
            content: "hi".into(),
        }]
    }

    #[tokio::test]
    async fn scripted_responses_are_returned_in_order() {
        let client = FakeLlmClient::with_responses(["first", "second"]);
        let token = CancellationToken::new();
        let a = client.complete(&message(), 0.0, Duration::from_secs(1), &token).await.unwrap();
        let b = client.complete(&message(), 0.0, Duration::from_secs(1), &token).await.unwrap();
        assert_eq!(a, "first");
        assert_eq!(b, "second");
    }

    #[tokio::test]
    async fn falls_back_to_default_once_the_queue_is_empty() {
        let client = FakeLlmClient::with_responses(["only"]).with_default("fallback");
        let token = CancellationToken::new();
        let _ = client.complete(&message(), 0.0, Duration::from_secs(1), &token).await.unwrap();
        let second = client.complete(&message(), 0.0, Duration::from_secs(1), &token).await.unwrap();
        assert_eq!(second, "fallback");
    }

    #[tokio::test]
    async fn records_every_call_for_later_assertions() {
        let client = FakeLlmClient::new();
        let token = CancellationToken::new();
        client.complete(&message(), 0.0, Duration::from_secs(1), &token).await.unwrap();
        assert_eq!(client.call_count().await, 1);
        assert_eq!(client.call_messages(0).await.unwrap()[0].content, "hi");
    }
}
