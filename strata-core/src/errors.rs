//! Workspace-wide error type.
//!
//! Every external-facing error in the workspace collapses into
//! `CortexError`, mirroring §7 of SPEC_FULL.md: InvalidInput,
//! ExternalServiceFailure, StorageFailure, NotFound, Cancelled, and
//! QueueDropped (the last is recorded in tagger statistics and is never
//! constructed as an error returned to a caller).

use thiserror::Error;

pub type CortexResult<T> = Result<T, CortexError>;

#[derive(Debug, Error)]
pub enum CortexError {
    /// Rejected at the boundary: malformed outcome tag, wrong embedding
    /// dimension, slot index out of range, rating outside [0, 1], etc.
    /// Never retried.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Embedding or LLM call failed, including exhausted timeouts/retries.
    #[error("external service failure ({service}): {message}")]
    ExternalServiceFailure {
        service: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vector-store or principle-store I/O failure. Not retried by the core.
    #[error("storage failure: {0}")]
    StorageFailure(#[from] StorageError),

    /// A get-by-id request found nothing. Batch lookups drop missing ids
    /// silently instead of surfacing this.
    #[error("memory not found: {0}")]
    NotFound(String),

    /// The caller's cancellation token fired before the call completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl CortexError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalServiceFailure {
            service,
            message: message.into(),
            source: None,
        }
    }

    pub fn external_with_source(
        service: &'static str,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ExternalServiceFailure {
            service,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// True for errors a retrying caller should treat as transient
    /// (used by the tagger queue's retry loop; timeouts and 5xx-shaped
    /// external failures are retryable, everything else is not).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ExternalServiceFailure { .. })
    }
}

/// Vector-store / principle-store I/O failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("vector store request failed: {0}")]
    RequestFailed(String),

    #[error("vector store returned an error response: {status} {body}")]
    ApiError { status: u16, body: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("malformed continuation cursor")]
    MalformedCursor,

    #[error("principle store error: {0}")]
    PrincipleStore(String),
}
