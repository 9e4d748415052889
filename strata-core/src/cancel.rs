//! Cancellation primitive shared by every suspension point (LLM call,
//! embedding call, vector-store call) per SPEC_FULL.md §5.
//!
//! A small `Arc<AtomicBool>` + `Notify` pair rather than a dependency on
//! `tokio-util`'s `CancellationToken` — see DESIGN.md for why that
//! dependency was dropped during the transform.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the token. Idempotent; safe to call from any task.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel()` has been called. Poll this inside a
    /// `tokio::select!` alongside the real work to abort promptly.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cancel_is_idempotent_and_visible_to_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_if_already_fired() {
        let token = CancellationToken::new();
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled())
            .await
            .expect("cancelled() should resolve immediately once fired");
    }

    #[tokio::test]
    async fn select_aborts_promptly_on_cancel() {
        let token = CancellationToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = waiter.cancelled() => "cancelled",
                _ = tokio::time::sleep(std::time::Duration::from_secs(5)) => "timed out",
            }
        });
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        token.cancel();
        let result = tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .expect("task should finish quickly")
            .unwrap();
        assert_eq!(result, "cancelled");
    }
}
