//! Generic periodic-ticker spawn helper shared by the decay, linker, and
//! principle workers (SPEC_FULL.md §4.9): first run is immediate, every
//! following run waits out the configured period, and a cancellation
//! fires promptly even mid-sleep rather than waiting out the full period.

use std::future::Future;
use std::time::Duration;

use strata_core::cancel::CancellationToken;
use tokio::task::JoinHandle;

/// Spawn a task that calls `tick` immediately, then again every `period`
/// until `token` is cancelled. `tick` itself is responsible for its own
/// error handling; this helper only owns the scheduling loop.
pub fn spawn_periodic<F, Fut>(period: Duration, token: CancellationToken, mut tick: F) -> JoinHandle<()>
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    tokio::spawn(async move {
        tick().await;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = tokio::time::sleep(period) => {}
            }
            if token.is_cancelled() {
                break;
            }
            tick().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn first_tick_runs_immediately_without_waiting_a_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let counter = count.clone();
        let handle = spawn_periodic(Duration::from_secs(3600), token.clone(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::task::yield_now().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        token.cancel();
        let _ = handle.await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_the_loop_without_waiting_for_the_next_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let token = CancellationToken::new();
        let counter = count.clone();
        let handle = spawn_periodic(Duration::from_secs(3600), token.clone(), move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        tokio::task::yield_now().await;
        token.cancel();
        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .expect("worker should stop promptly on cancellation")
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
