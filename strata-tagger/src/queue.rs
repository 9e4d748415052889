//! Bounded queue of pending memory ids. Enqueues beyond capacity are
//! dropped and counted rather than applying backpressure to the caller
//! (SPEC_FULL.md §4.3, §5: tagging is best-effort).

use std::sync::Arc;

use strata_core::constants::DEFAULT_TAGGER_QUEUE_SIZE;
use strata_core::record::MemoryId;
use tokio::sync::mpsc;
use tracing::warn;

use crate::stats::TaggerStats;

#[derive(Clone)]
pub struct TaggerQueue {
    sender: mpsc::Sender<MemoryId>,
    stats: Arc<TaggerStats>,
}

impl TaggerQueue {
    pub fn new(stats: Arc<TaggerStats>) -> (Self, mpsc::Receiver<MemoryId>) {
        Self::with_capacity(DEFAULT_TAGGER_QUEUE_SIZE, stats)
    }

    pub fn with_capacity(capacity: usize, stats: Arc<TaggerStats>) -> (Self, mpsc::Receiver<MemoryId>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, stats }, receiver)
    }

    /// Attempt to enqueue `id`. Returns `true` if accepted, `false` if the
    /// queue was full and the enqueue was dropped.
    pub fn enqueue(&self, id: MemoryId) -> bool {
        match self.sender.try_send(id) {
            Ok(()) => {
                self.stats.record_enqueued();
                true
            }
            Err(_) => {
                self.stats.record_dropped();
                warn!("tagger queue full, dropping enqueue");
                false
            }
        }
    }

    /// Total queue capacity, for reporting depth as a fraction of it.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Number of ids currently queued but not yet taken by a worker.
    pub fn depth(&self) -> usize {
        self.capacity() - self.sender.capacity()
    }
}

/// Handle to a running tagger worker pool, returned by
/// `worker::spawn_workers`. Owns the join handles so shutdown can wait for
/// in-flight work to finish before flushing final stats.
pub struct TaggerHandle {
    pub(crate) token: strata_core::cancel::CancellationToken,
    pub(crate) joins: Vec<tokio::task::JoinHandle<()>>,
    pub(crate) stats: Arc<TaggerStats>,
}

impl TaggerHandle {
    /// Signal all workers to stop, wait for in-flight tasks to finish,
    /// and return the final stats snapshot.
    pub async fn shutdown(self) -> crate::stats::TaggerStatsSnapshot {
        self.token.cancel();
        for join in self.joins {
            let _ = join.await;
        }
        self.stats.snapshot()
    }

    pub fn stats(&self) -> crate::stats::TaggerStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_past_capacity_is_dropped_and_counted() {
        let stats = Arc::new(TaggerStats::new());
        let (queue, _receiver) = TaggerQueue::with_capacity(1, stats.clone());

        assert!(queue.enqueue(MemoryId::new()));
        assert!(!queue.enqueue(MemoryId::new()));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.enqueued, 1);
        assert_eq!(snapshot.dropped, 1);
    }
}
