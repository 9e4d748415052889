//! Central metrics registry.
//!
//! [`MetricsCollector`] owns one collector per background subsystem and
//! provides a single place to reset or snapshot all of them.

pub mod consolidation_metrics;
pub mod decay_metrics;
pub mod linker_metrics;
pub mod principle_metrics;
pub mod retrieval_metrics;
pub mod tagger_metrics;

pub use consolidation_metrics::ConsolidationMetrics;
pub use decay_metrics::DecayMetrics;
pub use linker_metrics::LinkerMetrics;
pub use principle_metrics::PrincipleMetrics;
pub use retrieval_metrics::RetrievalMetrics;
pub use tagger_metrics::TaggerMetrics;

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct MetricsCollector {
    pub tagger: TaggerMetrics,
    pub decay: DecayMetrics,
    pub linker: LinkerMetrics,
    pub consolidation: ConsolidationMetrics,
    pub retrieval: RetrievalMetrics,
    pub principles: PrincipleMetrics,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all counters (periodic rotation or test isolation).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_all_subsystem_counters() {
        let mut collector = MetricsCollector::new();
        collector.tagger.observe(10, 8, 1, 1, 3);
        collector.retrieval.record(5, 120);
        collector.reset();
        assert_eq!(collector.tagger.enqueued, 0);
        assert_eq!(collector.retrieval.queries_served, 0);
    }
}
