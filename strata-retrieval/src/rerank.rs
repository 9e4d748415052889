//! Good-behavior-bias reranking (SPEC_FULL.md §4.7). Pure function over
//! already-scored, already-filtered results.

use strata_core::record::OutcomeTag;
use strata_core::traits::ScoredRecord;

const TRUST_WEIGHT: f64 = 0.3;
const OUTCOME_WEIGHT: f64 = 0.25;
const VALIDATION_BONUS_CAP: f64 = 0.1;
const VALIDATION_BONUS_DIVISOR: f64 = 100.0;

/// Adjust each result's score by trust, outcome, and validation-count
/// factors weighted by `bias` in [0, 1], clamp to [0, 1], and sort
/// descending. A `bias` of 0 is a no-op pass that still clamps and sorts.
pub fn rerank_results(mut results: Vec<ScoredRecord>, bias: f64) -> Vec<ScoredRecord> {
    if bias > 0.0 {
        for scored in &mut results {
            let trust_adjustment = (scored.record.trust_score - 0.5) * TRUST_WEIGHT;
            let outcome_adjustment = match scored.record.outcome_tag {
                OutcomeTag::Good => bias * OUTCOME_WEIGHT,
                OutcomeTag::Bad => -(1.0 - bias) * OUTCOME_WEIGHT,
                OutcomeTag::Neutral | OutcomeTag::Unset => 0.0,
            };
            let validation_bonus =
                (scored.record.validation_count as f64 / VALIDATION_BONUS_DIVISOR).min(VALIDATION_BONUS_CAP);

            scored.score =
                (scored.score + trust_adjustment + outcome_adjustment + validation_bonus).clamp(0.0, 1.0);
        }
    }
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::record::{MemoryRecord, Owner};

    fn scored(importance: f64, trust: f64, outcome: OutcomeTag, validation_count: u64, score: f64) -> ScoredRecord {
        let mut record = MemoryRecord::new("x".into(), Owner::Collective, importance);
        record.trust_score = trust;
        record.outcome_tag = outcome;
        record.validation_count = validation_count;
        ScoredRecord { record, score }
    }

    #[test]
    fn zero_bias_only_sorts_no_adjustment() {
        let results = vec![
            scored(0.5, 0.5, OutcomeTag::Good, 0, 0.6),
            scored(0.5, 0.5, OutcomeTag::Good, 0, 0.9),
        ];
        let reranked = rerank_results(results, 0.0);
        assert_eq!(reranked[0].score, 0.9);
    }

    #[test]
    fn good_outcome_gets_boosted_over_bad() {
        let results = vec![
            scored(0.5, 0.5, OutcomeTag::Bad, 0, 0.7),
            scored(0.5, 0.5, OutcomeTag::Good, 0, 0.65),
        ];
        let reranked = rerank_results(results, 0.8);
        assert_eq!(reranked[0].record.outcome_tag, OutcomeTag::Good);
    }

    #[test]
    fn validation_bonus_is_capped() {
        let results = vec![scored(0.5, 0.5, OutcomeTag::Neutral, 10_000, 0.5)];
        let reranked = rerank_results(results, 0.1);
        assert!(reranked[0].score <= 1.0);
    }

    #[test]
    fn score_never_goes_negative() {
        let results = vec![scored(0.5, 0.0, OutcomeTag::Bad, 0, 0.05)];
        let reranked = rerank_results(results, 1.0);
        assert_eq!(reranked[0].score, 0.0);
    }
}
