//! Pure clustering and survivor-selection logic (SPEC_FULL.md §4.6). No
//! I/O; operates over already-scrolled records and their embeddings.

use strata_core::record::{MemoryRecord, OutcomeTag};
use strata_core::constants::MIN_DUPLICATE_CLUSTER_SIZE;

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot as f64) / ((norm_a as f64) * (norm_b as f64))
}

/// Pairwise-scan `records` with a seed-based clustering: for each not yet
/// visited record taken in order as a seed, its cluster is every
/// not-yet-visited record (including itself) whose cosine similarity to
/// the seed's embedding exceeds `threshold`. Every visited record is
/// removed from further consideration this pass, so one pass never
/// revisits a record across clusters. Records without an embedding are
/// skipped (never clustered, never marked visited).
pub fn cluster_by_similarity(records: &[MemoryRecord], threshold: f64) -> Vec<Vec<usize>> {
    let mut visited = vec![false; records.len()];
    let mut clusters = Vec::new();

    for seed_idx in 0..records.len() {
        if visited[seed_idx] {
            continue;
        }
        let Some(seed_embedding) = &records[seed_idx].embedding else {
            continue;
        };
        visited[seed_idx] = true;

        let mut cluster = vec![seed_idx];
        for other_idx in (seed_idx + 1)..records.len() {
            if visited[other_idx] {
                continue;
            }
            let Some(other_embedding) = &records[other_idx].embedding else {
                continue;
            };
            if cosine_similarity(seed_embedding, other_embedding) > threshold {
                visited[other_idx] = true;
                cluster.push(other_idx);
            }
        }

        if cluster.len() >= MIN_DUPLICATE_CLUSTER_SIZE {
            clusters.push(cluster);
        }
    }

    clusters
}

/// Pick the survivor from a cluster: maximum `importance_score`, ties
/// broken by earliest `created_at`.
pub fn pick_survivor<'a>(records: &'a [MemoryRecord], cluster: &[usize]) -> &'a MemoryRecord {
    cluster
        .iter()
        .map(|&idx| &records[idx])
        .max_by(|a, b| {
            a.importance_score
                .partial_cmp(&b.importance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.created_at.cmp(&a.created_at))
        })
        .expect("cluster is never empty")
}

/// Bayesian trust recompute (SPEC_FULL.md §4.6):
/// `(good + 2) / (total + 4)` where `total` is the summed validation
/// count and `good` is `total` for a good outcome, `0` for bad, and
/// `total * 0.5` for neutral or unset.
pub fn recompute_trust(outcome: OutcomeTag, total_validation_count: u64) -> f64 {
    let total = total_validation_count as f64;
    let good = match outcome {
        OutcomeTag::Good => total,
        OutcomeTag::Bad => 0.0,
        OutcomeTag::Neutral | OutcomeTag::Unset => total * 0.5,
    };
    (good + 2.0) / (total + 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use strata_core::record::{MemoryId, Owner};

    fn record_with(embedding: Vec<f32>, importance: f64) -> MemoryRecord {
        let mut record = MemoryRecord::new("x".into(), Owner::Collective, importance);
        record.id = MemoryId::new();
        record.embedding = Some(embedding);
        record
    }

    #[test]
    fn identical_vectors_have_similarity_one() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
    }

    #[test]
    fn cluster_requires_at_least_three_members() {
        let records = vec![
            record_with(vec![1.0, 0.0], 0.5),
            record_with(vec![1.0, 0.0], 0.5),
        ];
        let clusters = cluster_by_similarity(&records, 0.95);
        assert!(clusters.is_empty());
    }

    #[test]
    fn three_near_identical_vectors_form_a_cluster() {
        let records = vec![
            record_with(vec![1.0, 0.0], 0.5),
            record_with(vec![0.999, 0.001], 0.5),
            record_with(vec![0.998, 0.002], 0.5),
            record_with(vec![0.0, 1.0], 0.5),
        ];
        let clusters = cluster_by_similarity(&records, 0.95);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
    }

    #[test]
    fn survivor_is_highest_importance() {
        let records = vec![
            record_with(vec![1.0, 0.0], 0.3),
            record_with(vec![1.0, 0.0], 0.9),
            record_with(vec![1.0, 0.0], 0.5),
        ];
        let survivor = pick_survivor(&records, &[0, 1, 2]);
        assert_eq!(survivor.importance_score, 0.9);
    }

    #[test]
    fn tied_importance_breaks_toward_earliest_created() {
        let mut older = record_with(vec![1.0, 0.0], 0.5);
        older.created_at = Utc::now() - chrono::Duration::days(5);
        let newer = record_with(vec![1.0, 0.0], 0.5);
        let records = vec![newer, older.clone()];
        let survivor = pick_survivor(&records, &[0, 1]);
        assert_eq!(survivor.created_at, older.created_at);
    }

    #[test]
    fn trust_recompute_matches_bayesian_formula() {
        assert_eq!(recompute_trust(OutcomeTag::Good, 10), 1.0);
        assert_eq!(recompute_trust(OutcomeTag::Bad, 10), 2.0 / 14.0);
        assert_eq!(recompute_trust(OutcomeTag::Neutral, 10), 7.0 / 14.0);
    }
}
