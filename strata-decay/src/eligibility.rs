//! Age-adjusted decay-eligibility formula (SPEC_FULL.md §4.4).
//!
//! ```text
//! real_age_days     = (now - created_at) / 1 day
//! importance_factor = 1 + importance_score * importance_mod
//! access_factor      = 1 + ln(1 + access_count) * access_mod
//! adjusted_age_days  = real_age_days / (importance_factor * access_factor)
//! ```
//!
//! A memory is eligible iff `adjusted_age_days >= base_age_days`.

use chrono::{DateTime, Utc};

pub fn adjusted_age_days(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    importance_score: f64,
    access_count: u64,
    importance_modifier: f64,
    access_modifier: f64,
) -> f64 {
    let real_age_days = (now - created_at).num_seconds() as f64 / 86_400.0;
    let importance_factor = 1.0 + importance_score * importance_modifier;
    let access_factor = 1.0 + ((1.0 + access_count as f64).ln()) * access_modifier;
    real_age_days / (importance_factor * access_factor)
}

#[allow(clippy::too_many_arguments)]
pub fn is_eligible(
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
    importance_score: f64,
    access_count: u64,
    importance_modifier: f64,
    access_modifier: f64,
    base_age_days: f64,
) -> bool {
    adjusted_age_days(
        created_at,
        now,
        importance_score,
        access_count,
        importance_modifier,
        access_modifier,
    ) >= base_age_days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unimportant_unaccessed_memory_reaches_real_age() {
        let now = Utc::now();
        let created = now - Duration::days(10);
        let age = adjusted_age_days(created, now, 0.0, 0, 2.0, 1.5);
        assert!((age - 10.0).abs() < 1e-6);
    }

    #[test]
    fn high_importance_slows_apparent_aging() {
        let now = Utc::now();
        let created = now - Duration::days(10);
        let plain = adjusted_age_days(created, now, 0.0, 0, 2.0, 1.5);
        let important = adjusted_age_days(created, now, 1.0, 0, 2.0, 1.5);
        assert!(important < plain);
    }

    #[test]
    fn frequent_access_slows_apparent_aging() {
        let now = Utc::now();
        let created = now - Duration::days(10);
        let unaccessed = adjusted_age_days(created, now, 0.2, 0, 2.0, 1.5);
        let accessed = adjusted_age_days(created, now, 0.2, 500, 2.0, 1.5);
        assert!(accessed < unaccessed);
    }

    #[test]
    fn eligibility_respects_base_age_threshold() {
        let now = Utc::now();
        let created = now - Duration::days(8);
        assert!(is_eligible(created, now, 0.0, 0, 2.0, 1.5, 7.0));
        assert!(!is_eligible(created, now, 0.0, 0, 2.0, 1.5, 9.0));
    }
}
