//! Workspace configuration (SPEC_FULL.md §6.5). A single immutable value
//! handed to component constructors at startup — no live reloading.

use serde::{Deserialize, Serialize};

use crate::constants::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrataConfig {
    pub embedding_dim: usize,
    pub tier_age_days: TierAgeConfig,
    pub importance_modifier: f64,
    pub access_modifier: f64,
    pub decay_schedule_hours: u64,
    pub linker_schedule_hours: u64,
    pub principle_schedule_hours: u64,
    pub tagger: TaggerConfig,
    pub similarity_threshold: f64,
    pub max_links_per_memory: usize,
    pub duplicate_threshold: f64,
    pub co_occurrence_throttle_secs: i64,
    pub good_behavior_bias: f64,
    pub min_principle_rating: f64,
    pub max_page_tokens: usize,
    pub consolidation_scan_limit: usize,
}

impl Default for StrataConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            tier_age_days: TierAgeConfig::default(),
            importance_modifier: 2.0,
            access_modifier: 1.5,
            decay_schedule_hours: 6,
            linker_schedule_hours: 1,
            principle_schedule_hours: 24,
            tagger: TaggerConfig::default(),
            similarity_threshold: 0.8,
            max_links_per_memory: DEFAULT_MAX_LINKS_PER_MEMORY,
            duplicate_threshold: DEFAULT_DUPLICATE_THRESHOLD,
            co_occurrence_throttle_secs: DEFAULT_CO_OCCURRENCE_THROTTLE_SECS,
            good_behavior_bias: 0.0,
            min_principle_rating: MIN_PRINCIPLE_CONFIDENCE,
            max_page_tokens: 2000,
            consolidation_scan_limit: DEFAULT_CONSOLIDATION_SCAN_LIMIT,
        }
    }
}

/// Base decay-eligibility thresholds for each tier transition (days).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierAgeConfig {
    pub recent_to_medium: f64,
    pub medium_to_long: f64,
    pub long_to_ancient: f64,
}

impl Default for TierAgeConfig {
    fn default() -> Self {
        Self {
            recent_to_medium: 7.0,
            medium_to_long: 30.0,
            long_to_ancient: 90.0,
        }
    }
}

/// Tagger queue shape and resilience knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    pub workers: usize,
    pub queue_size: usize,
    pub batch_size: usize,
    pub base_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_delay_secs: u64,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_TAGGER_WORKERS,
            queue_size: DEFAULT_TAGGER_QUEUE_SIZE,
            batch_size: DEFAULT_TAGGER_BATCH_SIZE,
            base_timeout_secs: DEFAULT_TAGGER_TIMEOUT_SECS,
            max_retries: DEFAULT_TAGGER_MAX_RETRIES,
            retry_delay_secs: DEFAULT_TAGGER_RETRY_DELAY_SECS,
        }
    }
}
