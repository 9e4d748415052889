//! Principle engine throughput: contrastive extraction, slot evolution,
//! and identity evolution (SPEC_FULL.md §4.8).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PrincipleMetrics {
    pub candidates_extracted: u64,
    pub new_concepts_filled: u64,
    pub merged: u64,
    pub replaced: u64,
    pub discarded: u64,
    pub identity_updates: u64,
}

impl PrincipleMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_candidates(&mut self, count: u64) {
        self.candidates_extracted += count;
    }

    pub fn record_new_concept(&mut self) {
        self.new_concepts_filled += 1;
    }

    pub fn record_merge(&mut self) {
        self.merged += 1;
    }

    pub fn record_replace(&mut self) {
        self.replaced += 1;
    }

    pub fn record_discard(&mut self) {
        self.discarded += 1;
    }

    pub fn record_identity_update(&mut self) {
        self.identity_updates += 1;
    }
}
