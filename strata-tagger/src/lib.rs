//! # strata-tagger
//!
//! Bounded channel of memory ids drained by a fixed worker pool
//! (SPEC_FULL.md §4.3). Each worker loads the record, skips it if already
//! tagged, otherwise runs outcome analysis then concept extraction against
//! the LLM, then patches outcome/concepts/trust/validation in one write.
//! Embedding is regenerated only if the record is missing one at patch
//! time; a failure there aborts that record only.

pub mod concepts;
pub mod outcome;
pub mod queue;
pub mod stats;
pub mod worker;

pub use queue::{TaggerHandle, TaggerQueue};
pub use stats::{TaggerStats, TaggerStatsSnapshot};
pub use worker::{spawn_workers, TaggerDeps, TaggerWorkerConfig};
