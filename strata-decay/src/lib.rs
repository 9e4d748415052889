//! # strata-decay
//!
//! Periodic compressor/decay worker (SPEC_FULL.md §4.4). Each cycle: tag
//! pass (delegated to the tagger queue by the scheduler), then a compress
//! pass per tier transition. Eligibility is age-adjusted by importance and
//! access count so important, frequently-accessed memories decay slower.

pub mod eligibility;
pub mod instructions;
pub mod worker;

pub use eligibility::is_eligible;
pub use instructions::compression_instruction;
pub use worker::{run_compress_pass, DecayDeps, TierCompressionStats};
