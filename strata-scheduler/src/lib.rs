//! # strata-scheduler
//!
//! Worker lifecycle supervisor (SPEC_FULL.md §4.9): one long-lived
//! handle that starts the tagger queue, the decay worker, the linker
//! worker, and the principle worker, and coordinates a single graceful
//! shutdown across all of them. Collection bootstrap runs once at
//! startup, before any worker starts.

pub mod supervisor;
pub mod ticker;

pub use supervisor::{Supervisor, SupervisorDeps, SupervisorShutdownReport};
