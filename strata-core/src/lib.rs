//! # strata-core
//!
//! Foundation crate for the Strata memory system.
//! Defines the memory record model, principle slots, shared traits,
//! configuration, constants, errors, and the cancellation primitive.
//! Every other crate in the workspace depends on this.

pub mod cancel;
pub mod config;
pub mod constants;
pub mod errors;
pub mod principle;
pub mod record;
pub mod traits;

pub use cancel::CancellationToken;
pub use config::StrataConfig;
pub use errors::{CortexError, CortexResult};
pub use principle::{PrincipleSlot, PrincipleTable};
pub use record::{MemoryId, MemoryRecord, Owner, OutcomeTag, RecordPatch, Tier};
