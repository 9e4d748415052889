//! Structured-logging bootstrap for every binary in the workspace: a
//! single `tracing_subscriber` registry with an env-filter and JSON
//! output, plus per-operation span macros so worker logs carry
//! consistent fields.

pub mod spans;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Call once at process startup; safe to
/// call more than once in tests since it silently no-ops on the second
/// call (the global default can only be set once per process).
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt().with_env_filter(filter).json().try_init();
}
