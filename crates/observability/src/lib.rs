//! Shared tracing setup for hosts embedding the campus crates.
//!
//! The library crates only emit `tracing` events; whoever owns the process
//! (an app shell, a CLI, a test harness) calls [`init`] once.

/// Initialize process-wide logging from the environment.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init_with(&tracing::TracingConfig::from_env());
}

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, LogFormatError, TracingConfig, init_with};
