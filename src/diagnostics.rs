//! Local diagnostic output setup.
//!
//! The diagnostic channel is plain `tracing`: one `[Syntic] <kind> <message>`
//! line per report, filterable through `RUST_LOG`. Hosts that install their
//! own subscriber can skip this entirely.

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the fmt subscriber with an environment-driven filter.
///
/// Safe to call more than once; installation errors from an already-set
/// global subscriber are ignored.
pub fn init() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
