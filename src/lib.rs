//! Syntic shim - error forwarding for hosted applications.
//!
//! An application embedded in a Syntic shell forwards every fault it cannot
//! handle to that shell as a structured message: render faults intercepted
//! by an [`ErrorBoundary`], uncaught panics caught by the process-wide hook,
//! failures of watched background tasks, and compiler faults from the
//! source-reload watcher. Dispatch is one-way and best-effort; when no shell
//! is attached the shim degrades to local diagnostics and never fails.
//!
//! Typical startup:
//!
//! ```no_run
//! use syntic_shim::{ParentLink, ShimSettings, reporter};
//!
//! let settings = ShimSettings::load_or_default(syntic_shim::config::get_config_path())
//!     .unwrap_or_default();
//! let reporter = reporter::init(settings);
//!
//! // Attach the channel the shell handed us, then announce readiness.
//! let (link, _shell_rx) = ParentLink::channel("https://syntic.app");
//! reporter.attach_parent(link);
//! reporter.notify_ready();
//! ```

pub mod boundary;
pub mod config;
pub mod diagnostics;
pub mod reload;
pub mod report;
pub mod reporter;

// Re-export key types for convenience
pub use {
    boundary::{BoundaryState, Component, ErrorBoundary, FallbackView, Rendered},
    config::{SettingsError, ShimSettings},
    reload::{
        BuildDiagnostic, RebuildRunner, ReloadBatch, ReloadConfig, ReloadDebouncer, ReloadError,
        ReloadWatcher, SourceChange,
    },
    report::{Envelope, ErrorKind, ErrorReport, Fault},
    reporter::{ParentLink, Reporter},
};
