//! Process-wide hook installation.
//!
//! The panic hook is installed exactly once per process and never torn down;
//! its lifetime is the process lifetime by design. The hook is observational:
//! after reporting, it delegates to the previously installed hook so default
//! panic surfacing still runs.
//!
//! Faults that are intercepted at a more specific construction site -- a
//! boundary render or a watched task poll -- must not be double-classified
//! as `runtime`, so those sites hold a [`HookSuppressGuard`] while the
//! faultable code is on the stack.

use std::{
    backtrace::{Backtrace, BacktraceStatus::Captured},
    cell::Cell,
    panic::{set_hook, take_hook},
    sync::{Once, OnceLock},
};

use tracing::debug;

use crate::{
    config::ShimSettings,
    report::{
        fault::Fault,
        record::{ErrorKind::Runtime, ErrorReport},
    },
    reporter::Reporter,
};

/// Process-wide reporter instance. First initialization wins.
static GLOBAL: OnceLock<Reporter> = OnceLock::new();

/// One-time guard for panic hook installation.
static PANIC_HOOK: Once = Once::new();

thread_local! {
    /// Depth of suppressing scopes currently on this thread's stack.
    static SUPPRESS_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Initializes the global reporter and installs the panic hook.
///
/// The first call fixes the settings for the process lifetime; later calls
/// return the already-installed reporter unchanged.
///
/// # Arguments
///
/// * `settings` - Shim settings applied on first initialization.
///
/// # Returns
///
/// The process-wide `Reporter` handle.
pub fn init(settings: ShimSettings) -> Reporter {
    let reporter = GLOBAL.get_or_init(|| Reporter::new(settings)).clone();
    install_panic_hook(reporter.clone());
    reporter
}

/// Returns the process-wide reporter, initializing with defaults if needed.
pub fn global() -> Reporter {
    init(ShimSettings::default())
}

/// Installs the runtime-fault panic hook, chaining the previous hook.
fn install_panic_hook(reporter: Reporter) {
    PANIC_HOOK.call_once(|| {
        debug!("installing process panic hook");
        let previous = take_hook();
        set_hook(Box::new(move |info| {
            if !suppressed() {
                let fault = Fault::from_panic_payload(info.payload());
                let backtrace = Backtrace::capture();
                let stack =
                    (backtrace.status() == Captured).then(|| backtrace.to_string());
                let mut report = ErrorReport::new(Runtime, Fault::new(fault.message, stack));
                if let Some(location) = info.location() {
                    report =
                        report.with_location(location.file(), location.line(), location.column());
                }
                reporter.report(report);
            }
            previous(info);
        }));
    });
}

/// Whether a suppressing scope is active on the current thread.
pub(crate) fn suppressed() -> bool {
    SUPPRESS_DEPTH.with(|depth| depth.get() > 0)
}

/// Scope guard that suppresses runtime classification in the panic hook.
///
/// Held across boundary renders and watched task polls; the depth counter
/// unwinds correctly when the guarded code panics.
pub(crate) struct HookSuppressGuard(());

impl HookSuppressGuard {
    pub(crate) fn new() -> Self {
        SUPPRESS_DEPTH.with(|depth| depth.set(depth.get() + 1));
        Self(())
    }
}

impl Drop for HookSuppressGuard {
    fn drop(&mut self) {
        SUPPRESS_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
