//! Error classification and outbound dispatch.
//!
//! The `Reporter` is the single point through which every fault leaves the
//! application: it writes one local diagnostic line per report and, when a
//! parent link is attached, posts the serialized envelope to the embedding
//! shell. Dispatch is fire-and-forget and must never fail -- the reporter
//! runs inside fault-handling paths where a panic of its own would recurse
//! straight back into the hooks.

pub mod hooks;
pub mod parent;

use std::{
    future::{Future, poll_fn},
    panic::{AssertUnwindSafe, catch_unwind},
    sync::Arc,
    task::Poll,
};

use {
    parking_lot::RwLock,
    tokio::task::JoinHandle,
    tracing::{debug, error},
};

use crate::{
    config::ShimSettings,
    reload::BuildDiagnostic,
    report::{
        envelope::Envelope,
        fault::Fault,
        record::{
            ErrorKind::{Build, Render, Unhandled},
            ErrorReport,
        },
    },
    reporter::hooks::HookSuppressGuard,
};

pub use {
    hooks::{global, init},
    parent::ParentLink,
};

/// Classification and dispatch handle, cheap to clone.
#[derive(Debug, Clone)]
pub struct Reporter {
    inner: Arc<ReporterInner>,
}

#[derive(Debug)]
pub(crate) struct ReporterInner {
    /// Settings fixed at construction.
    settings: ShimSettings,
    /// Attached embedding context, if any.
    parent: RwLock<Option<ParentLink>>,
}

impl Reporter {
    /// Creates a detached reporter with the given settings.
    ///
    /// # Arguments
    ///
    /// * `settings` - Target-origin policy and reload settings.
    ///
    /// # Returns
    ///
    /// A new `Reporter` with no parent link attached.
    pub fn new(settings: ShimSettings) -> Self {
        Self {
            inner: Arc::new(ReporterInner {
                settings,
                parent: RwLock::new(None),
            }),
        }
    }

    /// Attaches the embedding parent context.
    ///
    /// Replaces any previously attached link.
    pub fn attach_parent(&self, link: ParentLink) {
        *self.inner.parent.write() = Some(link);
    }

    /// Detaches the embedding parent context, if one is attached.
    pub fn detach_parent(&self) {
        *self.inner.parent.write() = None;
    }

    /// Whether an embedding parent context is currently attached.
    pub fn is_embedded(&self) -> bool {
        self.inner.parent.read().is_some()
    }

    /// Dispatches a fully-formed report.
    ///
    /// Always writes the local diagnostic line. The envelope post happens
    /// only when a parent link is attached and admitted by the configured
    /// target-origin policy; every failure past the diagnostic write is
    /// swallowed.
    pub fn report(&self, report: ErrorReport) {
        error!(target: "syntic", "[Syntic] {} {}", report.kind, report.message);

        let parent = self.inner.parent.read();
        let Some(link) = parent.as_ref() else {
            return;
        };
        if let Some(target) = &self.inner.settings.target_origin
            && link.origin() != target
        {
            debug!(
                origin = link.origin(),
                target = target.as_str(),
                "parent origin not admitted, dropping envelope"
            );
            return;
        }
        link.post(&Envelope::Error { payload: report });
    }

    /// Reports a fault thrown during the render of a component subtree.
    ///
    /// # Arguments
    ///
    /// * `fault` - The captured render fault.
    /// * `component_path` - Path of the subtree that faulted ("App>Widget").
    pub fn report_render_error(&self, fault: impl Into<Fault>, component_path: impl Into<String>) {
        self.report(ErrorReport::new(Render, fault).with_component_stack(component_path));
    }

    /// Reports a compilation fault from the source-reload watcher.
    pub fn report_build_error(&self, diagnostic: &BuildDiagnostic) {
        let mut report = ErrorReport::new(
            Build,
            Fault::new(diagnostic.message.clone(), diagnostic.stack.clone()),
        );
        if let Some(file) = &diagnostic.file {
            report = report.with_location(
                file.clone(),
                diagnostic.line.unwrap_or(0),
                diagnostic.column.unwrap_or(0),
            );
        }
        self.report(report);
    }

    /// Reports a top-level failure of a watched background task.
    pub fn report_unhandled(&self, fault: impl Into<Fault>) {
        self.report(ErrorReport::new(Unhandled, fault));
    }

    /// Posts the `SYNTIC_READY` lifecycle signal.
    ///
    /// Emitted by the host once after startup and after each successful
    /// rebuild cycle. A no-op when detached or when the origin policy
    /// rejects the attached link.
    pub fn notify_ready(&self) {
        debug!("notifying parent that the application is ready");

        let parent = self.inner.parent.read();
        let Some(link) = parent.as_ref() else {
            return;
        };
        if let Some(target) = &self.inner.settings.target_origin
            && link.origin() != target
        {
            return;
        }
        link.post(&Envelope::Ready);
    }

    /// Spawns a background task whose top-level failure is reported.
    ///
    /// An `Err` outcome or a panic during any poll produces exactly one
    /// `unhandled` report. Polls run under the hook suppression guard so a
    /// panicking task is not also classified as a runtime fault.
    ///
    /// # Arguments
    ///
    /// * `future` - The task body.
    ///
    /// # Returns
    ///
    /// An observational join handle; the task outcome is already handled.
    pub fn spawn_watched<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let reporter = self.clone();
        tokio::spawn(async move {
            let mut future = Box::pin(future);
            let outcome: Result<(), Fault> = poll_fn(move |cx| {
                let _guard = HookSuppressGuard::new();
                match catch_unwind(AssertUnwindSafe(|| future.as_mut().poll(cx))) {
                    Ok(Poll::Pending) => Poll::Pending,
                    Ok(Poll::Ready(result)) => Poll::Ready(result.map_err(Fault::from)),
                    Err(payload) => {
                        Poll::Ready(Err(Fault::from_panic_payload(payload.as_ref())))
                    }
                }
            })
            .await;

            if let Err(fault) = outcome {
                reporter.report_unhandled(fault);
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn inner_for_tests(&self) -> &Arc<ReporterInner> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use serde_json::Value;

    use crate::{
        config::ShimSettings,
        reload::BuildDiagnostic,
        report::{
            fault::Fault,
            record::{ErrorKind::Runtime, ErrorReport},
        },
        reporter::{ParentLink, Reporter},
    };

    fn embedded_reporter(settings: ShimSettings) -> (Reporter, async_channel::Receiver<Value>) {
        let reporter = Reporter::new(settings);
        let (link, rx) = ParentLink::channel("https://syntic.app");
        reporter.attach_parent(link);
        (reporter, rx)
    }

    #[test]
    fn test_detached_report_is_a_no_op() {
        let reporter = Reporter::new(ShimSettings::default());
        assert!(!reporter.is_embedded());
        reporter.report(ErrorReport::new(Runtime, "boom"));
        reporter.notify_ready();
    }

    #[test]
    fn test_embedded_report_posts_one_envelope() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());
        assert!(reporter.is_embedded());

        reporter.report(ErrorReport::new(Runtime, "boom"));

        let value = rx.try_recv().unwrap();
        assert_eq!(value["type"], "SYNTIC_ERROR");
        assert_eq!(value["payload"]["type"], "runtime");
        assert_eq!(value["payload"]["message"], "boom");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_render_error_carries_component_path() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        reporter.report_render_error("boom", "App>Widget");

        let value = rx.try_recv().unwrap();
        assert_eq!(value["payload"]["type"], "render");
        assert_eq!(value["payload"]["message"], "boom");
        assert_eq!(value["payload"]["componentStack"], "App>Widget");
        assert!(value["payload"]["timestamp"].as_u64().unwrap() > 0);
    }

    #[test]
    fn test_unhandled_report_from_structured_reason() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        reporter.report_unhandled(Fault::new("x", Some("y".into())));

        let value = rx.try_recv().unwrap();
        assert_eq!(value["payload"]["type"], "unhandled");
        assert_eq!(value["payload"]["message"], "x");
        assert_eq!(value["payload"]["stack"], "y");
    }

    #[test]
    fn test_build_error_carries_location() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        reporter.report_build_error(&BuildDiagnostic {
            message: "expected `;`".into(),
            stack: None,
            file: Some("src/app.rs".into()),
            line: Some(42),
            column: Some(7),
        });

        let value = rx.try_recv().unwrap();
        assert_eq!(value["payload"]["type"], "build");
        assert_eq!(value["payload"]["source"], "src/app.rs");
        assert_eq!(value["payload"]["line"], 42);
        assert_eq!(value["payload"]["column"], 7);
    }

    #[test]
    fn test_target_origin_policy_rejects_mismatch() {
        let settings = ShimSettings {
            target_origin: Some("https://other.example".into()),
            ..ShimSettings::default()
        };
        let (reporter, rx) = embedded_reporter(settings);

        reporter.report(ErrorReport::new(Runtime, "boom"));
        reporter.notify_ready();

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_target_origin_policy_admits_match() {
        let settings = ShimSettings {
            target_origin: Some("https://syntic.app".into()),
            ..ShimSettings::default()
        };
        let (reporter, rx) = embedded_reporter(settings);

        reporter.notify_ready();
        assert_eq!(rx.try_recv().unwrap()["type"], "SYNTIC_READY");
    }

    #[tokio::test]
    async fn test_watched_task_error_reports_unhandled() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        let handle = reporter.spawn_watched(async { Err(anyhow!("connection reset")) });
        handle.await.unwrap();

        let value = rx.recv().await.unwrap();
        assert_eq!(value["payload"]["type"], "unhandled");
        assert_eq!(value["payload"]["message"], "connection reset");
    }

    #[tokio::test]
    async fn test_watched_task_panic_reports_unhandled_not_runtime() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        let handle = reporter.spawn_watched(async { panic!("task exploded") });
        handle.await.unwrap();

        let value = rx.recv().await.unwrap();
        assert_eq!(value["payload"]["type"], "unhandled");
        assert_eq!(value["payload"]["message"], "task exploded");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_watched_task_success_reports_nothing() {
        let (reporter, rx) = embedded_reporter(ShimSettings::default());

        let handle = reporter.spawn_watched(async { Ok(()) });
        handle.await.unwrap();

        assert!(rx.try_recv().is_err());
    }
}
