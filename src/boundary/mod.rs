//! Render-fault interception for component subtrees.
//!
//! An [`ErrorBoundary`] wraps a component and intercepts any panic raised
//! while the component renders: the panic is swallowed, the boundary moves
//! to the errored state, the fault is reported once through the
//! [`Reporter`], and a fallback view is rendered in place of the subtree
//! until a user-initiated retry. The wrapped subtree's crash never
//! propagates further up the tree.

pub mod fallback;

use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::{
    report::fault::Fault,
    reporter::{Reporter, hooks::HookSuppressGuard},
};

pub use fallback::FallbackView;

/// A renderable node in the component tree.
///
/// This is the one capability the shim requires of its UI runtime: the
/// synchronous construction of a subtree's output. Any closure producing a
/// view value satisfies it.
pub trait Component {
    /// The view value this component renders to.
    type View;

    /// Renders the component's subtree.
    fn render(&mut self) -> Self::View;
}

impl<V, F: FnMut() -> V> Component for F {
    type View = V;

    fn render(&mut self) -> V {
        self()
    }
}

/// Boundary lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryState {
    /// The wrapped subtree renders normally (initial state).
    #[default]
    Healthy,
    /// A render fault was captured; the fallback view is shown. Recoverable
    /// via [`ErrorBoundary::retry`].
    Errored,
}

/// Output of one boundary render pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<V> {
    /// The wrapped subtree's own output.
    Content(V),
    /// The fallback shown while the boundary is errored.
    Fallback(FallbackView),
}

type FallbackFactory = Box<dyn Fn(&Fault) -> FallbackView + Send>;

/// Render-fault state machine wrapping one component subtree.
pub struct ErrorBoundary<C: Component> {
    /// The wrapped component.
    child: C,
    /// Path label of the wrapped subtree ("App>Widget").
    component_path: String,
    /// Caller-supplied fallback, if configured.
    fallback: Option<FallbackFactory>,
    /// Fault captured on the last healthy-to-errored transition.
    fault: Option<Fault>,
    /// Reporter receiving one render report per transition.
    reporter: Reporter,
}

impl<C: Component> ErrorBoundary<C> {
    /// Wraps a component, reporting through the process-wide reporter.
    ///
    /// # Arguments
    ///
    /// * `component_path` - Path label identifying the wrapped subtree.
    /// * `child` - The component to wrap.
    pub fn new(component_path: impl Into<String>, child: C) -> Self {
        Self::with_reporter(component_path, child, crate::reporter::global())
    }

    /// Wraps a component, reporting through a specific reporter.
    pub fn with_reporter(
        component_path: impl Into<String>,
        child: C,
        reporter: Reporter,
    ) -> Self {
        Self {
            child,
            component_path: component_path.into(),
            fallback: None,
            fault: None,
            reporter,
        }
    }

    /// Replaces the default fallback with a caller-supplied view.
    #[must_use]
    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&Fault) -> FallbackView + Send + 'static,
    ) -> Self {
        self.fallback = Some(Box::new(fallback));
        self
    }

    /// Renders the wrapped subtree, or the fallback while errored.
    ///
    /// A panic raised by the child transitions the boundary to `Errored`
    /// and reports the fault exactly once; re-rendering while errored
    /// returns the fallback again without reporting.
    pub fn render(&mut self) -> Rendered<C::View> {
        if let Some(fault) = &self.fault {
            return Rendered::Fallback(self.fallback_for(fault));
        }

        let child = &mut self.child;
        let result = {
            // The panic hook must not classify this panic as runtime; the
            // boundary owns it.
            let _guard = HookSuppressGuard::new();
            catch_unwind(AssertUnwindSafe(|| child.render()))
        };

        match result {
            Ok(view) => Rendered::Content(view),
            Err(payload) => {
                let fault = Fault::from_panic_payload(payload.as_ref());
                self.reporter
                    .report_render_error(fault.clone(), self.component_path.clone());
                let view = self.fallback_for(&fault);
                self.fault = Some(fault);
                Rendered::Fallback(view)
            }
        }
    }

    /// User-initiated retry: clears the captured fault and returns the
    /// boundary to `Healthy`.
    ///
    /// The next [`render`](Self::render) re-runs the original subtree; if it
    /// still faults, the boundary re-enters `Errored` through the normal
    /// interception path and a new report is generated.
    pub fn retry(&mut self) {
        self.fault = None;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> BoundaryState {
        if self.fault.is_some() {
            BoundaryState::Errored
        } else {
            BoundaryState::Healthy
        }
    }

    /// The captured fault while errored.
    pub fn fault(&self) -> Option<&Fault> {
        self.fault.as_ref()
    }

    /// Path label of the wrapped subtree.
    pub fn component_path(&self) -> &str {
        &self.component_path
    }

    fn fallback_for(&self, fault: &Fault) -> FallbackView {
        match &self.fallback {
            Some(factory) => factory(fault),
            None => FallbackView::for_fault(fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering::SeqCst},
    };

    use serde_json::Value;

    use crate::{
        boundary::{BoundaryState, ErrorBoundary, FallbackView, Rendered},
        config::ShimSettings,
        reporter::{ParentLink, Reporter},
    };

    fn test_reporter() -> (Reporter, async_channel::Receiver<Value>) {
        let reporter = Reporter::new(ShimSettings::default());
        let (link, rx) = ParentLink::channel("https://syntic.app");
        reporter.attach_parent(link);
        (reporter, rx)
    }

    #[test]
    fn test_healthy_boundary_renders_child() {
        let (reporter, rx) = test_reporter();
        let mut boundary = ErrorBoundary::with_reporter("App", || 41 + 1, reporter);

        assert_eq!(boundary.render(), Rendered::Content(42));
        assert_eq!(boundary.state(), BoundaryState::Healthy);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_render_fault_transitions_and_reports_once() {
        let (reporter, rx) = test_reporter();
        let child = || -> u32 { panic!("widget exploded") };
        let mut boundary = ErrorBoundary::with_reporter("App>Widget", child, reporter);

        let rendered = boundary.render();
        assert_eq!(boundary.state(), BoundaryState::Errored);
        match rendered {
            Rendered::Fallback(view) => {
                assert_eq!(view.message.as_deref(), Some("widget exploded"));
            }
            Rendered::Content(_) => panic!("expected fallback"),
        }

        let value = rx.try_recv().unwrap();
        assert_eq!(value["payload"]["type"], "render");
        assert_eq!(value["payload"]["message"], "widget exploded");
        assert_eq!(value["payload"]["componentStack"], "App>Widget");

        // Re-rendering while errored shows the fallback without reporting.
        assert!(matches!(boundary.render(), Rendered::Fallback(_)));
        assert!(matches!(boundary.render(), Rendered::Fallback(_)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_retry_recovers_and_rerenders_child() {
        let (reporter, rx) = test_reporter();
        let healthy = Arc::new(AtomicBool::new(false));
        let flag = healthy.clone();
        let mut boundary = ErrorBoundary::with_reporter(
            "App",
            move || {
                if flag.load(SeqCst) {
                    "content"
                } else {
                    panic!("first render fails")
                }
            },
            reporter,
        );

        assert!(matches!(boundary.render(), Rendered::Fallback(_)));
        assert!(rx.try_recv().is_ok());

        healthy.store(true, SeqCst);
        boundary.retry();
        assert_eq!(boundary.state(), BoundaryState::Healthy);
        assert_eq!(boundary.render(), Rendered::Content("content"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_retry_with_still_faulting_child_reports_again() {
        let (reporter, rx) = test_reporter();
        let mut boundary =
            ErrorBoundary::with_reporter("App", || -> () { panic!("still broken") }, reporter);

        assert!(matches!(boundary.render(), Rendered::Fallback(_)));
        assert!(rx.try_recv().is_ok());

        boundary.retry();
        assert!(matches!(boundary.render(), Rendered::Fallback(_)));
        assert_eq!(boundary.state(), BoundaryState::Errored);

        // Exactly one new report for the new transition.
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_caller_supplied_fallback_is_used() {
        let (reporter, _rx) = test_reporter();
        let mut boundary =
            ErrorBoundary::with_reporter("App", || -> () { panic!("boom") }, reporter)
                .with_fallback(|fault| FallbackView {
                    title: "Editor crashed".to_string(),
                    description: fault.message.clone(),
                    message: None,
                    retry_label: "Reload".to_string(),
                });

        match boundary.render() {
            Rendered::Fallback(view) => {
                assert_eq!(view.title, "Editor crashed");
                assert_eq!(view.description, "boom");
                assert_eq!(view.retry_label, "Reload");
            }
            Rendered::Content(_) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_captured_fault_is_exposed_while_errored() {
        let (reporter, _rx) = test_reporter();
        let mut boundary =
            ErrorBoundary::with_reporter("App", || -> () { panic!("boom") }, reporter);

        assert!(boundary.fault().is_none());
        let _ = boundary.render();
        assert_eq!(boundary.fault().unwrap().message, "boom");

        boundary.retry();
        assert!(boundary.fault().is_none());
    }
}
