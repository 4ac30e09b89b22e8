//! Fallback view shown in place of a faulted subtree.

use crate::report::fault::Fault;

/// Description of the panel rendered while a boundary is errored.
///
/// The shim does not draw anything itself; the host renders this description
/// with whatever widget set it uses and wires the retry control to
/// [`ErrorBoundary::retry`](crate::boundary::ErrorBoundary::retry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackView {
    /// Panel heading.
    pub title: String,
    /// One-line explanation under the heading.
    pub description: String,
    /// The captured fault's message, for a detail pane.
    pub message: Option<String>,
    /// Label for the retry control.
    pub retry_label: String,
}

impl FallbackView {
    /// Builds the default fallback for a captured fault.
    pub fn for_fault(fault: &Fault) -> Self {
        Self {
            title: "Something went wrong".to_string(),
            description: "An error occurred while rendering this component.".to_string(),
            message: Some(fault.message.clone()),
            retry_label: "Try again".to_string(),
        }
    }
}
