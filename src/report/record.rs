//! The `ErrorReport` record and its fixed error taxonomy.
//!
//! Reports are constructed synchronously at the moment a fault is classified,
//! serialized once into an outbound envelope, and discarded. They are never
//! retained or mutated after construction.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

use crate::report::fault::Fault;

/// Fixed classification of a fault by its construction site.
///
/// The four kinds are exhaustive and mutually exclusive: a fault is classified
/// by where it was intercepted, never by inspecting its own type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Uncaught synchronous fault (process panic hook).
    Runtime,
    /// Fault thrown while a component subtree was being rendered.
    Render,
    /// Compilation or rebuild fault from the source-reload watcher.
    Build,
    /// Failure of a watched background task that nobody awaited.
    Unhandled,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            ErrorKind::Runtime => "runtime",
            ErrorKind::Render => "render",
            ErrorKind::Build => "build",
            ErrorKind::Unhandled => "unhandled",
        };
        write!(f, "{}", name)
    }
}

/// Structured record describing one fault occurrence.
///
/// Field names on the wire follow the Syntic host contract (`type`,
/// `componentStack`); optional fields are omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Classification of the fault.
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    /// Human-readable description, never empty.
    pub message: String,
    /// Stack trace, when the underlying fault exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Component path for render faults ("App>Widget").
    #[serde(rename = "componentStack", skip_serializing_if = "Option::is_none")]
    pub component_stack: Option<String>,
    /// Source file the fault originated in, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Line within `source`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Column within `source`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    /// Milliseconds since the Unix epoch, captured at classification time.
    pub timestamp: u64,
}

impl ErrorReport {
    /// Creates a report of the given kind from a fault value.
    ///
    /// # Arguments
    ///
    /// * `kind` - Classification assigned by the construction site.
    /// * `fault` - The fault value supplying message and stack.
    ///
    /// # Returns
    ///
    /// A new `ErrorReport` timestamped now.
    pub fn new(kind: ErrorKind, fault: impl Into<Fault>) -> Self {
        let fault = fault.into();
        Self {
            kind,
            message: fault.message,
            stack: fault.stack,
            component_stack: None,
            source: None,
            line: None,
            column: None,
            timestamp: now_ms(),
        }
    }

    /// Attaches the component path of a render fault.
    pub fn with_component_stack(mut self, component_stack: impl Into<String>) -> Self {
        self.component_stack = Some(component_stack.into());
        self
    }

    /// Attaches the source location of the fault.
    pub fn with_location(mut self, source: impl Into<String>, line: u32, column: u32) -> Self {
        self.source = Some(source.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

/// Current time as milliseconds since the Unix epoch.
///
/// Returns 0 if the system clock reads before the epoch; classification
/// paths must not fail on a misconfigured clock.
#[must_use]
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
