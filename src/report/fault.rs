//! Polymorphic fault values.
//!
//! Faults arrive from very different sources: structured errors that carry a
//! message and possibly a backtrace, panic payloads that may be a string or
//! an arbitrary boxed value, and plain display values. `Fault` normalizes
//! all of them into a non-empty message plus an optional stack trace, and
//! its constructors never panic -- they run inside fault-handling paths.

use std::{any::Any, backtrace::BacktraceStatus::Captured, fmt::Display};

use anyhow::Error;

/// Message used when a fault carries no usable description.
const OPAQUE_MESSAGE: &str = "unknown error";

/// Normalized fault value over the capability set {message, stack}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Human-readable description, never empty.
    pub message: String,
    /// Stack trace, when the source exposed one.
    pub stack: Option<String>,
}

impl Fault {
    /// Creates a fault from a message and optional stack trace.
    ///
    /// An empty message falls back to a fixed non-empty description so the
    /// report invariant holds for any input.
    pub fn new(message: impl Into<String>, stack: Option<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            OPAQUE_MESSAGE.to_string()
        } else {
            message
        };
        Self { message, stack }
    }

    /// Creates a fault from an arbitrary display value with no stack trace.
    pub fn opaque(value: impl Display) -> Self {
        Self::new(value.to_string(), None)
    }

    /// Coerces a panic payload into a fault.
    ///
    /// Panic payloads are duck-typed: string payloads (`panic!("..")`) are
    /// used directly, anything else becomes a fixed opaque description.
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> Self {
        if let Some(message) = payload.downcast_ref::<&str>() {
            Self::new(*message, None)
        } else if let Some(message) = payload.downcast_ref::<String>() {
            Self::new(message.clone(), None)
        } else {
            Self::new("unhandled panic", None)
        }
    }
}

impl From<&str> for Fault {
    fn from(message: &str) -> Self {
        Self::new(message, None)
    }
}

impl From<String> for Fault {
    fn from(message: String) -> Self {
        Self::new(message, None)
    }
}

impl From<&Error> for Fault {
    fn from(error: &Error) -> Self {
        let backtrace = error.backtrace();
        let stack = if backtrace.status() == Captured {
            Some(backtrace.to_string())
        } else {
            None
        };
        Self::new(error.to_string(), stack)
    }
}

impl From<Error> for Fault {
    fn from(error: Error) -> Self {
        Self::from(&error)
    }
}
