//! Error report data model and wire envelope.
//!
//! This module defines the structured record describing one fault occurrence
//! and the externally tagged envelope it travels in, matching the wire
//! contract expected by the Syntic host shell.

pub mod envelope;
pub mod fault;
pub mod record;

pub use {
    envelope::Envelope,
    fault::Fault,
    record::{ErrorKind, ErrorReport, now_ms},
};
