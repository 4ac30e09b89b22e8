//! Outbound message envelope shared with the Syntic host shell.

use serde::{Deserialize, Serialize};

use crate::report::record::ErrorReport;

/// Message posted to the embedding parent context.
///
/// The envelope is externally tagged on `type`; error envelopes carry the
/// full report as `payload`, lifecycle signals carry nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    /// One classified fault occurrence.
    #[serde(rename = "SYNTIC_ERROR")]
    Error {
        /// The report describing the fault.
        payload: ErrorReport,
    },
    /// The hosted application finished loading, or a rebuild succeeded.
    #[serde(rename = "SYNTIC_READY")]
    Ready,
}
