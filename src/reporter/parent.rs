//! The embedding parent context.
//!
//! When the hosted application runs inside a Syntic shell, the shell hands
//! it one end of a channel at startup. Posting is fire-and-forget: envelopes
//! are serialized to JSON values and pushed with a non-blocking send, and a
//! full or closed channel simply drops the envelope after the local
//! diagnostic write. There is no acknowledgment and no retry.

use {
    async_channel::{Receiver, Sender, unbounded},
    serde_json::{Value, to_value},
    tracing::debug,
};

use crate::report::envelope::Envelope;

/// One-way link to the embedding parent context.
#[derive(Debug, Clone)]
pub struct ParentLink {
    /// Origin label of the receiving shell.
    origin: String,
    /// Outbound envelope channel.
    tx: Sender<Value>,
}

impl ParentLink {
    /// Creates a link from an origin label and an existing sender.
    ///
    /// # Arguments
    ///
    /// * `origin` - Origin label identifying the receiving shell.
    /// * `tx` - Sender half of the shell's envelope channel.
    pub fn new(origin: impl Into<String>, tx: Sender<Value>) -> Self {
        Self {
            origin: origin.into(),
            tx,
        }
    }

    /// Creates a link backed by a fresh unbounded channel.
    ///
    /// # Returns
    ///
    /// The link and the receiver half for the host (or a test) to consume.
    pub fn channel(origin: impl Into<String>) -> (Self, Receiver<Value>) {
        let (tx, rx) = unbounded();
        (Self::new(origin, tx), rx)
    }

    /// Origin label of the receiving shell.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Posts one envelope, swallowing every failure.
    pub(crate) fn post(&self, envelope: &Envelope) {
        match to_value(envelope) {
            Ok(value) => {
                if self.tx.try_send(value).is_err() {
                    debug!("parent channel unavailable, dropping envelope");
                }
            }
            Err(e) => debug!("failed to serialize envelope: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        report::envelope::Envelope,
        reporter::parent::ParentLink,
    };

    #[test]
    fn test_post_delivers_serialized_envelope() {
        let (link, rx) = ParentLink::channel("https://syntic.app");
        link.post(&Envelope::Ready);

        let value = rx.try_recv().unwrap();
        assert_eq!(value["type"], "SYNTIC_READY");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_post_to_closed_channel_is_silent() {
        let (link, rx) = ParentLink::channel("https://syntic.app");
        drop(rx);
        link.post(&Envelope::Ready);
    }
}
