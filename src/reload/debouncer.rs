//! Debounced batching of rapid source changes.

use std::{collections::BTreeSet, time::Duration};

use {
    async_channel::{Receiver, Sender},
    tokio::time::sleep,
    tracing::error,
};

use crate::reload::{
    config::ReloadConfig,
    events::{ReloadBatch, SourceChange},
};

/// Collapses bursts of source changes into single rebuild batches.
///
/// Editors commonly touch a file several times per save; one rebuild per
/// keystroke would thrash the compiler. The debouncer waits out the
/// configured delay after the first change, then drains whatever else
/// arrived in the meantime into one batch.
pub struct ReloadDebouncer {
    /// Receiver for filtered source changes.
    change_receiver: Receiver<SourceChange>,
    /// Sender for debounced rebuild batches.
    batch_sender: Sender<ReloadBatch>,
    /// Configuration for debouncing behavior.
    config: ReloadConfig,
}

impl ReloadDebouncer {
    /// Creates a new debouncer.
    ///
    /// # Arguments
    ///
    /// * `change_receiver` - Receiver for filtered source changes.
    /// * `batch_sender` - Sender for debounced rebuild batches.
    /// * `config` - Configuration for debouncing behavior.
    ///
    /// # Returns
    ///
    /// A new `ReloadDebouncer`.
    pub fn new(
        change_receiver: Receiver<SourceChange>,
        batch_sender: Sender<ReloadBatch>,
        config: ReloadConfig,
    ) -> Self {
        Self {
            change_receiver,
            batch_sender,
            config,
        }
    }

    /// Starts the debounced batching loop.
    ///
    /// This method should be run in a dedicated task.
    pub async fn start_processing(self) {
        loop {
            let first = match self.change_receiver.recv().await {
                Ok(change) => change,
                Err(e) => {
                    error!("Error receiving source change: {}", e);
                    break;
                }
            };

            let mut pending = BTreeSet::new();
            pending.insert(first.path().to_path_buf());

            sleep(Duration::from_millis(self.config.debounce_delay_ms)).await;

            while let Ok(change) = self.change_receiver.try_recv() {
                pending.insert(change.path().to_path_buf());
            }

            let batch = ReloadBatch {
                paths: pending.into_iter().collect(),
            };
            if self.batch_sender.send(batch).await.is_err() {
                break;
            }
        }
    }
}
