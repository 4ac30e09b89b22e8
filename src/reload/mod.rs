//! Source-change detection and build-fault forwarding.
//!
//! This module watches the hosted application's source directories with the
//! `notify` crate, debounces change bursts, and drives a caller-supplied
//! rebuild. A successful rebuild posts the `SYNTIC_READY` lifecycle signal
//! to the embedding shell; a failed one is forwarded as a `build`-kind
//! error report. This shares the reporter's channel and is the only
//! producer of `build` reports in the crate.

use std::{
    collections::HashSet,
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use {
    async_channel::{Receiver, Sender},
    notify::{
        Config, Error, Event, RecommendedWatcher,
        RecursiveMode::Recursive,
        Watcher,
        event::EventKind,
    },
    parking_lot::RwLock,
    thiserror::Error as ThisError,
    tracing::debug,
};

use crate::reporter::Reporter;

mod config;
mod debouncer;
mod events;

pub use {
    config::ReloadConfig,
    debouncer::ReloadDebouncer,
    events::{BuildDiagnostic, ReloadBatch, SourceChange},
};

/// Errors raised while setting up or adjusting the reload watcher.
#[derive(ThisError, Debug)]
pub enum ReloadError {
    /// The underlying file system watcher failed.
    #[error("Watcher error: {0}")]
    Watcher(#[from] Error),
}

/// Rebuild callback: turns a change batch into a built application or a
/// compiler diagnostic.
pub type RebuildFn = Box<dyn Fn(&[PathBuf]) -> Result<(), BuildDiagnostic> + Send + Sync>;

/// File system watcher for the hosted application's source tree.
pub struct ReloadWatcher {
    /// Internal notify watcher.
    _watcher: RecommendedWatcher,
    /// Set of currently watched paths.
    watched_paths: Arc<RwLock<HashSet<PathBuf>>>,
    /// Configuration for watcher behavior.
    config: ReloadConfig,
}

impl ReloadWatcher {
    /// Creates a new reload watcher.
    ///
    /// # Arguments
    ///
    /// * `change_sender` - Channel sender for filtered source changes.
    /// * `config` - Optional configuration (uses defaults if None).
    ///
    /// # Returns
    ///
    /// A `Result` containing the `ReloadWatcher` or a `ReloadError`.
    ///
    /// # Errors
    ///
    /// Returns `ReloadError` if the watcher cannot be initialized.
    pub fn new(
        change_sender: Sender<SourceChange>,
        config: Option<ReloadConfig>,
    ) -> Result<Self, ReloadError> {
        let config = config.unwrap_or_default();

        let filter = config.clone();
        let watcher = RecommendedWatcher::new(
            move |res: Result<Event, Error>| {
                Self::handle_raw_event(res, &change_sender, &filter);
            },
            Config::default(),
        )?;

        Ok(Self {
            _watcher: watcher,
            watched_paths: Arc::new(RwLock::new(HashSet::new())),
            config,
        })
    }

    /// Handles raw events from the notify crate.
    ///
    /// Filters to configured source extensions and forwards the result as
    /// `SourceChange` events on the channel.
    fn handle_raw_event(
        res: Result<Event, Error>,
        sender: &Sender<SourceChange>,
        config: &ReloadConfig,
    ) {
        match res {
            Ok(event) => {
                debug!("Raw file system event: {:?}", event);

                for path in &event.paths {
                    if !Self::is_source_file(path, config) {
                        debug!("Ignoring non-source file: {:?}", path);
                        continue;
                    }

                    match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) => {
                            let _ =
                                sender.try_send(SourceChange::Changed { path: path.clone() });
                        }
                        EventKind::Remove(_) => {
                            let _ =
                                sender.try_send(SourceChange::Removed { path: path.clone() });
                        }
                        _ => {
                            debug!("Ignoring event kind {:?} for path: {:?}", event.kind, path);
                        }
                    }
                }
            }
            Err(e) => {
                tracing::error!("File system watcher error: {}", e);
            }
        }
    }

    /// Checks whether a path is a watched source file under the config.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to check.
    /// * `config` - Extension list and hidden-file policy.
    ///
    /// # Returns
    ///
    /// `true` if changes to the path should trigger a rebuild.
    fn is_source_file(path: &Path, config: &ReloadConfig) -> bool {
        // Only Normal components count: `.` and `..` are navigation, not
        // hidden entries.
        if !config.include_hidden
            && path.components().any(|component| match component {
                Component::Normal(name) => name
                    .to_str()
                    .is_some_and(|name| name.starts_with('.')),
                _ => false,
            })
        {
            return false;
        }

        path.extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                config
                    .extensions
                    .iter()
                    .any(|candidate| candidate.eq_ignore_ascii_case(extension))
            })
    }

    /// Adds a directory to be watched recursively.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory path to watch.
    ///
    /// # Errors
    ///
    /// Returns `ReloadError` if the directory cannot be watched.
    pub fn watch_directory<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ReloadError> {
        let path = path.as_ref();
        self.watched_paths.write().insert(path.to_path_buf());
        self._watcher.watch(path, Recursive)?;
        debug!("Started watching directory: {:?}", path);
        Ok(())
    }

    /// Stops watching a directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Directory path to stop watching.
    ///
    /// # Errors
    ///
    /// Returns `ReloadError` if the directory cannot be unwatched.
    pub fn unwatch_directory<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ReloadError> {
        let path = path.as_ref();
        self.watched_paths.write().remove(path);
        self._watcher.unwatch(path)?;
        debug!("Stopped watching directory: {:?}", path);
        Ok(())
    }

    /// Gets the current configuration.
    pub fn config(&self) -> &ReloadConfig {
        &self.config
    }

    /// Gets the set of currently watched paths.
    pub fn watched_paths(&self) -> &Arc<RwLock<HashSet<PathBuf>>> {
        &self.watched_paths
    }
}

/// Drives rebuilds from debounced change batches and forwards the outcome.
pub struct RebuildRunner {
    /// Receiver for debounced rebuild batches.
    batch_receiver: Receiver<ReloadBatch>,
    /// Reporter receiving build faults and ready signals.
    reporter: Reporter,
    /// Caller-supplied rebuild callback.
    rebuild: RebuildFn,
}

impl RebuildRunner {
    /// Creates a new rebuild runner.
    ///
    /// # Arguments
    ///
    /// * `batch_receiver` - Receiver for debounced rebuild batches.
    /// * `reporter` - Reporter for build faults and ready signals.
    /// * `rebuild` - Callback performing the actual rebuild.
    pub fn new(batch_receiver: Receiver<ReloadBatch>, reporter: Reporter, rebuild: RebuildFn) -> Self {
        Self {
            batch_receiver,
            reporter,
            rebuild,
        }
    }

    /// Starts the rebuild loop.
    ///
    /// Each batch triggers one rebuild; success posts `SYNTIC_READY`,
    /// failure posts one `build`-kind report. This method should be run in
    /// a dedicated task.
    pub async fn start_processing(self) {
        while let Ok(batch) = self.batch_receiver.recv().await {
            debug!("Rebuilding after {} changed path(s)", batch.paths.len());
            match (self.rebuild)(&batch.paths) {
                Ok(()) => self.reporter.notify_ready(),
                Err(diagnostic) => self.reporter.report_build_error(&diagnostic),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use {async_channel::unbounded, serde_json::Value};

    use crate::{
        config::ShimSettings,
        reload::{BuildDiagnostic, RebuildRunner, ReloadBatch, ReloadConfig, ReloadWatcher},
        reporter::{ParentLink, Reporter},
    };

    fn test_reporter() -> (Reporter, async_channel::Receiver<Value>) {
        let reporter = Reporter::new(ShimSettings::default());
        let (link, rx) = ParentLink::channel("https://syntic.app");
        reporter.attach_parent(link);
        (reporter, rx)
    }

    #[test]
    fn test_source_file_filter() {
        let config = ReloadConfig::default();
        let test_cases = vec![
            ("src/main.rs", true),
            ("Cargo.toml", true),
            ("assets/app.css", true),
            ("SRC/MAIN.RS", true), // Case insensitive
            ("target/debug/app", false),
            ("notes.txt", false),
            ("src/.hidden.rs", false),
            (".git/config.json", false),
            ("../shared/src/lib.rs", true), // Parent-dir components are not hidden
            ("src/../src/main.rs", true),
        ];

        for (path, expected) in test_cases {
            assert_eq!(
                ReloadWatcher::is_source_file(Path::new(path), &config),
                expected,
                "Failed for path: {}",
                path
            );
        }
    }

    #[test]
    fn test_hidden_files_admitted_when_configured() {
        let config = ReloadConfig {
            include_hidden: true,
            ..ReloadConfig::default()
        };
        assert!(ReloadWatcher::is_source_file(
            Path::new("src/.hidden.rs"),
            &config
        ));
    }

    #[test]
    fn test_current_dir_component_is_not_hidden() {
        let config = ReloadConfig::default();
        assert!(ReloadWatcher::is_source_file(
            Path::new("./src/main.rs"),
            &config
        ));
    }

    #[tokio::test]
    async fn test_successful_rebuild_posts_ready() {
        let (reporter, rx) = test_reporter();
        let (batch_tx, batch_rx) = unbounded();

        let runner = RebuildRunner::new(batch_rx, reporter, Box::new(|_| Ok(())));
        tokio::spawn(runner.start_processing());

        batch_tx
            .send(ReloadBatch {
                paths: vec![PathBuf::from("src/main.rs")],
            })
            .await
            .unwrap();

        let value = rx.recv().await.unwrap();
        assert_eq!(value["type"], "SYNTIC_READY");
    }

    #[tokio::test]
    async fn test_failed_rebuild_posts_build_report() {
        let (reporter, rx) = test_reporter();
        let (batch_tx, batch_rx) = unbounded();

        let runner = RebuildRunner::new(
            batch_rx,
            reporter,
            Box::new(|paths| {
                Err(BuildDiagnostic::new("expected `;`").with_location(
                    paths[0].display().to_string(),
                    3,
                    14,
                ))
            }),
        );
        tokio::spawn(runner.start_processing());

        batch_tx
            .send(ReloadBatch {
                paths: vec![PathBuf::from("src/app.rs")],
            })
            .await
            .unwrap();

        let value = rx.recv().await.unwrap();
        assert_eq!(value["type"], "SYNTIC_ERROR");
        assert_eq!(value["payload"]["type"], "build");
        assert_eq!(value["payload"]["message"], "expected `;`");
        assert_eq!(value["payload"]["source"], "src/app.rs");
        assert_eq!(value["payload"]["line"], 3);
        assert_eq!(value["payload"]["column"], 14);
    }
}
