//! Source-change and rebuild event definitions.

use std::path::{Path, PathBuf};

/// Filtered file system change affecting a watched source file.
#[derive(Debug, Clone)]
pub enum SourceChange {
    /// A source file was created or modified.
    Changed {
        /// Path to the changed file.
        path: PathBuf,
    },
    /// A source file was removed.
    Removed {
        /// Path to the removed file.
        path: PathBuf,
    },
}

impl SourceChange {
    /// Path of the affected file.
    pub fn path(&self) -> &Path {
        match self {
            SourceChange::Changed { path } | SourceChange::Removed { path } => path,
        }
    }
}

/// Debounced batch of source changes triggering one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadBatch {
    /// Deduplicated, sorted paths changed within the debounce window.
    pub paths: Vec<PathBuf>,
}

/// Compilation fault produced by a failed rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDiagnostic {
    /// Compiler message, never empty on the wire.
    pub message: String,
    /// Stack or full diagnostic text, when available.
    pub stack: Option<String>,
    /// Source file the fault points at.
    pub file: Option<String>,
    /// Line within `file`.
    pub line: Option<u32>,
    /// Column within `file`.
    pub column: Option<u32>,
}

impl BuildDiagnostic {
    /// Creates a diagnostic with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
            file: None,
            line: None,
            column: None,
        }
    }

    /// Attaches the source location the diagnostic points at.
    #[must_use]
    pub fn with_location(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}
