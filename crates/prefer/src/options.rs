//! Load options for the configuration pipeline.
//!
//! Responsibilities:
//! - Define the immutable option values a loader is constructed with.
//!
//! Invariants:
//! - Options are plain values: a loader snapshots them once at construction
//!   and never observes later changes.
//! - `FileOptions::default()` enables watching and uses the standard search
//!   paths of `pathing::get()`.

use std::path::PathBuf;

use crate::pathing;

/// Options for one load through the pipeline.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// What to load: a filename, possibly extensionless.
    pub identifier: Option<String>,
    /// File-loader behavior.
    pub files: FileOptions,
}

impl LoadOptions {
    /// Options for loading `identifier` with default file behavior.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            files: FileOptions::default(),
        }
    }

    /// Replace the file-loader options.
    pub fn with_files(mut self, files: FileOptions) -> Self {
        self.files = files;
        self
    }
}

/// File-loader behavior: discovery locations and change watching.
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Watch the resolved file and emit update events on change.
    pub watch: bool,
    /// Directories to search, highest priority first.
    pub search_paths: Vec<PathBuf>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            watch: true,
            search_paths: pathing::get(),
        }
    }
}

impl FileOptions {
    /// Enable or disable watching.
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Replace the search-path list.
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }
}
