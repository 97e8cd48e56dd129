//! File-based configuration loader.
//!
//! Responsibilities:
//! - Discover configuration files across the search paths, by exact name or
//!   by prefix.
//! - Read file contents and, when enabled, watch the resolved file for
//!   changes.
//!
//! Does NOT handle:
//! - Parsing content (see `formatter`).
//! - Assembling the search-path list (see `pathing.rs`; the list arrives in
//!   the options).
//!
//! Invariants:
//! - Discovery probes all search directories concurrently; a failing
//!   directory contributes nothing and never aborts the others.
//! - Exact mode returns the single highest-priority existing path and
//!   discards lower-priority hits. Prefix mode aggregates matches from all
//!   directories in (search-path priority, directory listing) order.
//! - Overlapping change notifications for one file are neither debounced
//!   nor serialized; the last reload to finish determines the state that is
//!   emitted last.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{Mutex, broadcast, mpsc};

use super::{Loader, LoaderEvent, LoadResult};
use crate::error::PreferError;
use crate::options::LoadOptions;

/// Loads configuration files from a prioritized list of directories.
pub struct FileLoader {
    options: LoadOptions,
    events: broadcast::Sender<LoaderEvent>,
    watchers: Mutex<Vec<RecommendedWatcher>>,
}

impl FileLoader {
    pub fn new(options: LoadOptions) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            options,
            events,
            watchers: Mutex::new(Vec::new()),
        }
    }

    /// The options this loader was constructed with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Find the highest-priority existing file named `name`.
    ///
    /// Every search directory is probed concurrently; the first existing
    /// candidate in search-path priority order wins and lower-priority
    /// matches are discarded.
    pub async fn find(&self, name: &str) -> Result<PathBuf, PreferError> {
        let probes = self
            .options
            .files
            .search_paths
            .iter()
            .map(|directory| probe_exact(directory, name));

        let found = join_all(probes)
            .await
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| PreferError::FilesNotFound(name.to_string()))?;

        tracing::debug!(path = %found.display(), "discovered configuration file");
        Ok(found)
    }

    /// Find all files whose name starts with `name`, across every search
    /// directory, ordered by search-path priority then directory listing.
    pub async fn find_by_prefix(&self, name: &str) -> Result<Vec<PathBuf>, PreferError> {
        let probes = self
            .options
            .files
            .search_paths
            .iter()
            .map(|directory| probe_prefix(directory, name));

        let matches: Vec<PathBuf> = join_all(probes).await.into_iter().flatten().collect();
        if matches.is_empty() {
            return Err(PreferError::FilesNotFound(name.to_string()));
        }

        tracing::debug!(prefix = name, count = matches.len(), "discovered candidates");
        Ok(matches)
    }

    /// Read the full text content of `path`.
    pub async fn get(&self, path: &Path) -> Result<LoadResult, PreferError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PreferError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(LoadResult {
            source: path.display().to_string(),
            content,
        })
    }

    /// Watch `path` for changes. Each notification re-reads the file and
    /// dispatches the outcome on the update channel.
    pub async fn watch(&self, path: &Path) -> Result<(), PreferError> {
        let (notifications, mut changed) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |outcome: notify::Result<Event>| {
                if let Ok(event) = outcome {
                    if event.kind.is_modify() || event.kind.is_create() {
                        let _ = notifications.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(path, RecursiveMode::NonRecursive)?;
        self.watchers.lock().await.push(watcher);

        tracing::debug!(path = %path.display(), "watching configuration file");

        let events = self.events.clone();
        let path = path.to_path_buf();
        tokio::spawn(async move {
            while changed.recv().await.is_some() {
                let event = match tokio::fs::read_to_string(&path).await {
                    Ok(content) => LoaderEvent::Updated(LoadResult {
                        source: path.display().to_string(),
                        content,
                    }),
                    Err(source) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %source,
                            "failed to re-read watched file"
                        );
                        LoaderEvent::UpdateFailed(std::sync::Arc::new(PreferError::Read {
                            path: path.clone(),
                            source,
                        }))
                    }
                };
                let _ = events.send(event);
            }
        });

        Ok(())
    }
}

#[async_trait]
impl Loader for FileLoader {
    async fn formatter_suggested(&self) -> Option<String> {
        let identifier = self.options.identifier.as_deref()?;
        let base = base_name(identifier)?;

        if let Some(extension) = extension_after_last_dot(base) {
            return Some(extension.to_string());
        }

        // No extension in the identifier: derive one from the first
        // discovered prefix match.
        let candidates = self.find_by_prefix(identifier).await.ok()?;
        candidates
            .first()
            .and_then(|path| path.extension())
            .and_then(|extension| extension.to_str())
            .map(str::to_string)
    }

    async fn load(&self, identifier: &str) -> Result<LoadResult, PreferError> {
        let base = base_name(identifier).unwrap_or(identifier);

        let path = if !base.contains('.') {
            let mut candidates = self.find_by_prefix(identifier).await?;
            candidates.remove(0)
        } else {
            self.find(identifier).await?
        };

        let result = self.get(&path).await?;

        if self.options.files.watch {
            self.watch(&path).await?;
        }

        Ok(result)
    }

    fn updates(&self) -> broadcast::Receiver<LoaderEvent> {
        self.events.subscribe()
    }
}

fn base_name(identifier: &str) -> Option<&str> {
    Path::new(identifier).file_name().and_then(|name| name.to_str())
}

/// The extension after the last `.` of a base name, when non-empty.
fn extension_after_last_dot(base: &str) -> Option<&str> {
    base.rfind('.')
        .map(|index| &base[index + 1..])
        .filter(|extension| !extension.is_empty())
}

/// Resolve `directory/name` to an absolute path if (and only if) it exists.
async fn probe_exact(directory: &Path, name: &str) -> Option<PathBuf> {
    let candidate = std::path::absolute(directory.join(name)).ok()?;
    tokio::fs::metadata(&candidate)
        .await
        .ok()
        .map(|_| candidate)
}

/// All entries of `directory` whose name starts with `name`. Unreadable
/// directories contribute nothing.
async fn probe_prefix(directory: &Path, name: &str) -> Vec<PathBuf> {
    let Ok(directory) = std::path::absolute(directory) else {
        return Vec::new();
    };
    let Ok(mut entries) = tokio::fs::read_dir(&directory).await else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    while let Ok(Some(entry)) = entries.next_entry().await {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with(name) {
            matches.push(directory.join(file_name));
        }
    }
    matches
}
