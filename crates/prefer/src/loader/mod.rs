//! Configuration source loaders.
//!
//! Responsibilities:
//! - Define the `Loader` contract: discover a source for an identifier,
//!   read it, and report watch-triggered updates.
//! - Define the `LoadResult` payload and the `LoaderEvent` update channel.
//!
//! Does NOT handle:
//! - Parsing loaded content (see `formatter`).
//! - Choosing which loader handles an identifier (see `provider.rs` and
//!   `defaults.rs`).
//!
//! Invariants:
//! - A `LoadResult` is immutable once produced; each reload produces a new
//!   value.
//! - All watch-triggered outcomes, success and failure alike, flow through
//!   the one `LoaderEvent` channel so downstream listeners have a single
//!   integration point.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::PreferError;

mod file;

pub mod defaults;

pub use file::FileLoader;

/// The raw outcome of loading a source: where it came from and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Resolved absolute path, or the identifier for non-file sources.
    pub source: String,
    /// Raw content as text.
    pub content: String,
}

/// A watch-triggered reload outcome.
#[derive(Debug, Clone)]
pub enum LoaderEvent {
    /// The source changed and was re-read successfully.
    Updated(LoadResult),
    /// The source changed but re-reading it failed.
    UpdateFailed(Arc<PreferError>),
}

/// A source loader: discovers and reads configuration for an identifier.
#[async_trait]
pub trait Loader: Send + Sync {
    /// Whether this loader's payload needs a formatter.
    ///
    /// Loaders that hand back already-structured data return `false`; the
    /// orchestrator then refuses to pair them with this pipeline.
    async fn formatter_required(&self) -> bool {
        true
    }

    /// A format hint for the orchestrator, e.g. a file extension.
    async fn formatter_suggested(&self) -> Option<String> {
        None
    }

    /// Discover and read the source named by `identifier`.
    async fn load(&self, identifier: &str) -> Result<LoadResult, PreferError>;

    /// Subscribe to watch-triggered reload outcomes.
    fn updates(&self) -> broadcast::Receiver<LoaderEvent>;
}
