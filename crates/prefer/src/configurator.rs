//! Ownership of one loaded configuration tree plus provenance state.
//!
//! Responsibilities:
//! - Own exactly one parsed configuration tree (`context`).
//! - Carry a free-form `state` mapping recording provenance (`source`,
//!   `content`).
//! - Return structurally independent deep copies from every read and write,
//!   so external mutation of a returned value never affects the owned tree.
//!
//! Does NOT handle:
//! - Path traversal mechanics (see `accessor.rs`).
//! - Loading or parsing (see `loader` and `formatter`).
//!
//! Invariants:
//! - `context` is mutable only through `set` and `replace`.
//! - A watch-triggered reload produces a fresh `Configurator`; instances are
//!   never updated in place by the pipeline.

use serde_json::{Map, Value};

use crate::accessor;
use crate::error::PreferError;

/// One loaded configuration tree with read/write access by dotted key path.
#[derive(Debug, Clone)]
pub struct Configurator {
    context: Value,
    state: Map<String, Value>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl Configurator {
    /// Wrap a parsed configuration tree.
    pub fn new(context: Value) -> Self {
        Self {
            context,
            state: Map::new(),
        }
    }

    /// Wrap a parsed tree together with provenance state.
    pub fn with_state(context: Value, state: Map<String, Value>) -> Self {
        Self { context, state }
    }

    /// Get a deep copy of the value at `key`.
    ///
    /// # Errors
    ///
    /// Fails with [`PreferError::KeyNotFound`] when the path does not
    /// resolve, or [`PreferError::PollutedKey`] when a segment is
    /// disallowed.
    pub fn get(&self, key: &str) -> Result<Value, PreferError> {
        accessor::get(&self.context, Some(key))
    }

    /// Get a deep copy of the whole configuration tree.
    pub fn get_all(&self) -> Value {
        self.context.clone()
    }

    /// Set the value at `key`, creating intermediate mappings as needed.
    ///
    /// Returns a deep copy of the value that was set.
    pub fn set(&mut self, key: &str, value: Value) -> Result<Value, PreferError> {
        accessor::set(&mut self.context, Some(key), value)
    }

    /// Replace the entire configuration tree.
    pub fn replace(&mut self, context: Value) {
        self.context = context;
    }

    /// Borrow the owned tree.
    pub fn context(&self) -> &Value {
        &self.context
    }

    /// Consume the configurator, yielding the owned tree.
    pub fn into_context(self) -> Value {
        self.context
    }

    /// Borrow the provenance state.
    pub fn state(&self) -> &Map<String, Value> {
        &self.state
    }

    /// The `source` recorded in the provenance state, if any.
    pub fn source(&self) -> Option<&str> {
        self.state.get("source").and_then(Value::as_str)
    }
}
