//! Nested key access over untyped configuration trees.
//!
//! Responsibilities:
//! - Resolve dot-separated key paths against a `serde_json::Value` tree.
//! - Create or overwrite nested values along a key path.
//! - Reject key segments that match the prototype-pollution blocklist.
//!
//! Does NOT handle:
//! - Isolation of returned values from the owned tree (see
//!   `configurator.rs`, which clones at its boundary).
//! - Merging of whole trees (see `builder`).
//!
//! Invariants:
//! - Every segment of a path is validated before any traversal happens, so
//!   a polluted path never partially mutates the tree.
//! - A leading run of `.` characters is stripped before splitting
//!   (`..a.b` resolves like `a.b`).
//! - `set` turns any non-mapping intermediate into a fresh empty mapping.

use serde_json::{Map, Value};

use crate::error::PreferError;

/// Key segments that are rejected unconditionally, whether or not a Rust
/// tree could actually be affected by them.
const BLOCKED_SEGMENTS: [&str; 3] = ["__proto__", "prototype", "constructor"];

/// Validate a single key segment against the pollution blocklist.
pub fn check_pollution(segment: &str) -> Result<(), PreferError> {
    if BLOCKED_SEGMENTS.contains(&segment) {
        return Err(PreferError::PollutedKey(segment.to_string()));
    }
    Ok(())
}

/// Split a key into segments, stripping any leading dots first.
fn split_key(key: &str) -> Vec<&str> {
    key.trim_start_matches('.').split('.').collect()
}

/// Resolve `key` against `tree`, returning a deep copy of the value.
///
/// With no key (or an empty one) the whole tree is returned. A path that
/// walks through a missing or null node fails with
/// [`PreferError::KeyNotFound`] naming the original key.
pub fn get(tree: &Value, key: Option<&str>) -> Result<Value, PreferError> {
    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => return Ok(tree.clone()),
    };

    let segments = split_key(key);
    for segment in &segments {
        check_pollution(segment)?;
    }

    let mut node = tree;
    for segment in &segments {
        node = match node.get(segment) {
            Some(next) => next,
            None => return Err(PreferError::KeyNotFound(key.to_string())),
        };
    }

    Ok(node.clone())
}

/// Assign `value` at `key` inside `tree`, creating intermediate mappings as
/// needed. With no key the whole tree is replaced.
///
/// Existing intermediates that are not mappings are overwritten with fresh
/// empty mappings. Returns a deep copy of the value that was set.
pub fn set(tree: &mut Value, key: Option<&str>, value: Value) -> Result<Value, PreferError> {
    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => {
            *tree = value.clone();
            return Ok(value);
        }
    };

    let segments = split_key(key);
    for segment in &segments {
        check_pollution(segment)?;
    }

    let mut node = tree;
    if let Some((last, intermediates)) = segments.split_last() {
        for segment in intermediates {
            let map = ensure_map(node);
            let child = map
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            node = child;
        }
        ensure_map(node).insert((*last).to_string(), value.clone());
    }

    Ok(value)
}

/// Coerce `node` into a mapping, replacing any other value kind.
fn ensure_map(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just coerced into a mapping"),
    }
}
