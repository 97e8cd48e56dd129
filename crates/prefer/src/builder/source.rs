//! Sources contributing partial trees to a layered configuration.
//!
//! Responsibilities:
//! - Define the `Source` contract and its variants: memory, file, optional
//!   file, environment.
//!
//! Does NOT handle:
//! - Merge semantics (see `mod.rs`).
//!
//! Invariants:
//! - File sources run the `Prefer` pipeline with watching disabled: a
//!   one-shot merge has no listener to serve.
//! - `OptionalFileSource` maps ANY load failure to an empty tree. This is
//!   the only sanctioned swallow in the crate.
//! - `EnvSource` collisions resolve last-write-wins in the platform's
//!   enumeration order, which is not deterministic across platforms.

use std::path::Path;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::accessor;
use crate::error::PreferError;
use crate::options::{FileOptions, LoadOptions};
use crate::prefer::Prefer;

/// A contributor of one partial configuration tree.
#[async_trait]
pub trait Source: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Load this source's partial tree.
    async fn load(&self) -> Result<Map<String, Value>, PreferError>;
}

/// Fixed in-memory data.
pub struct MemorySource {
    data: Map<String, Value>,
}

impl MemorySource {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }
}

#[async_trait]
impl Source for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Map<String, Value>, PreferError> {
        Ok(self.data.clone())
    }
}

/// A configuration file loaded through the `Prefer` pipeline.
pub struct FileSource {
    identifier: String,
    required: bool,
}

impl FileSource {
    /// A required file: load failures propagate.
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            required: true,
        }
    }

    /// An optional file: load failures yield an empty tree.
    pub fn optional(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            required: false,
        }
    }

    async fn load_tree(&self) -> Result<Map<String, Value>, PreferError> {
        let path = Path::new(&self.identifier);

        // Absolute identifiers search only their parent directory for the
        // base name; relative ones use the standard search paths.
        let options = if path.is_absolute() {
            let search_paths = path
                .parent()
                .map(|parent| vec![parent.to_path_buf()])
                .unwrap_or_default();
            let base = path
                .file_name()
                .and_then(|name| name.to_str())
                .ok_or_else(|| PreferError::FilesNotFound(self.identifier.clone()))?;
            LoadOptions::new(base).with_files(
                FileOptions::default()
                    .with_watch(false)
                    .with_search_paths(search_paths),
            )
        } else {
            LoadOptions::new(self.identifier.clone())
                .with_files(FileOptions::default().with_watch(false))
        };

        let configurator = Prefer::new().load_with(options).await?;
        match configurator.into_context() {
            Value::Object(map) => Ok(map),
            other => Err(PreferError::Format {
                format: "config".to_string(),
                message: format!(
                    "{}: expected a mapping at the top level, got {}",
                    self.identifier,
                    kind_of(&other)
                ),
            }),
        }
    }
}

#[async_trait]
impl Source for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Map<String, Value>, PreferError> {
        match self.load_tree().await {
            Ok(tree) => Ok(tree),
            Err(err) if !self.required => {
                tracing::debug!(
                    identifier = %self.identifier,
                    error = %err,
                    "optional file skipped"
                );
                Ok(Map::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// A `FileSource` that yields an empty tree instead of failing.
pub struct OptionalFileSource {
    inner: FileSource,
}

impl OptionalFileSource {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            inner: FileSource::optional(identifier),
        }
    }
}

#[async_trait]
impl Source for OptionalFileSource {
    fn name(&self) -> &'static str {
        "optional file"
    }

    async fn load(&self) -> Result<Map<String, Value>, PreferError> {
        self.inner.load().await
    }
}

/// Environment variables with a common prefix, mapped to a nested tree.
///
/// `MYAPP__DATABASE__HOST=localhost` with prefix `MYAPP` and separator
/// `__` produces `{database: {host: "localhost"}}`. All values are strings.
/// When two variables collide on a leaf, the one enumerated last wins;
/// enumeration order is platform-dependent.
pub struct EnvSource {
    prefix: String,
    separator: String,
}

impl EnvSource {
    /// Variables starting with `PREFIX__`.
    pub fn new(prefix: &str) -> Self {
        Self::with_separator(prefix, "__")
    }

    /// Variables starting with `PREFIX<separator>`.
    pub fn with_separator(prefix: &str, separator: &str) -> Self {
        Self {
            prefix: format!("{}{}", prefix.to_uppercase(), separator),
            separator: separator.to_string(),
        }
    }
}

#[async_trait]
impl Source for EnvSource {
    fn name(&self) -> &'static str {
        "env"
    }

    async fn load(&self) -> Result<Map<String, Value>, PreferError> {
        let mut result = Map::new();

        for (name, value) in std::env::vars_os() {
            let (Some(name), Some(value)) = (name.to_str(), value.to_str()) else {
                continue;
            };
            let Some(stripped) = name.strip_prefix(&self.prefix) else {
                continue;
            };

            let config_key = stripped.to_lowercase();
            let segments: Vec<&str> = config_key.split(self.separator.as_str()).collect();
            set_nested(&mut result, &segments, value.to_string())?;
        }

        Ok(result)
    }
}

fn set_nested(
    map: &mut Map<String, Value>,
    segments: &[&str],
    value: String,
) -> Result<(), PreferError> {
    let Some((last, intermediates)) = segments.split_last() else {
        return Ok(());
    };

    let mut current = map;
    for segment in intermediates {
        accessor::check_pollution(segment)?;
        let child = current
            .entry((*segment).to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        current = match child {
            Value::Object(map) => map,
            _ => unreachable!("child was just coerced into a mapping"),
        };
    }

    accessor::check_pollution(last)?;
    current.insert((*last).to_string(), Value::String(value));
    Ok(())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use serial_test::serial;

    #[tokio::test]
    async fn test_memory_source_returns_a_copy() {
        let mut data = Map::new();
        data.insert("port".to_string(), json!(8080));
        let source = MemorySource::new(data.clone());

        let mut loaded = source.load().await.unwrap();
        loaded.insert("port".to_string(), json!(1));
        assert_eq!(source.load().await.unwrap(), data);
    }

    #[test]
    #[serial]
    fn test_env_source_builds_nested_tree() {
        temp_env::with_vars(
            [
                ("MYAPP__DATABASE__HOST", Some("localhost")),
                ("MYAPP__DATABASE__PORT", Some("5432")),
                ("MYAPP__DEBUG", Some("true")),
                ("OTHER__IGNORED", Some("x")),
            ],
            || {
                let loaded =
                    futures::executor::block_on(EnvSource::new("myapp").load()).unwrap();
                assert_eq!(
                    Value::Object(loaded),
                    json!({
                        "database": {"host": "localhost", "port": "5432"},
                        "debug": "true",
                    })
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_env_source_custom_separator() {
        temp_env::with_vars([("APP_SERVER_HOST", Some("0.0.0.0"))], || {
            let loaded =
                futures::executor::block_on(EnvSource::with_separator("app", "_").load())
                    .unwrap();
            assert_eq!(
                Value::Object(loaded),
                json!({"server": {"host": "0.0.0.0"}})
            );
        });
    }

    #[tokio::test]
    async fn test_optional_file_source_swallows_missing_file() {
        let source = OptionalFileSource::new("definitely-missing-config.json");
        assert_eq!(source.load().await.unwrap(), Map::new());
    }
}
