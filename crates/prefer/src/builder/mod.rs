//! Layered configuration composed from multiple ordered sources.
//!
//! Responsibilities:
//! - Deep-merge partial trees, later sources overriding earlier ones.
//! - Provide the `ConfigBuilder` fluent API and the `TypedConfig` accessor
//!   over the merged result.
//! - Load a `.env` file before env sources are read, honoring the
//!   `DOTENV_DISABLED` gate.
//!
//! Does NOT handle:
//! - Individual source mechanics (see `source.rs`).
//! - File discovery and parsing (delegated to the `Prefer` pipeline by the
//!   file sources).
//!
//! Invariants:
//! - Sources load strictly sequentially: merge order is load order.
//! - `deep_merge` never mutates its inputs; mappings merge recursively and
//!   every other value kind (arrays included) is replaced wholesale.
//! - Every merged key is checked against the pollution blocklist before it
//!   is written.
//! - Dotenv failures never include raw .env line contents.

use serde_json::{Map, Value};

use crate::accessor;
use crate::configurator::Configurator;
use crate::error::PreferError;

mod source;

pub use source::{EnvSource, FileSource, MemorySource, OptionalFileSource, Source};

/// Merge `overlay` over `base` into a fresh tree.
///
/// Keys present in both sides merge recursively when both values are
/// mappings; otherwise the overlay value replaces the base value wholesale.
/// Arrays are never merged element-wise.
pub fn deep_merge(
    base: &Map<String, Value>,
    overlay: &Map<String, Value>,
) -> Result<Map<String, Value>, PreferError> {
    let mut result = base.clone();

    for (key, overlay_value) in overlay {
        accessor::check_pollution(key)?;
        let merged = match (result.get(key), overlay_value) {
            (Some(Value::Object(base_child)), Value::Object(overlay_child)) => {
                Value::Object(deep_merge(base_child, overlay_child)?)
            }
            _ => overlay_value.clone(),
        };
        result.insert(key.clone(), merged);
    }

    Ok(result)
}

/// Typed, dot-notation access over a merged configuration tree.
#[derive(Debug, Clone, Default)]
pub struct TypedConfig {
    data: Map<String, Value>,
}

impl TypedConfig {
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Get a copy of the value at `path`, `None` when the path does not
    /// resolve.
    pub fn get(&self, path: &str) -> Result<Option<Value>, PreferError> {
        let mut segments = path.split('.');
        let Some(first) = segments.next() else {
            return Ok(None);
        };
        accessor::check_pollution(first)?;

        let mut node = self.data.get(first);
        for segment in segments {
            accessor::check_pollution(segment)?;
            node = match node {
                Some(value) => value.get(segment),
                None => return Ok(None),
            };
        }

        Ok(node.cloned())
    }

    /// Get a string value, falling back to `default` when the raw value is
    /// not a string.
    pub fn get_string(
        &self,
        path: &str,
        default: Option<&str>,
    ) -> Result<Option<String>, PreferError> {
        Ok(match self.get(path)? {
            Some(Value::String(text)) => Some(text),
            _ => default.map(str::to_string),
        })
    }

    /// Get a numeric value. Strings are parsed first (environment values
    /// arrive as strings); anything else falls back to `default`.
    pub fn get_number(
        &self,
        path: &str,
        default: Option<f64>,
    ) -> Result<Option<f64>, PreferError> {
        Ok(match self.get(path)? {
            Some(Value::Number(number)) => number.as_f64().or(default),
            Some(Value::String(text)) => text.parse::<f64>().ok().or(default),
            _ => default,
        })
    }

    /// Get a boolean value. The strings `true`/`1` and `false`/`0` parse
    /// (case-insensitively); anything else falls back to `default`.
    pub fn get_boolean(
        &self,
        path: &str,
        default: Option<bool>,
    ) -> Result<Option<bool>, PreferError> {
        Ok(match self.get(path)? {
            Some(Value::Bool(flag)) => Some(flag),
            Some(Value::String(text)) => match text.to_lowercase().as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => default,
            },
            _ => default,
        })
    }

    /// Whether `path` resolves to a value.
    pub fn has(&self, path: &str) -> bool {
        matches!(self.get(path), Ok(Some(_)))
    }

    /// Borrow the entire merged tree.
    pub fn all(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Deserialize the entire merged tree into a typed value.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, PreferError> {
        serde_json::from_value(Value::Object(self.data.clone())).map_err(|err| {
            PreferError::Format {
                format: "config".to_string(),
                message: err.to_string(),
            }
        })
    }

    /// Wrap the merged tree in a [`Configurator`].
    pub fn to_configurator(&self) -> Configurator {
        Configurator::new(Value::Object(self.data.clone()))
    }
}

/// Builder composing an ordered list of sources into one merged tree.
///
/// Sources are applied in registration order; later sources override
/// earlier ones.
#[derive(Default)]
pub struct ConfigBuilder {
    sources: Vec<Box<dyn Source>>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a custom source.
    pub fn add_source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append in-memory default values.
    pub fn add_defaults(self, defaults: Map<String, Value>) -> Self {
        self.add_source(MemorySource::new(defaults))
    }

    /// Append a required configuration file; load failures propagate.
    pub fn add_file(self, identifier: impl Into<String>) -> Self {
        self.add_source(FileSource::new(identifier))
    }

    /// Append an optional configuration file; load failures yield an empty
    /// tree.
    pub fn add_optional_file(self, identifier: impl Into<String>) -> Self {
        self.add_source(OptionalFileSource::new(identifier))
    }

    /// Append environment variables with the given prefix and the default
    /// `__` separator.
    pub fn add_env(self, prefix: &str) -> Self {
        self.add_source(EnvSource::new(prefix))
    }

    /// Append environment variables with an explicit separator.
    pub fn add_env_with_separator(self, prefix: &str, separator: &str) -> Self {
        self.add_source(EnvSource::with_separator(prefix, separator))
    }

    /// Load environment variables from a `.env` file if present.
    ///
    /// If the `DOTENV_DISABLED` environment variable is set to "true" or
    /// "1", the `.env` file is not loaded (useful for testing). Missing
    /// `.env` files are silently ignored.
    ///
    /// # Errors
    ///
    /// Fails when a `.env` file exists but has invalid syntax or cannot be
    /// read. Error messages never include raw .env line contents.
    pub fn load_dotenv(self) -> Result<Self, PreferError> {
        if dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(err) if dotenv_not_found(&err) => Ok(self),
            Err(dotenvy::Error::LineParse(_, index)) => {
                Err(PreferError::DotenvParse { error_index: index })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(PreferError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(PreferError::DotenvUnknown),
        }
    }

    /// Load every source in order and deep-merge the results.
    pub async fn build(self) -> Result<TypedConfig, PreferError> {
        let mut merged = Map::new();

        for source in &self.sources {
            let data = source.load().await?;
            tracing::debug!(source = source.name(), keys = data.len(), "merged source");
            merged = deep_merge(&merged, &data)?;
        }

        Ok(TypedConfig::new(merged))
    }

    /// Build and wrap the result in a [`Configurator`].
    pub async fn build_configurator(self) -> Result<Configurator, PreferError> {
        Ok(self.build().await?.to_configurator())
    }
}

fn dotenv_disabled() -> bool {
    matches!(
        std::env::var("DOTENV_DISABLED").ok().as_deref(),
        Some("true") | Some("1")
    )
}

fn dotenv_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}
