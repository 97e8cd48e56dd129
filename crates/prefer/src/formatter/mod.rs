//! Format codecs: parse text into a tree, stringify a tree back to text.
//!
//! Responsibilities:
//! - Define the `Formatter` contract the pipeline selects against.
//! - Host the concrete pass-through adapters to the format crates.
//!
//! Does NOT handle:
//! - Choosing which formatter handles an identifier (see `provider.rs` and
//!   `defaults.rs`).
//!
//! Invariants:
//! - `parse` fails with `PreferError::Format` carrying the underlying
//!   parser's diagnostic, never an unrelated fault.
//! - `stringify` is optional; the default body fails with
//!   `PreferError::Unsupported` for read-only formats.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;

use crate::error::PreferError;

mod ini;
mod json;
mod json5;
mod toml;
mod yaml;

pub mod defaults;

pub use ini::IniFormatter;
pub use json::JsonFormatter;
pub use json5::Json5Formatter;
pub use toml::TomlFormatter;
pub use yaml::YamlFormatter;

/// A configuration format codec.
#[async_trait]
pub trait Formatter: Send + Sync {
    /// Short format name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parse source text into a configuration tree.
    async fn parse(&self, text: &str) -> Result<Value, PreferError>;

    /// Render a configuration tree back to text.
    ///
    /// Read-only formats keep the default body, which fails with
    /// [`PreferError::Unsupported`].
    async fn stringify(&self, _tree: &Value) -> Result<String, PreferError> {
        Err(PreferError::Unsupported {
            format: self.name().to_string(),
            operation: "stringify",
        })
    }
}

/// Wrap an underlying parser diagnostic in a [`PreferError::Format`].
pub(crate) fn format_error(format: &str, diagnostic: impl Display) -> PreferError {
    PreferError::Format {
        format: format.to_string(),
        message: diagnostic.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnly;

    #[async_trait]
    impl Formatter for ReadOnly {
        fn name(&self) -> &'static str {
            "readonly"
        }

        async fn parse(&self, _text: &str) -> Result<Value, PreferError> {
            Ok(Value::Null)
        }
    }

    #[tokio::test]
    async fn test_default_stringify_is_unsupported() {
        let err = ReadOnly.stringify(&Value::Null).await.unwrap_err();
        match err {
            PreferError::Unsupported { format, operation } => {
                assert_eq!(format, "readonly");
                assert_eq!(operation, "stringify");
            }
            other => panic!("expected Unsupported, got {other:?}"),
        }
    }
}
