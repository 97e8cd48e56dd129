//! TOML codec backed by the toml crate.

use async_trait::async_trait;
use serde_json::Value;

use super::{Formatter, format_error};
use crate::error::PreferError;

pub struct TomlFormatter;

#[async_trait]
impl Formatter for TomlFormatter {
    fn name(&self) -> &'static str {
        "toml"
    }

    async fn parse(&self, text: &str) -> Result<Value, PreferError> {
        toml::from_str(text).map_err(|err| format_error("toml", err))
    }

    async fn stringify(&self, tree: &Value) -> Result<String, PreferError> {
        toml::to_string_pretty(tree).map_err(|err| format_error("toml", err))
    }
}
