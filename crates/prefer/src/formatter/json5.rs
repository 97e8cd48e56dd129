//! JSON5 codec; also serves `jsonc` identifiers.

use async_trait::async_trait;
use serde_json::Value;

use super::{Formatter, format_error};
use crate::error::PreferError;

pub struct Json5Formatter;

#[async_trait]
impl Formatter for Json5Formatter {
    fn name(&self) -> &'static str {
        "json5"
    }

    async fn parse(&self, text: &str) -> Result<Value, PreferError> {
        json5::from_str(text).map_err(|err| format_error("json5", err))
    }

    async fn stringify(&self, tree: &Value) -> Result<String, PreferError> {
        json5::to_string(tree).map_err(|err| format_error("json5", err))
    }
}
