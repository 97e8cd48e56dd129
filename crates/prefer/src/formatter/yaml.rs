//! YAML codec backed by serde_yaml; serves `yaml` and `yml` identifiers.

use async_trait::async_trait;
use serde_json::Value;

use super::{Formatter, format_error};
use crate::error::PreferError;

pub struct YamlFormatter;

#[async_trait]
impl Formatter for YamlFormatter {
    fn name(&self) -> &'static str {
        "yaml"
    }

    async fn parse(&self, text: &str) -> Result<Value, PreferError> {
        serde_yaml::from_str(text).map_err(|err| format_error("yaml", err))
    }

    async fn stringify(&self, tree: &Value) -> Result<String, PreferError> {
        serde_yaml::to_string(tree).map_err(|err| format_error("yaml", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_nested_mapping() {
        let tree = YamlFormatter
            .parse("database:\n  host: localhost\n  port: 5432\n")
            .await
            .unwrap();
        assert_eq!(tree, json!({"database": {"host": "localhost", "port": 5432}}));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let tree = json!({"servers": ["a", "b"], "retries": 3});
        let text = YamlFormatter.stringify(&tree).await.unwrap();
        assert_eq!(YamlFormatter.parse(&text).await.unwrap(), tree);
    }

    #[tokio::test]
    async fn test_malformed_input_is_a_format_error() {
        assert!(matches!(
            YamlFormatter.parse("key: [unclosed").await.unwrap_err(),
            PreferError::Format { .. }
        ));
    }
}
