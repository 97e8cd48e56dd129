//! JSON codec backed by serde_json.

use async_trait::async_trait;
use serde_json::Value;

use super::{Formatter, format_error};
use crate::error::PreferError;

pub struct JsonFormatter;

#[async_trait]
impl Formatter for JsonFormatter {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn parse(&self, text: &str) -> Result<Value, PreferError> {
        serde_json::from_str(text).map_err(|err| format_error("json", err))
    }

    async fn stringify(&self, tree: &Value) -> Result<String, PreferError> {
        serde_json::to_string_pretty(tree).map_err(|err| format_error("json", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_parse_preserves_types() {
        let tree = JsonFormatter
            .parse(r#"{"port": 8080, "debug": true, "name": "app"}"#)
            .await
            .unwrap();
        assert_eq!(tree, json!({"port": 8080, "debug": true, "name": "app"}));
    }

    #[tokio::test]
    async fn test_round_trip() {
        let tree = json!({"nested": {"values": [1, 2, 3]}, "flag": false});
        let text = JsonFormatter.stringify(&tree).await.unwrap();
        assert_eq!(JsonFormatter.parse(&text).await.unwrap(), tree);
    }

    #[tokio::test]
    async fn test_malformed_input_is_a_format_error() {
        let err = JsonFormatter.parse("{not json").await.unwrap_err();
        assert!(matches!(err, PreferError::Format { ref format, .. } if format == "json"));
    }
}
