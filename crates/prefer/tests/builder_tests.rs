//! Integration tests for layered configuration: defaults, files, optional
//! files, and environment variables merged in order.

use std::fs;

use prefer::ConfigBuilder;
use serde_json::{Map, Value, json};
use serial_test::serial;
use tempfile::TempDir;

fn map_of(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other:?}"),
    }
}

#[tokio::test]
async fn test_later_file_source_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("service.json");
    fs::write(&path, r#"{"port": 9090}"#).unwrap();

    let config = ConfigBuilder::new()
        .add_defaults(map_of(json!({"port": 8080, "name": "service"})))
        .add_file(path.display().to_string())
        .build()
        .await
        .unwrap();

    // the later source wins; untouched defaults survive
    assert_eq!(config.get_number("port", None).unwrap(), Some(9090.0));
    assert_eq!(
        config.get_string("name", None).unwrap(),
        Some("service".to_string())
    );
}

#[tokio::test]
async fn test_nested_mappings_merge_across_sources() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("override.json");
    fs::write(&path, r#"{"database": {"port": 3306}}"#).unwrap();

    let config = ConfigBuilder::new()
        .add_defaults(map_of(json!({
            "database": {"host": "localhost", "port": 5432},
        })))
        .add_file(path.display().to_string())
        .build()
        .await
        .unwrap();

    assert_eq!(
        Value::Object(config.all().clone()),
        json!({"database": {"host": "localhost", "port": 3306}})
    );
}

#[tokio::test]
async fn test_required_file_failure_propagates() {
    let result = ConfigBuilder::new()
        .add_file("this-file-does-not-exist.json")
        .build()
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_optional_file_failure_yields_empty_layer() {
    let config = ConfigBuilder::new()
        .add_defaults(map_of(json!({"kept": true})))
        .add_optional_file("this-file-does-not-exist.json")
        .build()
        .await
        .unwrap();

    assert_eq!(config.get_boolean("kept", None).unwrap(), Some(true));
}

#[tokio::test]
#[serial]
async fn test_env_source_overrides_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("layered.json");
    fs::write(&path, r#"{"database": {"host": "from-file"}}"#).unwrap();

    let builder = ConfigBuilder::new()
        .add_file(path.display().to_string())
        .add_env("LAYERTEST");

    let config = temp_env::async_with_vars(
        [("LAYERTEST__DATABASE__HOST", Some("from-env"))],
        builder.build(),
    )
    .await
    .unwrap();

    assert_eq!(
        config.get_string("database.host", None).unwrap(),
        Some("from-env".to_string())
    );
}

#[tokio::test]
async fn test_build_configurator_compat_surface() {
    let configurator = ConfigBuilder::new()
        .add_defaults(map_of(json!({"feature": {"enabled": true}})))
        .build_configurator()
        .await
        .unwrap();

    assert_eq!(configurator.get("feature.enabled").unwrap(), json!(true));
}
