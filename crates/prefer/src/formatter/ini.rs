//! INI codec backed by rust-ini.
//!
//! INI carries no type information: every parsed value is a string, and
//! nesting is limited to one section level. Trees that go deeper, or hold
//! arrays, cannot be represented and fail `stringify` with a format error.

use async_trait::async_trait;
use ini::Ini;
use serde_json::{Map, Value};

use super::{Formatter, format_error};
use crate::error::PreferError;

pub struct IniFormatter;

#[async_trait]
impl Formatter for IniFormatter {
    fn name(&self) -> &'static str {
        "ini"
    }

    async fn parse(&self, text: &str) -> Result<Value, PreferError> {
        let ini = Ini::load_from_str(text).map_err(|err| format_error("ini", err))?;

        let mut root = Map::new();
        for (section, properties) in ini.iter() {
            match section {
                None => {
                    for (key, value) in properties.iter() {
                        root.insert(key.to_string(), Value::String(value.to_string()));
                    }
                }
                Some(name) => {
                    let mut table = Map::new();
                    for (key, value) in properties.iter() {
                        table.insert(key.to_string(), Value::String(value.to_string()));
                    }
                    root.insert(name.to_string(), Value::Object(table));
                }
            }
        }

        Ok(Value::Object(root))
    }

    async fn stringify(&self, tree: &Value) -> Result<String, PreferError> {
        let map = tree
            .as_object()
            .ok_or_else(|| format_error("ini", "top-level value must be a mapping"))?;

        let mut ini = Ini::new();
        for (key, value) in map {
            match value {
                Value::Object(section) => {
                    for (name, nested) in section {
                        let scalar = scalar_text(nested).ok_or_else(|| {
                            format_error(
                                "ini",
                                format!("{key}.{name} cannot be represented in INI"),
                            )
                        })?;
                        ini.with_section(Some(key.as_str())).set(name, scalar);
                    }
                }
                other => {
                    let scalar = scalar_text(other).ok_or_else(|| {
                        format_error("ini", format!("{key} cannot be represented in INI"))
                    })?;
                    ini.with_section(None::<String>).set(key, scalar);
                }
            }
        }

        let mut rendered = Vec::new();
        ini.write_to(&mut rendered)
            .map_err(|err| format_error("ini", err))?;
        String::from_utf8(rendered).map_err(|err| format_error("ini", err))
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
