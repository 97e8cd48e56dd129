//! Default formatter registration table.
//!
//! Responsibilities:
//! - Register the built-in codecs in priority order.
//! - Provide the extension-style predicate used to match format identifiers.
//!
//! Invariants:
//! - A candidate matches an entry when it equals the format name
//!   (dot-insensitively) or carries it as its path extension.
//! - Registration order is the selection priority (see `provider.rs`).

use std::path::Path;
use std::sync::Arc;

use super::{Formatter, IniFormatter, Json5Formatter, JsonFormatter, TomlFormatter, YamlFormatter};
use crate::error::ProviderKind;
use crate::provider::{Provider, ProviderRegistry};

/// Predicate matching `format` against each candidate: the candidate either
/// names the format outright (`json` or `.json`) or ends in it as a file
/// extension (`config.json`).
pub fn extension_predicate(format: &'static str) -> impl Fn(&[String]) -> Vec<bool> {
    move |candidates| {
        candidates
            .iter()
            .map(|candidate| {
                ensure_dot(candidate) == ensure_dot(format)
                    || Path::new(candidate)
                        .extension()
                        .and_then(|extension| extension.to_str())
                        .is_some_and(|extension| extension == format)
            })
            .collect()
    }
}

fn ensure_dot(value: &str) -> String {
    if value.starts_with('.') {
        value.to_string()
    } else {
        format!(".{value}")
    }
}

/// The default formatter registry: json, yml, yaml, toml, ini, json5, jsonc.
pub fn registry() -> ProviderRegistry<dyn Formatter> {
    let mut registry = ProviderRegistry::new(ProviderKind::Formatter);
    registry.register(Provider::new("json", extension_predicate("json"), |_| {
        Arc::new(JsonFormatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("yml", extension_predicate("yml"), |_| {
        Arc::new(YamlFormatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("yaml", extension_predicate("yaml"), |_| {
        Arc::new(YamlFormatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("toml", extension_predicate("toml"), |_| {
        Arc::new(TomlFormatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("ini", extension_predicate("ini"), |_| {
        Arc::new(IniFormatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("json5", extension_predicate("json5"), |_| {
        Arc::new(Json5Formatter) as Arc<dyn Formatter>
    }));
    registry.register(Provider::new("jsonc", extension_predicate("jsonc"), |_| {
        Arc::new(Json5Formatter) as Arc<dyn Formatter>
    }));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoadOptions;

    #[test]
    fn test_extension_predicate_matches_bare_and_dotted_names() {
        let matches = extension_predicate("json");
        assert_eq!(
            matches(&["json".to_string(), ".json".to_string(), "yaml".to_string()]),
            vec![true, true, false]
        );
    }

    #[test]
    fn test_extension_predicate_matches_filenames() {
        let matches = extension_predicate("yaml");
        assert_eq!(
            matches(&["config.yaml".to_string(), "config.yaml.bak".to_string()]),
            vec![true, false]
        );
    }

    #[test]
    fn test_registry_resolves_by_extension() {
        let registry = registry();
        let formatter = registry
            .resolve(&LoadOptions::new("settings.toml"), None)
            .unwrap();
        assert_eq!(formatter.name(), "toml");
    }

    #[test]
    fn test_registry_resolves_suggestion_aliases() {
        let registry = registry();
        let yml = registry
            .resolve(&LoadOptions::new("whatever"), Some("yml"))
            .unwrap();
        assert_eq!(yml.name(), "yaml");

        let jsonc = registry
            .resolve(&LoadOptions::new("whatever"), Some("jsonc"))
            .unwrap();
        assert_eq!(jsonc.name(), "json5");
    }
}
