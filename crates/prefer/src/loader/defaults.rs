//! Default loader registration table.
//!
//! Invariants:
//! - The filename pattern rejects identifiers that cannot name a file
//!   (wildcards, scheme prefixes other than `file://`, query strings).
//! - Registration order is the selection priority (see `provider.rs`).

use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;

use super::{FileLoader, Loader};
use crate::error::ProviderKind;
use crate::provider::{Provider, ProviderRegistry};

static FILE_NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((file)://)?((/)?[^/?*:;{}\\])+$").expect("filename pattern compiles")
});

/// The default loader registry: a single file loader matched by filename
/// shape.
pub fn registry() -> ProviderRegistry<dyn Loader> {
    let mut registry = ProviderRegistry::new(ProviderKind::Loader);
    registry.register(Provider::new(
        "file",
        |candidates: &[String]| {
            candidates
                .iter()
                .map(|candidate| FILE_NAME_PATTERN.is_match(candidate))
                .collect()
        },
        |options| Arc::new(FileLoader::new(options.clone())) as Arc<dyn Loader>,
    ));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LoadOptions;

    #[test]
    fn test_filenames_match_the_pattern() {
        for candidate in ["config.json", "settings", "/etc/app.yaml", "file:///etc/app.json"] {
            assert!(FILE_NAME_PATTERN.is_match(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_non_filenames_are_rejected() {
        for candidate in ["http://example.com/config", "bad*glob", "a?b"] {
            assert!(!FILE_NAME_PATTERN.is_match(candidate), "{candidate}");
        }
    }

    #[test]
    fn test_registry_resolves_file_loader() {
        let registry = registry();
        assert!(registry.resolve(&LoadOptions::new("app.json"), None).is_ok());
    }
}
