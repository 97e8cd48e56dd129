//! Provider selection for loaders and formatters.
//!
//! Responsibilities:
//! - Hold an ordered registration table of (predicate, constructor) pairs.
//! - Resolve an identifier (or a format suggestion) to a concrete
//!   implementation.
//!
//! Does NOT handle:
//! - Deciding the candidate strings to match (callers pass a suggestion or
//!   the identifier from the options).
//!
//! Invariants:
//! - The table is built at startup from statically known implementations;
//!   there is no runtime string-to-code indirection.
//! - The FIRST matching entry in registration order wins. Registration
//!   order is the priority list: a specific codec must be registered before
//!   a more general one to be preferred.

use std::sync::Arc;

use crate::error::{PreferError, ProviderKind};
use crate::options::LoadOptions;

type Predicate = Box<dyn Fn(&[String]) -> Vec<bool> + Send + Sync>;
type Construct<T> = Box<dyn Fn(&LoadOptions) -> Arc<T> + Send + Sync>;

/// One registered implementation: a match predicate plus a constructor.
pub struct Provider<T: ?Sized> {
    name: &'static str,
    predicate: Predicate,
    construct: Construct<T>,
}

impl<T: ?Sized> Provider<T> {
    pub fn new(
        name: &'static str,
        predicate: impl Fn(&[String]) -> Vec<bool> + Send + Sync + 'static,
        construct: impl Fn(&LoadOptions) -> Arc<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            predicate: Box::new(predicate),
            construct: Box::new(construct),
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// An ordered list of providers for one kind of pipeline entity.
pub struct ProviderRegistry<T: ?Sized> {
    kind: ProviderKind,
    entries: Vec<Provider<T>>,
}

impl<T: ?Sized> ProviderRegistry<T> {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    /// Append a provider. Earlier registrations take priority.
    pub fn register(&mut self, provider: Provider<T>) {
        self.entries.push(provider);
    }

    /// Resolve an implementation for the given options.
    ///
    /// The candidate list is `[suggestion]` when a suggestion is given,
    /// otherwise `[identifier]`. A provider matches when its predicate
    /// reports `true` for at least one candidate; the first match in
    /// registration order is constructed with the current options.
    pub fn resolve(
        &self,
        options: &LoadOptions,
        suggestion: Option<&str>,
    ) -> Result<Arc<T>, PreferError> {
        let candidates: Vec<String> = match (suggestion, &options.identifier) {
            (Some(suggestion), _) => vec![suggestion.to_string()],
            (None, Some(identifier)) => vec![identifier.clone()],
            (None, None) => return Err(PreferError::MissingIdentifier),
        };

        for entry in &self.entries {
            if (entry.predicate)(&candidates).into_iter().any(|matched| matched) {
                tracing::debug!(
                    kind = %self.kind,
                    provider = entry.name,
                    candidate = %candidates[0],
                    "resolved provider"
                );
                return Ok((entry.construct)(options));
            }
        }

        Err(PreferError::ProviderNotFound {
            kind: self.kind,
            identifier: options
                .identifier
                .clone()
                .unwrap_or_else(|| candidates[0].clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Tagged(&'static str);

    fn equals(wanted: &'static str) -> impl Fn(&[String]) -> Vec<bool> {
        move |candidates| candidates.iter().map(|c| c == wanted).collect()
    }

    fn registry_with(entries: Vec<Provider<Tagged>>) -> ProviderRegistry<Tagged> {
        let mut registry = ProviderRegistry::new(ProviderKind::Formatter);
        for entry in entries {
            registry.register(entry);
        }
        registry
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let registry = registry_with(vec![
            Provider::new("first", equals("x"), |_| Arc::new(Tagged("first"))),
            Provider::new("second", equals("x"), |_| Arc::new(Tagged("second"))),
        ]);
        let resolved = registry
            .resolve(&LoadOptions::new("x"), None)
            .unwrap();
        assert_eq!(*resolved, Tagged("first"));
    }

    #[test]
    fn test_suggestion_overrides_identifier() {
        let registry = registry_with(vec![
            Provider::new("id", equals("config.json"), |_| Arc::new(Tagged("id"))),
            Provider::new("hint", equals("yaml"), |_| Arc::new(Tagged("hint"))),
        ]);
        let resolved = registry
            .resolve(&LoadOptions::new("config.json"), Some("yaml"))
            .unwrap();
        assert_eq!(*resolved, Tagged("hint"));
    }

    #[test]
    fn test_no_match_reports_kind_and_identifier() {
        let registry = registry_with(vec![Provider::new("only", equals("other"), |_| {
            Arc::new(Tagged("only"))
        })]);
        let err = registry
            .resolve(&LoadOptions::new("wanted.conf"), None)
            .unwrap_err();
        match err {
            PreferError::ProviderNotFound { kind, identifier } => {
                assert_eq!(kind, ProviderKind::Formatter);
                assert_eq!(identifier, "wanted.conf");
            }
            other => panic!("expected ProviderNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_identifier() {
        let registry = registry_with(vec![]);
        assert!(matches!(
            registry.resolve(&LoadOptions::default(), None),
            Err(PreferError::MissingIdentifier)
        ));
    }
}
