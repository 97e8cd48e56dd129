//! The load pipeline: loader selection, format selection, parse, reload.
//!
//! Responsibilities:
//! - Resolve a loader and a formatter for an identifier and run the
//!   load → parse → Configurator pipeline.
//! - Re-run the formatting step on watch-triggered loader updates and emit
//!   the outcome as events.
//!
//! Does NOT handle:
//! - File discovery or reading (see `loader`).
//! - Layered multi-source composition (see `builder`).
//!
//! Invariants:
//! - Failures before and during the initial load propagate to the caller.
//!   Failures after it never do; they surface only on the event channel,
//!   because there is no pending caller to receive them.
//! - The initial load does not emit an `Updated` event; only
//!   watch-triggered reloads do.
//! - Loaders stay owned by the `Prefer` that activated them; dropping the
//!   `Prefer` drops the loaders and with them any file watchers.

use std::sync::Arc;

use serde_json::{Map, Value};
use tokio::sync::{Mutex, broadcast};

use crate::configurator::Configurator;
use crate::error::PreferError;
use crate::formatter::{self, Formatter};
use crate::loader::{self, Loader, LoaderEvent, LoadResult};
use crate::options::LoadOptions;
use crate::provider::ProviderRegistry;

/// A lifecycle event emitted after the initial load.
#[derive(Debug, Clone)]
pub enum PreferEvent {
    /// A watched source changed and re-parsed successfully.
    Updated(Arc<Configurator>),
    /// A watched source changed but re-reading or re-parsing failed.
    Error(Arc<PreferError>),
}

/// Coordinates loader and formatter selection and the load pipeline.
pub struct Prefer {
    loaders: ProviderRegistry<dyn Loader>,
    formatters: ProviderRegistry<dyn Formatter>,
    events: broadcast::Sender<PreferEvent>,
    active: Mutex<Vec<Arc<dyn Loader>>>,
}

impl Default for Prefer {
    fn default() -> Self {
        Self::new()
    }
}

impl Prefer {
    /// A pipeline with the default loader and formatter registries.
    pub fn new() -> Self {
        Self::with_registries(loader::defaults::registry(), formatter::defaults::registry())
    }

    /// A pipeline with custom registries. Registration order is the
    /// selection priority.
    pub fn with_registries(
        loaders: ProviderRegistry<dyn Loader>,
        formatters: ProviderRegistry<dyn Formatter>,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            loaders,
            formatters,
            events,
            active: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe to lifecycle events of watched sources.
    pub fn subscribe(&self) -> broadcast::Receiver<PreferEvent> {
        self.events.subscribe()
    }

    /// Load configuration by identifier with default options.
    pub async fn load(&self, identifier: &str) -> Result<Configurator, PreferError> {
        self.load_with(LoadOptions::new(identifier)).await
    }

    /// Load configuration with explicit options.
    pub async fn load_with(&self, options: LoadOptions) -> Result<Configurator, PreferError> {
        let identifier = options
            .identifier
            .clone()
            .ok_or(PreferError::MissingIdentifier)?;

        let loader = self.loaders.resolve(&options, None)?;

        if !loader.formatter_required().await {
            return Err(PreferError::FormatterUnavailable { identifier });
        }

        let suggestion = loader.formatter_suggested().await;
        let formatter = self.formatters.resolve(&options, suggestion.as_deref())?;

        // Subscribe before the initial load so no reload can slip between
        // the load and the subscription.
        let updates = loader.updates();
        self.spawn_reload_listener(updates, Arc::clone(&formatter));

        let result = loader.load(&identifier).await?;
        let configurator = into_configurator(formatter.as_ref(), &result).await?;

        self.active.lock().await.push(loader);
        Ok(configurator)
    }

    fn spawn_reload_listener(
        &self,
        mut updates: broadcast::Receiver<LoaderEvent>,
        formatter: Arc<dyn Formatter>,
    ) {
        let events = self.events.clone();
        tokio::spawn(async move {
            loop {
                match updates.recv().await {
                    Ok(LoaderEvent::Updated(result)) => {
                        match into_configurator(formatter.as_ref(), &result).await {
                            Ok(configurator) => {
                                let _ = events.send(PreferEvent::Updated(Arc::new(configurator)));
                            }
                            Err(err) => {
                                tracing::error!(
                                    source = %result.source,
                                    error = %err,
                                    "failed to re-parse updated configuration"
                                );
                                let _ = events.send(PreferEvent::Error(Arc::new(err)));
                            }
                        }
                    }
                    Ok(LoaderEvent::UpdateFailed(err)) => {
                        let _ = events.send(PreferEvent::Error(err));
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "reload listener lagged behind loader updates");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }
}

/// Parse a load result and wrap it with provenance state.
async fn into_configurator(
    formatter: &dyn Formatter,
    result: &LoadResult,
) -> Result<Configurator, PreferError> {
    let context = formatter.parse(&result.content).await?;

    let mut state = Map::new();
    state.insert("source".to_string(), Value::String(result.source.clone()));
    state.insert("content".to_string(), Value::String(result.content.clone()));

    Ok(Configurator::with_state(context, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderKind;
    use crate::formatter::JsonFormatter;
    use crate::provider::Provider;
    use async_trait::async_trait;

    struct StructuredLoader {
        events: broadcast::Sender<LoaderEvent>,
    }

    impl StructuredLoader {
        fn new() -> Self {
            let (events, _) = broadcast::channel(4);
            Self { events }
        }
    }

    #[async_trait]
    impl Loader for StructuredLoader {
        async fn formatter_required(&self) -> bool {
            false
        }

        async fn load(&self, identifier: &str) -> Result<LoadResult, PreferError> {
            Ok(LoadResult {
                source: identifier.to_string(),
                content: String::new(),
            })
        }

        fn updates(&self) -> broadcast::Receiver<LoaderEvent> {
            self.events.subscribe()
        }
    }

    fn structured_only_registry() -> ProviderRegistry<dyn Loader> {
        let mut registry = ProviderRegistry::new(ProviderKind::Loader);
        registry.register(Provider::new(
            "structured",
            |candidates: &[String]| candidates.iter().map(|_| true).collect(),
            |_| Arc::new(StructuredLoader::new()) as Arc<dyn Loader>,
        ));
        registry
    }

    #[tokio::test]
    async fn test_missing_identifier_is_rejected() {
        let prefer = Prefer::new();
        assert!(matches!(
            prefer.load_with(LoadOptions::default()).await,
            Err(PreferError::MissingIdentifier)
        ));
    }

    #[tokio::test]
    async fn test_loader_without_formatter_requirement_is_rejected() {
        let prefer =
            Prefer::with_registries(structured_only_registry(), formatter::defaults::registry());
        let err = prefer.load("anything.json").await.unwrap_err();
        assert!(matches!(err, PreferError::FormatterUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_unknown_format_has_no_provider() {
        let prefer = Prefer::new();
        let err = prefer.load("config.unknownformat").await.unwrap_err();
        match err {
            PreferError::ProviderNotFound { kind, identifier } => {
                assert_eq!(kind, ProviderKind::Formatter);
                assert_eq!(identifier, "config.unknownformat");
            }
            other => panic!("expected ProviderNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_into_configurator_records_provenance() {
        let result = LoadResult {
            source: "/etc/app.json".to_string(),
            content: r#"{"port": 9090}"#.to_string(),
        };
        let configurator = into_configurator(&JsonFormatter, &result).await.unwrap();
        assert_eq!(configurator.source(), Some("/etc/app.json"));
        assert_eq!(configurator.get("port").unwrap(), serde_json::json!(9090));
    }
}
