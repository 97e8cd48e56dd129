//! Layered configuration loading for applications that let their users pick
//! the format.
//!
//! `prefer` discovers a configuration file by identifier (the filename may
//! be extensionless), selects a codec for its format, parses it into an
//! untyped tree, and exposes read/write access by dotted key path. A
//! [`ConfigBuilder`] composes defaults, files, and environment variables
//! into one deep-merged tree, and a watched file re-emits configuration
//! through [`Prefer`]'s event channel when it changes on disk.
//!
//! ```no_run
//! use prefer::ConfigBuilder;
//! use serde_json::{Map, json};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prefer::PreferError> {
//!     let mut defaults = Map::new();
//!     defaults.insert("port".to_string(), json!(8080));
//!
//!     let config = ConfigBuilder::new()
//!         .add_defaults(defaults)
//!         .add_optional_file("myapp.local")
//!         .add_env("MYAPP")
//!         .build()
//!         .await?;
//!
//!     let port = config.get_number("port", Some(8080.0))?;
//!     println!("listening on {port:?}");
//!     Ok(())
//! }
//! ```

pub mod accessor;
mod builder;
pub mod configurator;
pub mod error;
pub mod formatter;
pub mod loader;
pub mod options;
pub mod pathing;
mod prefer;
pub mod provider;

pub use builder::{
    ConfigBuilder, EnvSource, FileSource, MemorySource, OptionalFileSource, Source, TypedConfig,
    deep_merge,
};
pub use configurator::Configurator;
pub use error::{PreferError, ProviderKind};
pub use formatter::{
    Formatter, IniFormatter, Json5Formatter, JsonFormatter, TomlFormatter, YamlFormatter,
};
pub use loader::{FileLoader, LoadResult, Loader, LoaderEvent};
pub use options::{FileOptions, LoadOptions};
pub use prefer::{Prefer, PreferEvent};
pub use provider::{Provider, ProviderRegistry};

/// Load a configuration file by identifier with default options, watching
/// disabled.
///
/// This is a one-shot convenience: watch lifetimes require holding a
/// [`Prefer`], which this shortcut by construction does not.
pub async fn load(identifier: &str) -> Result<Configurator, PreferError> {
    let options = LoadOptions::new(identifier)
        .with_files(options::FileOptions::default().with_watch(false));
    Prefer::new().load_with(options).await
}
