//! Error types for configuration loading.
//!
//! Responsibilities:
//! - Define error variants for every failure surface of the crate.
//! - Provide conversion from lower-level errors (I/O, watch backend).
//!
//! Does NOT handle:
//! - Deciding whether a failure propagates to a caller or to an event
//!   channel (see `prefer.rs`).
//!
//! Invariants:
//! - Variants carry enough context for debugging (identifiers, paths, key
//!   segments).
//! - Dotenv errors NEVER include raw .env line contents to prevent secret
//!   leakage.
//! - Parser diagnostics are carried as rendered text so events holding an
//!   error can be cloned cheaply behind an `Arc`.

use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// The kind of provider a registry resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Loader,
    Formatter,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Loader => f.write_str("loader"),
            ProviderKind::Formatter => f.write_str("formatter"),
        }
    }
}

/// Errors that can occur while loading or accessing configuration.
#[derive(Error, Debug)]
pub enum PreferError {
    /// No registered provider matched the identifier.
    #[error("No configuration {kind} found for {identifier}")]
    ProviderNotFound {
        kind: ProviderKind,
        identifier: String,
    },

    /// Discovery found no file matching the requested name.
    #[error("No files found matching: {0}")]
    FilesNotFound(String),

    /// A dotted key path did not resolve in the tree.
    #[error("{0} does not exist in this configuration")]
    KeyNotFound(String),

    /// A key segment matched the prototype-pollution blocklist.
    #[error("Prototype pollution attempt detected: \"{0}\" is not allowed")]
    PollutedKey(String),

    /// Source text could not be parsed, or a tree could not be represented
    /// in the target format.
    #[error("Malformed {format} configuration: {message}")]
    Format { format: String, message: String },

    /// The formatter does not implement the requested operation.
    #[error("The {format} formatter does not support {operation}")]
    Unsupported {
        format: String,
        operation: &'static str,
    },

    /// No identifier was supplied to the load pipeline.
    #[error("No identifier provided for configuration")]
    MissingIdentifier,

    /// The resolved loader hands back structured data and cannot be paired
    /// with this formatter pipeline.
    #[error("Formatter is required but not available for {identifier}")]
    FormatterUnavailable { identifier: String },

    /// A discovered file could not be read.
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// Only the byte index of the failure is reported, never the offending
    /// line content.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from the dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}
