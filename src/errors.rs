// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A path was used outside of the root it is expected to live under.
    #[error("Invalid path: {path:?} is not inside {root:?}")]
    InvalidPath { path: PathBuf, root: PathBuf },

    /// The output path cannot be turned into a route path.
    #[error("Invalid route segment in {path:?}: {message}")]
    InvalidRoute { path: String, message: String },

    /// Raised by a symbol extractor on malformed source text.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// A catalog file could not be read or parsed.
    #[error("Failed to extract symbols from {path:?}: {message}")]
    ExtractionError { path: PathBuf, message: String },

    /// A write or delete under the output root failed.
    #[error("File system error at {path:?}: {message}")]
    FsError { path: PathBuf, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CatalogError {
    pub(crate) fn fs(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        CatalogError::FsError {
            path: path.into(),
            message: format!("{err:#}"),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CatalogError>;
