//! Error types for loading inputs.
//!
//! Every variant is fatal: a generator run stops before any merge work when
//! an input cannot be read or parsed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading documents, catalogs or configuration.
#[derive(Debug, Error)]
pub enum SourceError {
    /// File I/O failure.
    #[error("cannot open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration is structurally valid but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias for results with [`SourceError`].
pub type Result<T> = std::result::Result<T, SourceError>;
