//! Error types for the core data model.

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while loading configuration or parsing specs.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid cloud configuration: {0}")]
    Config(String),

    #[error("invalid node group spec: {0}")]
    InvalidSpec(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },
}
