//! Error types for the graph conversion pipeline

use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, VizError>;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum VizError {
    #[error("Malformed document at '{path}': {reason}")]
    MalformedDocument { path: String, reason: String },

    #[error("Nesting depth exceeded at '{path}' (limit {limit})")]
    DepthExceeded { path: String, limit: usize },

    #[error("Unknown operation verb '{verb}' in \"{operation}\"")]
    UnknownOperationVerb { verb: String, operation: String },

    #[error("Malformed operation \"{operation}\": {reason}")]
    MalformedOperation { operation: String, reason: String },

    #[error("Numeric segment under a mapping at '{path}'")]
    AmbiguousArrayIndex { path: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl VizError {
    pub(crate) fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedDocument {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
