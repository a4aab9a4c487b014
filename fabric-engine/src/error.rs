//! Engine error types.
//!
//! `FabricNotFound` is the only variant a query is expected to hit; the
//! rest are raised while provisioning tables or the disposal model.

use fabric_ml::MlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Fabric not found: {0}")]
    FabricNotFound(String),

    #[error("Dataset error in {table} table at line {line}: {reason}")]
    Dataset {
        table: &'static str,
        line: usize,
        reason: String,
    },

    #[error("Failed to open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Model error: {0}")]
    Ml(#[from] MlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::FabricNotFound(_))
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
