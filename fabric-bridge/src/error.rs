//! Bridge error types.

use fabric_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Invalid parameter for {op}: {reason}")]
    InvalidParameter { op: String, reason: String },

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}

impl BridgeError {
    /// Text placed in the `error` field of a response.
    pub fn client_message(&self) -> String {
        match self {
            BridgeError::InvalidParameter { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
