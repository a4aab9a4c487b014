//! Model error types.
//!
//! Every failure mode has a named variant. Encoder misuse and untrained
//! models are programming errors; callers should treat them as fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("Unknown label: '{0}' was not seen during fit")]
    UnknownLabel(String),

    #[error("Unknown code: {code} (encoder has {classes} classes)")]
    UnknownCode { code: usize, classes: usize },

    #[error("Model has not been trained")]
    ModelNotTrained,

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Shape mismatch: expected {expected} {what}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Model fit failed: {0}")]
    Fit(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Result type alias for model operations.
pub type MlResult<T> = Result<T, MlError>;
