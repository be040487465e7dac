//! Error types for ThinkGrid.

use thiserror::Error;

/// The two error families every [`GridError`] belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input or configuration.
    Validation,
    /// Too few samples to compute a signal.
    InsufficientData,
}

/// ThinkGrid error types.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Entity identifiers must be non-empty
    #[error("Entity id must be a non-empty string")]
    EmptyEntityId,

    /// Empty input where non-empty was required
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// NaN or infinite vector component
    #[error("Non-finite value {value} at index {index}")]
    NonFinite { index: usize, value: f64 },

    /// Invalid vector dimensions
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Trim quantiles outside `0 <= low < high <= 1`
    #[error("Invalid trim quantiles: low={low:?}, high={high:?}")]
    InvalidQuantiles { low: Option<f64>, high: Option<f64> },

    /// Out-of-range configuration value
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Elapsed time between samples must be finite and positive
    #[error("Invalid time delta {value} at sample {index}")]
    InvalidTimeDelta { index: usize, value: f64 },

    /// A feature record lacks a feature the batch defines
    #[error("Entity {entity_id} is missing feature {feature}")]
    MissingFeature { entity_id: String, feature: String },

    /// Finite inputs produced a non-finite result
    #[error("Numeric overflow computing {0}")]
    Overflow(&'static str),

    /// Not enough samples for the requested computation
    #[error("Insufficient data: need {required}, got {got}")]
    InsufficientData { required: usize, got: usize },
}

impl GridError {
    /// Classify this error as a validation or insufficient-data failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GridError::InsufficientData { .. } => ErrorKind::InsufficientData,
            _ => ErrorKind::Validation,
        }
    }
}

/// Result type alias for ThinkGrid operations.
pub type Result<T> = std::result::Result<T, GridError>;
