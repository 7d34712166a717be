//! Error types for ranking and allocation runs.

use thiserror::Error;

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, RankerError>;

#[derive(Error, Debug)]
pub enum RankerError {
    /// Too few price points to compute returns.
    #[error("Insufficient data: need at least {required} prices, got {available}")]
    InsufficientData { required: usize, available: usize },

    /// A risk value of exactly zero reached the efficiency ratio.
    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    /// Capacity is negative or not a finite number.
    #[error("Invalid capacity: {0} (must be finite and >= 0)")]
    InvalidCapacity(f64),

    /// Parallel sequences of different length.
    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Zero, negative or non-finite price in a series.
    #[error("Invalid price {value} at index {index}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("Invalid symbol: '{0}'")]
    InvalidSymbol(String),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid date: {0}")]
    Date(#[from] chrono::ParseError),
}

impl RankerError {
    pub fn insufficient_data(required: usize, available: usize) -> Self {
        Self::InsufficientData {
            required,
            available,
        }
    }

    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for errors that only disqualify a single asset and should not abort the run.
    pub fn is_per_asset(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::InvalidPrice { .. }
        )
    }
}
