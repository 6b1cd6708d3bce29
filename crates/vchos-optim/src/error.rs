//! Error types for the optimizer crate.

use thiserror::Error;

/// Errors produced when configuring or starting a local optimization.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum OptimError {
    /// The initial guess has no coordinates.
    #[error("initial guess is empty")]
    EmptyInitialGuess,

    /// The initial guess contains a NaN or infinite coordinate.
    #[error("initial guess coordinate {index} is not finite ({value})")]
    NonFiniteInitialGuess {
        /// Offending coordinate index.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// An optimizer setting is out of range.
    #[error("invalid optimizer setting `{name}`: {reason}")]
    InvalidSetting {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for optimizer operations.
pub type OptimResult<T> = Result<T, OptimError>;
