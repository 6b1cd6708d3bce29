//! Error types for the flux-qubit crate.

use thiserror::Error;
use vchos_optim::OptimError;

use crate::potential::PhaseVector;

/// Errors produced by parameter handling, minima search and basis layout.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FluxError {
    /// A device parameter is outside its physical range.
    #[error("invalid value {value} for parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the flat mapping.
        name: String,
        /// The rejected value.
        value: f64,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// No parameter with this name exists.
    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    /// The capacitance matrix built from the charging energies is singular.
    #[error("capacitance matrix is singular (determinant {determinant})")]
    SingularCapacitance {
        /// Determinant of the capacitance matrix.
        determinant: f64,
    },

    /// The curvature at a reported minimum is not positive definite.
    #[error("minimum {index} is not a true minimum: curvature eigenvalue {eigenvalue}")]
    NotPositiveDefinite {
        /// Index of the minimum in the minima set.
        index: usize,
        /// Offending eigenvalue of `8·EC·H`.
        eigenvalue: f64,
    },

    /// The local optimizer did not converge and the policy forbids using the result.
    #[error("optimizer did not converge from seed {seed:?} after {iterations} iterations")]
    DidNotConverge {
        /// Seed the optimizer started from.
        seed: PhaseVector,
        /// Iterations spent.
        iterations: usize,
    },

    /// A search setting is out of range.
    #[error("invalid search setting: {0}")]
    InvalidSearchConfig(String),

    /// A configuration document could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The local optimizer rejected its input.
    #[error("optimizer error: {0}")]
    Optim(#[from] OptimError),
}

impl From<serde_json::Error> for FluxError {
    fn from(e: serde_json::Error) -> Self {
        FluxError::Config(e.to_string())
    }
}

impl From<serde_yaml_ng::Error> for FluxError {
    fn from(e: serde_yaml_ng::Error) -> Self {
        FluxError::Config(e.to_string())
    }
}

/// Result type for flux-qubit operations.
pub type FluxResult<T> = Result<T, FluxError>;
