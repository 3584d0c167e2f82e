//! Error types shared by the evolutionary framework.

use thiserror::Error;

/// Errors raised by the evolutionary framework.
///
/// Every variant is raised at the point of detection and never recovered
/// internally: a failing call leaves the evolver in the state it had before
/// the call whenever validation precedes mutation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolveError {
    /// Malformed input: mismatched or inverted bounds, non-positive
    /// population size, missing fitness function, out-of-range parameter.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Indexed access beyond the end of an individual or population.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// An operational precondition was violated, e.g. breeding an empty
    /// population.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl EvolveError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EvolveError::InvalidArgument(msg.into())
    }

    pub(crate) fn runtime(msg: impl Into<String>) -> Self {
        EvolveError::Runtime(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EvolveError>;
