//! Error types for trackhough-core.

use thiserror::Error;

/// Result type alias for trackhough operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for trackhough operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Invalid accumulator or track finder configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Candidate cell sits on the q/pt = 0 bin (straight track, unbounded radius).
    #[error("division by zero: candidate at row {row}, col {col} has q/pt = 0")]
    DivisionByZero { row: usize, col: usize },

    /// Invalid hypothesis handed to a parallel worker.
    #[error("invalid hypothesis: {0}")]
    InvalidHypothesis(String),
}
