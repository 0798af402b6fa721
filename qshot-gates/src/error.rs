//! Error types for gate construction and application

use qshot_state::StateError;
use thiserror::Error;

/// Errors raised by the gate algebra
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GateError {
    /// Target list length does not match the gate arity
    #[error("Gate {gate} acts on {expected} qubit(s), got {found} target(s)")]
    ArityMismatch {
        gate: &'static str,
        expected: usize,
        found: usize,
    },

    /// A rotation angle or phase is NaN or infinite
    #[error("Gate {gate} has non-finite parameter {value}")]
    NonFiniteParameter { gate: &'static str, value: f64 },

    /// Failure in the state kernels (range, duplicates)
    #[error(transparent)]
    State(#[from] StateError),
}

/// Result type for gate operations
pub type Result<T> = std::result::Result<T, GateError>;
