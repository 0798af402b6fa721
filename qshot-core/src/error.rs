//! Error types for qshot

use qshot_gates::GateError;
use qshot_state::StateError;
use std::fmt;
use thiserror::Error;

/// Which register an out-of-range index refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// Qubit index
    Qubit,
    /// Classical bit index
    ClassicalBit,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::Qubit => f.write_str("Qubit"),
            IndexKind::ClassicalBit => f.write_str("Classical bit"),
        }
    }
}

/// Errors that can occur while building or simulating a circuit
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QuantumError {
    /// Qubit or classical bit index outside its register
    #[error("{kind} index {index} out of range: register has {bound}")]
    OutOfRange {
        kind: IndexKind,
        index: usize,
        bound: usize,
    },

    /// Structurally invalid operation (wrong arity, repeated qubit, ...)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid argument (negative shot count, non-finite angle, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Both outcomes of a measurement have zero probability
    #[error("Measurement of qubit {qubit} is numerically degenerate")]
    NumericDegeneracy { qubit: usize },

    /// Exact evaluation would need more amplitudes than its memory limit
    #[error("Exact evaluation needs {needed} amplitudes, limit is {limit}")]
    ResourceExhausted { needed: usize, limit: usize },
}

impl QuantumError {
    /// Create an out-of-range qubit error
    pub fn invalid_qubit(index: usize, num_qubits: usize) -> Self {
        Self::OutOfRange {
            kind: IndexKind::Qubit,
            index,
            bound: num_qubits,
        }
    }

    /// Create an out-of-range classical bit error
    pub fn invalid_bit(index: usize, num_bits: usize) -> Self {
        Self::OutOfRange {
            kind: IndexKind::ClassicalBit,
            index,
            bound: num_bits,
        }
    }
}

impl From<StateError> for QuantumError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::QubitOutOfRange { index, num_qubits } => {
                Self::invalid_qubit(index, num_qubits)
            }
            StateError::BitOutOfRange { index, num_bits } => Self::invalid_bit(index, num_bits),
            StateError::NumericDegeneracy { qubit } => Self::NumericDegeneracy { qubit },
            err @ (StateError::DuplicateTarget { .. } | StateError::MatrixMismatch { .. }) => {
                Self::InvalidOperation(err.to_string())
            }
            err @ (StateError::InvalidDimension { .. }
            | StateError::TooManyQubits { .. }
            | StateError::TooManyBits { .. }) => Self::InvalidArgument(err.to_string()),
        }
    }
}

impl From<GateError> for QuantumError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::State(inner) => inner.into(),
            err @ GateError::ArityMismatch { .. } => Self::InvalidOperation(err.to_string()),
            err @ GateError::NonFiniteParameter { .. } => Self::InvalidArgument(err.to_string()),
        }
    }
}

/// Result type for qshot operations
pub type Result<T> = std::result::Result<T, QuantumError>;
