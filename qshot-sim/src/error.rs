//! Error types for execution

use qshot_core::QuantumError;
use qshot_gates::GateError;
use qshot_state::StateError;
use thiserror::Error;

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, ExecutionError>;

/// Coarse classification of an [`ExecutionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Index outside a register
    OutOfRange,
    /// Malformed operation
    InvalidOperation,
    /// Bad argument or configuration
    InvalidArgument,
    /// Measurement with no possible outcome
    NumericDegeneracy,
    /// Stopped by a cancellation request
    Cancelled,
    /// Worker pool or exact evaluation exceeded its resources
    Resource,
}

/// Errors that can occur while executing shots
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExecutionError {
    /// Failure while replaying the circuit
    #[error(transparent)]
    Quantum(#[from] QuantumError),

    /// Cancelled through a [`CancelToken`](crate::CancelToken)
    #[error("Execution cancelled after {completed} completed shot(s)")]
    Cancelled { completed: usize },

    /// Dedicated thread pool could not be built
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),
}

impl ExecutionError {
    /// Classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecutionError::Quantum(QuantumError::OutOfRange { .. }) => ErrorKind::OutOfRange,
            ExecutionError::Quantum(QuantumError::InvalidOperation(_)) => {
                ErrorKind::InvalidOperation
            }
            ExecutionError::Quantum(QuantumError::InvalidArgument(_)) => {
                ErrorKind::InvalidArgument
            }
            ExecutionError::Quantum(QuantumError::NumericDegeneracy { .. }) => {
                ErrorKind::NumericDegeneracy
            }
            ExecutionError::Quantum(QuantumError::ResourceExhausted { .. }) => ErrorKind::Resource,
            ExecutionError::Cancelled { .. } => ErrorKind::Cancelled,
            ExecutionError::ThreadPool(_) => ErrorKind::Resource,
        }
    }

    /// Whether the execution stopped because it was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionError::Cancelled { .. })
    }
}

impl From<StateError> for ExecutionError {
    fn from(err: StateError) -> Self {
        ExecutionError::Quantum(err.into())
    }
}

impl From<GateError> for ExecutionError {
    fn from(err: GateError) -> Self {
        ExecutionError::Quantum(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: ExecutionError = StateError::NumericDegeneracy { qubit: 0 }.into();
        assert_eq!(err.kind(), ErrorKind::NumericDegeneracy);

        let err: ExecutionError = QuantumError::invalid_bit(3, 1).into();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);

        let err: ExecutionError = QuantumError::ResourceExhausted {
            needed: 1 << 30,
            limit: 1 << 24,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Resource);

        let err = ExecutionError::Cancelled { completed: 12 };
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn test_transparent_display() {
        let err: ExecutionError = QuantumError::InvalidArgument("shots".to_string()).into();
        assert_eq!(err.to_string(), "Invalid argument: shots");
    }
}
