//! Error types for state vector operations

use thiserror::Error;

/// Errors that can occur during state vector operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Qubit index outside the register
    #[error("Qubit index {index} out of range for {num_qubits}-qubit state")]
    QubitOutOfRange { index: usize, num_qubits: usize },

    /// Classical bit index outside the register
    #[error("Classical bit index {index} out of range for {num_bits}-bit register")]
    BitOutOfRange { index: usize, num_bits: usize },

    /// The same qubit appears twice in one gate application
    #[error("Duplicate target qubit {qubit} in gate application")]
    DuplicateTarget { qubit: usize },

    /// Matrix size does not fit the number of targets
    #[error("Gate matrix of dimension {dimension} cannot act on {targets} target qubit(s)")]
    MatrixMismatch { dimension: usize, targets: usize },

    /// Invalid state dimension
    #[error("Invalid state dimension {dimension}, expected power of 2")]
    InvalidDimension { dimension: usize },

    /// Both measurement outcomes carry zero probability
    #[error("Measurement of qubit {qubit} is degenerate: both outcomes have zero probability")]
    NumericDegeneracy { qubit: usize },

    /// Too many qubits for a dense state vector
    #[error("Cannot allocate a state of {num_qubits} qubits, maximum is {max}")]
    TooManyQubits { num_qubits: usize, max: usize },

    /// Too many classical bits to pack into one integer
    #[error("Cannot pack {count} classical bits into an integer, maximum is {max}")]
    TooManyBits { count: usize, max: usize },
}

/// Result type for state vector operations
pub type Result<T> = std::result::Result<T, StateError>;
