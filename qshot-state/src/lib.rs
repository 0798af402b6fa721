//! Dense quantum state representation for qshot
//!
//! This crate is the leaf of the workspace. It provides:
//! - [`StateVector`]: the `2^n` complex amplitude store and gate kernels
//!   for arbitrary k-qubit unitaries on arbitrary target wires
//! - [`DensityMatrix`]: mixed states of a few qubits for exact evaluation
//! - [`ClassicalRegister`]: the bits written by measurements
//! - [`measurement`]: exact probabilities, sampled measurement with collapse,
//!   and non-destructive peeks
//!
//! # Example
//!
//! ```
//! use qshot_state::{measurement, StateVector};
//! use num_complex::Complex64;
//!
//! let mut state = StateVector::new(2).unwrap();
//! let h = std::f64::consts::FRAC_1_SQRT_2;
//! let hadamard = [
//!     [Complex64::new(h, 0.0), Complex64::new(h, 0.0)],
//!     [Complex64::new(h, 0.0), Complex64::new(-h, 0.0)],
//! ];
//! state.apply_single_qubit_gate(&hadamard, 0).unwrap();
//!
//! let p = measurement::probability_one(&state, 0).unwrap();
//! assert!((p - 0.5).abs() < 1e-12);
//! ```

pub mod classical;
pub mod density_matrix;
pub mod error;
pub mod kernels;
pub mod measurement;
pub mod state_vector;

pub use classical::{ClassicalRegister, MAX_PACKED_BITS};
pub use density_matrix::{DensityMatrix, MAX_DENSITY_QUBITS};
pub use error::{Result, StateError};
pub use measurement::{MeasurementResult, QubitMeasurement};
pub use state_vector::{StateVector, MAX_QUBITS};
