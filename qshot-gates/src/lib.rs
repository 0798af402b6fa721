//! Gate algebra for qshot
//!
//! This crate defines the closed set of gates the simulator understands and
//! everything needed to turn them into unitaries:
//!
//! - [`GateKind`]: one variant per gate, carrying its parameters
//! - [`matrices`]: constant matrices for fixed gates and generators for
//!   rotations and generic unitaries
//! - [`matrix_ops`]: [`GateMatrix`] with product, adjoint, Kronecker
//!   product and unitarity checks
//!
//! # Example
//!
//! ```
//! use qshot_gates::GateKind;
//! use qshot_state::StateVector;
//!
//! // Bell state
//! let mut state = StateVector::new(2).unwrap();
//! GateKind::H.apply(&mut state, &[0]).unwrap();
//! GateKind::CX.apply(&mut state, &[0, 1]).unwrap();
//!
//! let probs = state.probabilities();
//! assert!((probs[0b00] - 0.5).abs() < 1e-12);
//! assert!((probs[0b11] - 0.5).abs() < 1e-12);
//! ```

pub mod error;
pub mod kind;
pub mod matrices;
pub mod matrix_ops;

pub use error::{GateError, Result};
pub use kind::GateKind;
pub use matrix_ops::GateMatrix;
