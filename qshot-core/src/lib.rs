//! Core circuit model for qshot
//!
//! This crate records what a program does to its qubits:
//!
//! - [`Operation`]: gates, measurements (destructive or peek), resets,
//!   barriers and classically conditioned gates
//! - [`Circuit`]: register sizes plus the append-only operation log, with
//!   validation on every append
//! - [`QuantumError`]: the error taxonomy shared by every qshot crate
//! - [`export`]: LaTeX, OpenQASM 2.0 and cQASM 1.0 renderings
//!
//! # Example
//!
//! ```
//! use qshot_core::Circuit;
//! use qshot_gates::GateKind;
//!
//! let mut circuit = Circuit::new(2, 2).unwrap();
//! circuit.add_gate(GateKind::H, &[0]).unwrap();
//! circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
//! circuit.measure(0, 0).unwrap();
//! circuit.measure(1, 1).unwrap();
//!
//! let qasm = circuit.to_open_qasm();
//! assert!(qasm.contains("cx q[0], q[1];"));
//! ```

pub mod circuit;
pub mod error;
pub mod export;
pub mod operation;

pub use circuit::Circuit;
pub use error::{IndexKind, QuantumError, Result};
pub use export::LatexConfig;
pub use operation::{Basis, Operation};

pub use qshot_gates::GateKind;
pub use qshot_state::MAX_QUBITS;
