//! # qshot
//!
//! Gate-model quantum circuit simulation: record a circuit through a
//! [`Session`], ask for exact outcome probabilities while building, run it
//! for many shots in parallel and export it as LaTeX, OpenQASM 2.0 or
//! cQASM 1.0.
//!
//! ## Crates
//!
//! - `qshot-state`: amplitude store, gate kernels, measurement
//! - `qshot-gates`: the closed set of gate kinds and their matrices
//! - `qshot-core`: operation log, validation, exporters
//! - `qshot-sim`: shot executor, histogram, exact previews
//!
//! ## Example
//!
//! ```
//! use qshot::{ExecutionError, Session};
//!
//! let counts = Session::scoped(2, 2, |s| -> Result<_, ExecutionError> {
//!     s.h(0)?.cx(0, 1)?;
//!     s.measure_all()?;
//!     Ok(s.execute(1000)?.clone())
//! })
//! .unwrap();
//!
//! assert_eq!(counts.total(), 1000);
//! assert_eq!(counts.get("01") + counts.get("10"), 0);
//! ```

pub mod session;

pub use session::{Session, MAX_QUBITS};

pub use qshot_core::{
    export, Basis, Circuit, IndexKind, LatexConfig, Operation, QuantumError,
};
pub use qshot_gates::{GateKind, GateMatrix};
pub use qshot_sim::{
    CancelToken, ErrorKind, ExecutionError, ExecutionResult, ExecutionStatistics, Executor,
    ExecutorConfig, Histogram, Preview,
};
pub use qshot_state::{ClassicalRegister, StateVector};

/// Commonly used items
pub mod prelude {
    pub use crate::{
        Basis, Circuit, ExecutionError, ExecutorConfig, GateKind, Histogram, QuantumError,
        Session,
    };
}
