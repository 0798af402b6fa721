//! Shot execution for qshot circuits
//!
//! This crate turns a recorded [`Circuit`](qshot_core::Circuit) into
//! statistics:
//!
//! # Features
//!
//! - **Parallel shots**: chunks of shots run on rayon, each with its own
//!   state and seeded generator, so seeded runs are reproducible for any
//!   thread count
//! - **Histograms**: counts keyed by the classical register bitstring
//! - **Exact previews**: outcome probabilities computed from a weighted
//!   branch ensemble instead of sampling
//! - **Cancellation**: a shared [`CancelToken`] stops a running execution
//!
//! # Example
//!
//! ```
//! use qshot_core::{Circuit, GateKind};
//! use qshot_sim::{Executor, ExecutorConfig};
//!
//! let mut circuit = Circuit::new(1, 1).unwrap();
//! circuit.add_gate(GateKind::X, &[0]).unwrap();
//! circuit.measure(0, 0).unwrap();
//!
//! let config = ExecutorConfig::deterministic(7).with_statistics(true);
//! let result = Executor::new(config).execute(&circuit, 100).unwrap();
//! assert_eq!(result.histogram.get("1"), 100);
//! println!("{}", result.statistics.unwrap());
//! ```

pub mod cancel;
pub mod config;
pub mod error;
pub mod executor;
pub mod histogram;
pub mod preview;
pub mod replay;
pub mod statistics;

pub use cancel::CancelToken;
pub use config::ExecutorConfig;
pub use error::{ErrorKind, ExecutionError, Result};
pub use executor::{ExecutionResult, Executor};
pub use histogram::Histogram;
pub use preview::Preview;
pub use statistics::ExecutionStatistics;
