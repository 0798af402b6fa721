//! Text renderings of a circuit
//!
//! All exporters are pure functions of the [`Circuit`]: they never fail and
//! produce byte-identical output for the same circuit.
//!
//! - [`latex`]: `qcircuit` diagram
//! - [`open_qasm`]: OpenQASM 2.0
//! - [`c_qasm`]: cQASM 1.0

pub mod c_qasm;
pub mod latex;
pub mod open_qasm;

pub use latex::LatexConfig;

use crate::Circuit;

/// Render a circuit as a `qcircuit` LaTeX diagram
pub fn latex(circuit: &Circuit, config: &LatexConfig) -> String {
    latex::render(circuit, config)
}

/// Render a circuit as OpenQASM 2.0
pub fn open_qasm(circuit: &Circuit) -> String {
    open_qasm::render(circuit)
}

/// Render a circuit as cQASM 1.0
pub fn c_qasm(circuit: &Circuit) -> String {
    c_qasm::render(circuit)
}

/// Shortest representation that parses back to the same `f64`
pub(crate) fn format_angle(value: f64) -> String {
    format!("{}", value)
}

pub(crate) fn qubit_list(qubits: &[usize]) -> String {
    qubits
        .iter()
        .map(|q| format!("q[{}]", q))
        .collect::<Vec<_>>()
        .join(", ")
}
