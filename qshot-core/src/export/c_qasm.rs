//! cQASM 1.0 exporter
//!
//! cQASM has no `u1`/`u2`/`u3`, `cy` or `ch`. Those kinds are written as
//! sequences of native instructions: the `u` family up to a global phase,
//! `cy` and `ch` exactly. Conditional gates use the binary-controlled `c-`
//! prefix, with `not` flips around bits that must read 0.

use super::{format_angle, qubit_list};
use crate::operation::Operation;
use crate::Circuit;
use qshot_gates::GateKind;
use smallvec::{smallvec, SmallVec};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fmt::Write;

/// One native cQASM instruction
#[derive(Debug, Clone, PartialEq)]
struct Native {
    name: &'static str,
    qubits: SmallVec<[usize; 3]>,
    angle: Option<f64>,
}

impl Native {
    fn new(name: &'static str, qubits: &[usize]) -> Self {
        Self {
            name,
            qubits: SmallVec::from_slice(qubits),
            angle: None,
        }
    }

    fn rotation(name: &'static str, qubit: usize, angle: f64) -> Self {
        Self {
            name,
            qubits: smallvec![qubit],
            angle: Some(angle),
        }
    }

    /// Render, optionally binary-controlled by `bits`
    fn render(&self, bits: Option<&str>) -> String {
        let mut line = match bits {
            Some(bits) => format!("c-{} {}, {}", self.name, bits, qubit_list(&self.qubits)),
            None => format!("{} {}", self.name, qubit_list(&self.qubits)),
        };
        if let Some(angle) = self.angle {
            let _ = write!(line, ", {}", format_angle(angle));
        }
        line
    }
}

/// Native instruction sequence for a gate, in time order
fn natives(gate: &GateKind, targets: &[usize]) -> Vec<Native> {
    let euler = |theta: f64, phi: f64, lambda: f64, q: usize| {
        vec![
            Native::rotation("rz", q, lambda),
            Native::rotation("ry", q, theta),
            Native::rotation("rz", q, phi),
        ]
    };

    match (*gate, targets) {
        (GateKind::I, _) => vec![Native::new("i", targets)],
        (GateKind::X, _) => vec![Native::new("x", targets)],
        (GateKind::Y, _) => vec![Native::new("y", targets)],
        (GateKind::Z, _) => vec![Native::new("z", targets)],
        (GateKind::H, _) => vec![Native::new("h", targets)],
        (GateKind::S, _) => vec![Native::new("s", targets)],
        (GateKind::Sdg, _) => vec![Native::new("sdag", targets)],
        (GateKind::T, _) => vec![Native::new("t", targets)],
        (GateKind::Tdg, _) => vec![Native::new("tdag", targets)],
        (GateKind::V, _) => vec![Native::new("x90", targets)],
        (GateKind::Vdg, _) => vec![Native::new("mx90", targets)],
        (GateKind::RX(theta), &[q]) => vec![Native::rotation("rx", q, theta)],
        (GateKind::RY(theta), &[q]) => vec![Native::rotation("ry", q, theta)],
        (GateKind::RZ(theta), &[q]) => vec![Native::rotation("rz", q, theta)],
        (GateKind::U1(lambda), &[q]) => vec![Native::rotation("rz", q, lambda)],
        (GateKind::U2(phi, lambda), &[q]) => euler(FRAC_PI_2, phi, lambda, q),
        (GateKind::U3(theta, phi, lambda), &[q]) => euler(theta, phi, lambda, q),
        (GateKind::CX, _) => vec![Native::new("cnot", targets)],
        (GateKind::CZ, _) => vec![Native::new("cz", targets)],
        (GateKind::Swap, _) => vec![Native::new("swap", targets)],
        (GateKind::CCX, _) => vec![Native::new("toffoli", targets)],
        (GateKind::CY, &[control, target]) => vec![
            Native::new("sdag", &[target]),
            Native::new("cnot", &[control, target]),
            Native::new("s", &[target]),
        ],
        (GateKind::CH, &[control, target]) => vec![
            Native::rotation("ry", target, -FRAC_PI_4),
            Native::new("cz", &[control, target]),
            Native::rotation("ry", target, FRAC_PI_4),
        ],
        // wrong arity; rejected by Circuit::push
        _ => Vec::new(),
    }
}

/// Render `circuit` as a cQASM 1.0 program
///
/// # Example
/// ```
/// use qshot_core::{export, Circuit};
/// use qshot_gates::GateKind;
///
/// let mut circuit = Circuit::new(2, 2).unwrap();
/// circuit.add_gate(GateKind::RX(0.5), &[0]).unwrap();
/// circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
/// circuit.measure(1, 1).unwrap();
///
/// assert_eq!(
///     export::c_qasm(&circuit),
///     "version 1.0\n\nqubits 2\n\nrx q[0], 0.5\ncnot q[0], q[1]\nmeasure_z q[1]\n"
/// );
/// ```
pub fn render(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("version 1.0\n\n");
    let _ = writeln!(out, "qubits {}", circuit.num_qubits());
    if !circuit.is_empty() {
        out.push('\n');
    }

    for op in circuit.operations() {
        match op {
            Operation::Gate { gate, targets } => {
                for native in natives(gate, targets) {
                    let _ = writeln!(out, "{}", native.render(None));
                }
            }
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive,
            } => {
                if *destructive {
                    let _ = write!(out, "measure_{} q[{}]", basis.label(), qubit);
                    if cbit != qubit {
                        let _ = write!(out, " # -> b[{}]", cbit);
                    }
                    out.push('\n');
                } else {
                    let _ = writeln!(out, "display b[{}]", cbit);
                }
            }
            Operation::Reset { qubit } => {
                let _ = writeln!(out, "prep_z q[{}]", qubit);
            }
            Operation::Barrier { qubits } => {
                let _ = writeln!(out, "# barrier {}", qubit_list(qubits));
            }
            Operation::Conditional {
                cbits,
                value,
                gate,
                targets,
            } => {
                let zeros: Vec<usize> = cbits
                    .iter()
                    .enumerate()
                    .filter(|(pos, _)| *pos >= 64 || (value >> pos) & 1 == 0)
                    .map(|(_, &bit)| bit)
                    .collect();
                let bits = format!(
                    "b[{}]",
                    cbits
                        .iter()
                        .map(|b| b.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                );

                for bit in &zeros {
                    let _ = writeln!(out, "not b[{}]", bit);
                }
                for native in natives(gate, targets) {
                    let _ = writeln!(out, "{}", native.render(Some(&bits)));
                }
                for bit in &zeros {
                    let _ = writeln!(out, "not b[{}]", bit);
                }
            }
        }
    }
    out
}
