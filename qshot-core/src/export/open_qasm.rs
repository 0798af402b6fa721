//! OpenQASM 2.0 exporter
//!
//! Quantum register `q`, classical register `b`. Operations without an
//! OpenQASM 2.0 spelling (peeks, conditions on a subset of `b`) are kept as
//! comments so no information is lost. `sx` and `sxdg` are not part of the
//! original `qelib1.inc`, so programs using them define both after the
//! include.

use super::{format_angle, qubit_list};
use crate::operation::Operation;
use crate::Circuit;
use qshot_gates::GateKind;
use std::fmt::Write;

/// `qelib1.inc` mnemonic of a gate kind
pub fn mnemonic(gate: &GateKind) -> &'static str {
    match gate {
        GateKind::I => "id",
        GateKind::X => "x",
        GateKind::Y => "y",
        GateKind::Z => "z",
        GateKind::H => "h",
        GateKind::S => "s",
        GateKind::Sdg => "sdg",
        GateKind::T => "t",
        GateKind::Tdg => "tdg",
        GateKind::V => "sx",
        GateKind::Vdg => "sxdg",
        GateKind::RX(_) => "rx",
        GateKind::RY(_) => "ry",
        GateKind::RZ(_) => "rz",
        GateKind::U1(_) => "u1",
        GateKind::U2(..) => "u2",
        GateKind::U3(..) => "u3",
        GateKind::CX => "cx",
        GateKind::CY => "cy",
        GateKind::CZ => "cz",
        GateKind::CH => "ch",
        GateKind::Swap => "swap",
        GateKind::CCX => "ccx",
    }
}

/// `sx` and `sxdg` in terms of `qelib1.inc` gates, equal up to global phase
const SQRT_X_DEFINITIONS: &str = "gate sx a { sdg a; h a; sdg a; }\ngate sxdg a { s a; h a; s a; }\n";

fn uses_sqrt_x(circuit: &Circuit) -> bool {
    circuit.operations().iter().any(|op| match op {
        Operation::Gate { gate, .. } | Operation::Conditional { gate, .. } => {
            matches!(gate, GateKind::V | GateKind::Vdg)
        }
        _ => false,
    })
}

fn gate_statement(gate: &GateKind, targets: &[usize]) -> String {
    let params = gate.params();
    if params.is_empty() {
        format!("{} {};", mnemonic(gate), qubit_list(targets))
    } else {
        let rendered: Vec<String> = params.iter().map(|p| format_angle(*p)).collect();
        format!(
            "{}({}) {};",
            mnemonic(gate),
            rendered.join(", "),
            qubit_list(targets)
        )
    }
}

/// Render `circuit` as an OpenQASM 2.0 program
///
/// # Example
/// ```
/// use qshot_core::{export, Circuit};
/// use qshot_gates::GateKind;
///
/// let mut circuit = Circuit::new(2, 2).unwrap();
/// circuit.add_gate(GateKind::H, &[0]).unwrap();
/// circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
/// circuit.measure(1, 1).unwrap();
///
/// assert_eq!(
///     export::open_qasm(&circuit),
///     "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[2];\ncreg b[2];\n\
///      h q[0];\ncx q[0], q[1];\nmeasure q[1] -> b[1];\n"
/// );
/// ```
pub fn render(circuit: &Circuit) -> String {
    let mut out = String::new();
    out.push_str("OPENQASM 2.0;\n");
    out.push_str("include \"qelib1.inc\";\n");
    if uses_sqrt_x(circuit) {
        out.push_str(SQRT_X_DEFINITIONS);
    }
    let _ = writeln!(out, "qreg q[{}];", circuit.num_qubits());
    if circuit.num_bits() > 0 {
        let _ = writeln!(out, "creg b[{}];", circuit.num_bits());
    }

    for op in circuit.operations() {
        match op {
            Operation::Gate { gate, targets } => {
                let _ = writeln!(out, "{}", gate_statement(gate, targets));
            }
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive: true,
            } => {
                for gate in basis.to_computational() {
                    let _ = writeln!(out, "{}", gate_statement(gate, &[*qubit]));
                }
                let _ = writeln!(out, "measure q[{}] -> b[{}];", qubit, cbit);
                for gate in basis.from_computational() {
                    let _ = writeln!(out, "{}", gate_statement(gate, &[*qubit]));
                }
            }
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive: false,
            } => {
                let verb = match basis.label() {
                    "z" => "peek".to_string(),
                    label => format!("peek_{}", label),
                };
                let _ = writeln!(out, "// {} q[{}] -> b[{}]", verb, qubit, cbit);
            }
            Operation::Reset { qubit } => {
                let _ = writeln!(out, "reset q[{}];", qubit);
            }
            Operation::Barrier { qubits } => {
                let _ = writeln!(out, "barrier {};", qubit_list(qubits));
            }
            Operation::Conditional {
                cbits,
                value,
                gate,
                targets,
            } => {
                let whole_register = cbits.len() == circuit.num_bits()
                    && cbits.iter().enumerate().all(|(i, &b)| i == b);
                let statement = gate_statement(gate, targets);
                if whole_register {
                    let _ = writeln!(out, "if(b=={}) {}", value, statement);
                } else {
                    let bits: Vec<String> = cbits.iter().map(|b| format!("b[{}]", b)).collect();
                    let _ = writeln!(out, "// if({} == {}) {}", bits.join(", "), value, statement);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Basis;

    #[test]
    fn test_header_without_classical_bits() {
        let circuit = Circuit::new(3, 0).unwrap();
        assert_eq!(
            render(&circuit),
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\nqreg q[3];\n"
        );
    }

    #[test]
    fn test_parametric_gates_keep_full_precision() {
        let mut circuit = Circuit::new(1, 0).unwrap();
        circuit.add_gate(GateKind::RX(1.23), &[0]).unwrap();
        circuit
            .add_gate(GateKind::U3(0.1 + 0.2, -1.0, std::f64::consts::PI), &[0])
            .unwrap();
        let qasm = render(&circuit);
        assert!(qasm.contains("rx(1.23) q[0];\n"));
        assert!(qasm.contains("u3(0.30000000000000004, -1, 3.141592653589793) q[0];\n"));
    }

    #[test]
    fn test_basis_measurements_and_peek() {
        let mut circuit = Circuit::new(1, 2).unwrap();
        circuit.measure_in(0, 0, Basis::Y).unwrap();
        circuit.peek(0, 1).unwrap();
        let qasm = render(&circuit);
        assert!(qasm.ends_with(
            "sdg q[0];\nh q[0];\nmeasure q[0] -> b[0];\nh q[0];\ns q[0];\n// peek q[0] -> b[1]\n"
        ));
    }

    #[test]
    fn test_conditionals() {
        let mut circuit = Circuit::new(2, 3).unwrap();
        circuit
            .add_conditional(&[0, 1, 2], 5, GateKind::X, &[1])
            .unwrap();
        circuit.add_conditional(&[0, 2], 3, GateKind::CZ, &[0, 1]).unwrap();
        let qasm = render(&circuit);
        assert!(qasm.contains("if(b==5) x q[1];\n"));
        assert!(qasm.contains("// if(b[0], b[2] == 3) cz q[0], q[1];\n"));
    }

    #[test]
    fn test_reset_and_barrier() {
        let mut circuit = Circuit::new(2, 0).unwrap();
        circuit.reset(1).unwrap();
        circuit.barrier(&[]).unwrap();
        circuit.add_gate(GateKind::V, &[0]).unwrap();
        let qasm = render(&circuit);
        assert!(qasm.ends_with("reset q[1];\nbarrier q[0], q[1];\nsx q[0];\n"));
    }

    #[test]
    fn test_sqrt_x_defined_when_used() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        assert!(!render(&circuit).contains("gate sx"));

        circuit.add_conditional(&[0], 1, GateKind::Vdg, &[0]).unwrap();
        assert_eq!(
            render(&circuit),
            "OPENQASM 2.0;\ninclude \"qelib1.inc\";\n\
             gate sx a { sdg a; h a; sdg a; }\ngate sxdg a { s a; h a; s a; }\n\
             qreg q[1];\ncreg b[1];\nh q[0];\nif(b==1) sxdg q[0];\n"
        );
    }

    #[test]
    fn test_sqrt_x_definitions_match_gates() {
        let sandwich = |outer: GateKind| {
            let m = outer.matrix();
            m.multiply(&GateKind::H.matrix())
                .and_then(|mh| mh.multiply(&m))
                .unwrap()
        };
        assert!(sandwich(GateKind::Sdg).approx_eq_up_to_phase(&GateKind::V.matrix(), 1e-12));
        assert!(sandwich(GateKind::S).approx_eq_up_to_phase(&GateKind::Vdg.matrix(), 1e-12));
    }
}
