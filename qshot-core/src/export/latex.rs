//! LaTeX circuit renderer using the `qcircuit` package
//!
//! One row per qubit, then one row per classical bit. Every operation gets
//! its own column, in log order, followed by a trailing wire column.
//!
//! # Required LaTeX packages
//!
//! ```latex
//! \usepackage[braket, qm]{qcircuit}
//! ```
//!
//! # Example
//!
//! ```
//! use qshot_core::export::{self, LatexConfig};
//! use qshot_core::Circuit;
//! use qshot_gates::GateKind;
//!
//! let mut circuit = Circuit::new(1, 1).unwrap();
//! circuit.add_gate(GateKind::H, &[0]).unwrap();
//! circuit.measure(0, 0).unwrap();
//!
//! let latex = export::latex(&circuit, &LatexConfig::default());
//! assert!(latex.starts_with("\\Qcircuit @C=1em @R=.7em {"));
//! assert!(latex.contains("\\gate{H}"));
//! assert!(latex.contains("\\meter"));
//! ```

use crate::operation::{Basis, Operation};
use crate::Circuit;
use qshot_gates::GateKind;
use std::fmt::Write;

/// Configuration for LaTeX rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatexConfig {
    /// Wrap the diagram in a compilable `standalone` document
    pub standalone: bool,
    /// Show `\ket{0}` and `b_j` labels in front of the wires
    pub show_labels: bool,
    /// Decimal places for gate parameters
    pub float_precision: usize,
}

impl Default for LatexConfig {
    fn default() -> Self {
        Self {
            standalone: false,
            show_labels: true,
            float_precision: 4,
        }
    }
}

impl LatexConfig {
    /// Configuration producing a standalone document
    pub fn standalone() -> Self {
        Self {
            standalone: true,
            ..Default::default()
        }
    }

    /// Builder-style method to set standalone mode
    pub fn with_standalone(mut self, standalone: bool) -> Self {
        self.standalone = standalone;
        self
    }

    /// Builder-style method to set labels
    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self
    }

    /// Builder-style method to set parameter precision
    pub fn with_float_precision(mut self, precision: usize) -> Self {
        self.float_precision = precision;
        self
    }
}

/// Render `circuit` with `config`
pub fn render(circuit: &Circuit, config: &LatexConfig) -> String {
    LatexRenderer::new(circuit, config).render()
}

struct LatexRenderer<'a> {
    circuit: &'a Circuit,
    config: &'a LatexConfig,
}

impl<'a> LatexRenderer<'a> {
    fn new(circuit: &'a Circuit, config: &'a LatexConfig) -> Self {
        Self { circuit, config }
    }

    fn render(&self) -> String {
        let mut output = String::new();

        if self.config.standalone {
            output.push_str("\\documentclass[border=2pt]{standalone}\n");
            output.push_str("\\usepackage[braket, qm]{qcircuit}\n");
            output.push_str("\\begin{document}\n");
        }

        self.write_circuit(&mut output);

        if self.config.standalone {
            output.push_str("\\end{document}\n");
        }

        output
    }

    fn write_circuit(&self, output: &mut String) {
        let num_qubits = self.circuit.num_qubits();
        let grid = self.build_grid();

        output.push_str("\\Qcircuit @C=1em @R=.7em {\n");
        let last = grid.len() - 1;
        for (row, cells) in grid.iter().enumerate() {
            let is_quantum = row < num_qubits;
            if self.config.show_labels {
                if is_quantum {
                    output.push_str("\\lstick{\\ket{0}}");
                } else {
                    let _ = write!(output, "\\lstick{{b_{{{}}}}}", row - num_qubits);
                }
            }
            for cell in cells {
                output.push_str(" & ");
                output.push_str(cell);
            }
            output.push_str(if is_quantum { " & \\qw" } else { " & \\cw" });
            output.push_str(if row < last { " \\\\\n" } else { "\n" });
        }
        output.push_str("}\n");
    }

    /// One cell per (row, operation); untouched cells carry a plain wire
    fn build_grid(&self) -> Vec<Vec<String>> {
        let num_qubits = self.circuit.num_qubits();
        let num_rows = num_qubits + self.circuit.num_bits();
        let num_cols = self.circuit.len();

        let mut grid: Vec<Vec<String>> = (0..num_rows)
            .map(|row| {
                let wire = if row < num_qubits { "\\qw" } else { "\\cw" };
                vec![wire.to_string(); num_cols]
            })
            .collect();

        for (col, op) in self.circuit.operations().iter().enumerate() {
            let mut cell = |row: usize, text: String| grid[row][col] = text;
            match op {
                Operation::Gate { gate, targets } => {
                    self.gate_cells(gate, targets, &mut cell);
                }
                Operation::Measure {
                    qubit,
                    cbit,
                    basis,
                    destructive,
                } => {
                    let meter = match (destructive, basis) {
                        (true, Basis::Z) => "\\meter".to_string(),
                        (true, basis) => format!("\\meterB{{{}}}", basis_name(basis)),
                        (false, Basis::Z) => "\\measure{P}".to_string(),
                        (false, basis) => format!("\\measure{{P_{}}}", basis_name(basis)),
                    };
                    cell(*qubit, meter);
                    let row = num_qubits + cbit;
                    cell(row, format!("\\cw \\cwx[{}]", offset(row, *qubit)));
                }
                Operation::Reset { qubit } => {
                    cell(*qubit, "\\gate{\\left|0\\right\\rangle}".to_string());
                }
                Operation::Barrier { qubits } => {
                    let low = qubits.iter().copied().min().unwrap_or(0);
                    let high = qubits.iter().copied().max().unwrap_or(0);
                    cell(low, format!("\\qw \\barrier[0em]{{{}}}", high - low));
                }
                Operation::Conditional {
                    cbits,
                    value,
                    gate,
                    targets,
                } => {
                    self.gate_cells(gate, targets, &mut cell);
                    let anchor = targets.last().copied().unwrap_or(0);
                    for (pos, &bit) in cbits.iter().enumerate() {
                        let row = num_qubits + bit;
                        let wanted = pos < 64 && (value >> pos) & 1 == 1;
                        let control = if wanted { "\\cctrl" } else { "\\cctrlo" };
                        cell(row, format!("{}{{{}}}", control, offset(row, anchor)));
                    }
                }
            }
        }
        grid
    }

    fn gate_cells(&self, gate: &GateKind, targets: &[usize], cell: &mut impl FnMut(usize, String)) {
        let controls = gate.num_controls();
        let (control_wires, acted) = targets.split_at(controls.min(targets.len()));
        let Some(&target) = acted.first() else {
            return;
        };

        for &control in control_wires {
            cell(control, format!("\\ctrl{{{}}}", offset(control, target)));
        }

        match gate {
            GateKind::CX | GateKind::CCX => cell(target, "\\targ".to_string()),
            GateKind::CY => cell(target, "\\gate{Y}".to_string()),
            GateKind::CZ => cell(target, "\\control \\qw".to_string()),
            GateKind::CH => cell(target, "\\gate{H}".to_string()),
            GateKind::Swap => {
                if let [first, second] = acted {
                    cell(*first, format!("\\qswap \\qwx[{}]", offset(*first, *second)));
                    cell(*second, "\\qswap".to_string());
                }
            }
            single => cell(target, format!("\\gate{{{}}}", self.gate_label(single))),
        }
    }

    fn gate_label(&self, gate: &GateKind) -> String {
        let base = match gate {
            GateKind::Sdg => "S^\\dagger",
            GateKind::Tdg => "T^\\dagger",
            GateKind::V => "\\sqrt{X}",
            GateKind::Vdg => "\\sqrt{X}^\\dagger",
            GateKind::RX(_) => "R_x",
            GateKind::RY(_) => "R_y",
            GateKind::RZ(_) => "R_z",
            GateKind::U1(_) => "U_1",
            GateKind::U2(..) => "U_2",
            GateKind::U3(..) => "U_3",
            other => other.name(),
        };
        let params = gate.params();
        if params.is_empty() {
            return base.to_string();
        }
        let precision = self.config.float_precision;
        let rendered: Vec<String> = params
            .iter()
            .map(|p| format!("{:.*}", precision, p))
            .collect();
        format!("{}({})", base, rendered.join(", "))
    }
}

fn basis_name(basis: &Basis) -> &'static str {
    match basis {
        Basis::Z => "Z",
        Basis::X => "X",
        Basis::Y => "Y",
    }
}

/// Signed row distance from `from` to `to`
fn offset(from: usize, to: usize) -> isize {
    to as isize - from as isize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(latex: &str) -> Vec<&str> {
        latex
            .lines()
            .filter(|line| line.starts_with("\\lstick"))
            .collect()
    }

    #[test]
    fn test_empty_circuit() {
        let circuit = Circuit::new(2, 1).unwrap();
        let latex = render(&circuit, &LatexConfig::default());
        assert_eq!(
            latex,
            "\\Qcircuit @C=1em @R=.7em {\n\
             \\lstick{\\ket{0}} & \\qw \\\\\n\
             \\lstick{\\ket{0}} & \\qw \\\\\n\
             \\lstick{b_{0}} & \\cw\n\
             }\n"
        );
    }

    #[test]
    fn test_rotation_and_cnot() {
        let mut circuit = Circuit::new(2, 0).unwrap();
        circuit.add_gate(GateKind::RX(1.23), &[0]).unwrap();
        circuit.add_gate(GateKind::CX, &[1, 0]).unwrap();
        let latex = render(&circuit, &LatexConfig::default());
        let rows = rows(&latex);
        assert_eq!(
            rows[0],
            "\\lstick{\\ket{0}} & \\gate{R_x(1.2300)} & \\targ & \\qw \\\\"
        );
        assert_eq!(rows[1], "\\lstick{\\ket{0}} & \\qw & \\ctrl{-1} & \\qw");
    }

    #[test]
    fn test_measure_links_classical_row() {
        let mut circuit = Circuit::new(2, 2).unwrap();
        circuit.measure(0, 1).unwrap();
        circuit.peek(1, 0).unwrap();
        let latex = render(&circuit, &LatexConfig::default());
        let rows = rows(&latex);
        assert!(rows[0].contains("& \\meter &"));
        assert!(rows[1].contains("& \\measure{P} &"));
        // b_0 is row 2, qubit 1 is row 1
        assert!(rows[2].contains("& \\cw \\cwx[-1] &"));
        // b_1 is row 3, qubit 0 is row 0
        assert!(rows[3].starts_with("\\lstick{b_{1}} & \\cw \\cwx[-3]"));
    }

    #[test]
    fn test_conditional_controls() {
        let mut circuit = Circuit::new(1, 2).unwrap();
        circuit.add_conditional(&[0, 1], 1, GateKind::X, &[0]).unwrap();
        let latex = render(&circuit, &LatexConfig::default());
        let rows = rows(&latex);
        assert!(rows[0].contains("\\gate{X}"));
        assert!(rows[1].contains("\\cctrl{-1}"));
        assert!(rows[2].contains("\\cctrlo{-2}"));
    }

    #[test]
    fn test_swap_reset_and_barrier() {
        let mut circuit = Circuit::new(3, 0).unwrap();
        circuit.add_gate(GateKind::Swap, &[0, 2]).unwrap();
        circuit.reset(1).unwrap();
        circuit.barrier(&[]).unwrap();
        let latex = render(&circuit, &LatexConfig::default());
        let rows = rows(&latex);
        assert!(rows[0].contains("\\qswap \\qwx[2]"));
        assert!(rows[0].contains("\\qw \\barrier[0em]{2}"));
        assert!(rows[1].contains("\\gate{\\left|0\\right\\rangle}"));
        assert!(rows[2].contains("& \\qswap &"));
    }

    #[test]
    fn test_standalone_and_labels() {
        let circuit = Circuit::new(1, 0).unwrap();
        let config = LatexConfig::standalone().with_labels(false);
        let latex = render(&circuit, &config);
        assert!(latex.starts_with("\\documentclass"));
        assert!(latex.ends_with("\\end{document}\n"));
        assert!(!latex.contains("\\lstick"));
        assert!(latex.contains("\n & \\qw\n"));
    }

    #[test]
    fn test_precision() {
        let mut circuit = Circuit::new(1, 0).unwrap();
        circuit.add_gate(GateKind::U2(0.5, -1.0), &[0]).unwrap();
        let config = LatexConfig::default().with_float_precision(1);
        assert!(render(&circuit, &config).contains("\\gate{U_2(0.5, -1.0)}"));
    }
}
