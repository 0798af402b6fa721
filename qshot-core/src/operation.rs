//! Entries of the operation log

use qshot_gates::GateKind;
use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Basis a measurement is taken in
///
/// X and Y measurements rotate the qubit into the computational basis,
/// measure, and rotate back, so the qubit is left in an eigenstate of the
/// measured Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Basis {
    /// Computational basis
    #[default]
    Z,
    /// Hadamard basis
    X,
    /// Circular basis
    Y,
}

impl Basis {
    /// Gates mapping this basis onto the computational basis, in time order
    pub fn to_computational(&self) -> &'static [GateKind] {
        match self {
            Basis::Z => &[],
            Basis::X => &[GateKind::H],
            Basis::Y => &[GateKind::Sdg, GateKind::H],
        }
    }

    /// Gates undoing [`to_computational`](Self::to_computational), in time order
    pub fn from_computational(&self) -> &'static [GateKind] {
        match self {
            Basis::Z => &[],
            Basis::X => &[GateKind::H],
            Basis::Y => &[GateKind::H, GateKind::S],
        }
    }

    /// Lower-case label: `z`, `x` or `y`
    pub fn label(&self) -> &'static str {
        match self {
            Basis::Z => "z",
            Basis::X => "x",
            Basis::Y => "y",
        }
    }
}

/// One recorded step of a circuit
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operation {
    /// Unitary gate
    Gate {
        gate: GateKind,
        targets: SmallVec<[usize; 3]>,
    },

    /// Measurement of `qubit` into classical bit `cbit`
    ///
    /// A non-destructive measurement (a peek) samples the outcome without
    /// collapsing the state.
    Measure {
        qubit: usize,
        cbit: usize,
        basis: Basis,
        destructive: bool,
    },

    /// Force `qubit` to |0⟩ without touching the classical register
    Reset { qubit: usize },

    /// Scheduling fence; no effect on the state
    Barrier { qubits: SmallVec<[usize; 4]> },

    /// Apply `gate` only if `cbits` (least significant first) encode `value`
    Conditional {
        cbits: SmallVec<[usize; 4]>,
        value: u64,
        gate: GateKind,
        targets: SmallVec<[usize; 3]>,
    },
}

impl Operation {
    /// Gate on the given targets
    pub fn gate(gate: GateKind, targets: &[usize]) -> Self {
        Operation::Gate {
            gate,
            targets: SmallVec::from_slice(targets),
        }
    }

    /// Destructive measurement in the computational basis
    pub fn measure(qubit: usize, cbit: usize) -> Self {
        Operation::Measure {
            qubit,
            cbit,
            basis: Basis::Z,
            destructive: true,
        }
    }

    /// Non-destructive computational basis measurement
    pub fn peek(qubit: usize, cbit: usize) -> Self {
        Operation::Measure {
            qubit,
            cbit,
            basis: Basis::Z,
            destructive: false,
        }
    }

    /// Classically conditioned gate
    pub fn conditional(cbits: &[usize], value: u64, gate: GateKind, targets: &[usize]) -> Self {
        Operation::Conditional {
            cbits: SmallVec::from_slice(cbits),
            value,
            gate,
            targets: SmallVec::from_slice(targets),
        }
    }

    /// Every qubit the operation touches, in declaration order
    pub fn qubits(&self) -> SmallVec<[usize; 4]> {
        match self {
            Operation::Gate { targets, .. } | Operation::Conditional { targets, .. } => {
                targets.iter().copied().collect()
            }
            Operation::Measure { qubit, .. } | Operation::Reset { qubit } => smallvec![*qubit],
            Operation::Barrier { qubits } => qubits.clone(),
        }
    }

    /// Every classical bit the operation reads or writes
    pub fn cbits(&self) -> SmallVec<[usize; 4]> {
        match self {
            Operation::Measure { cbit, .. } => smallvec![*cbit],
            Operation::Conditional { cbits, .. } => cbits.clone(),
            _ => SmallVec::new(),
        }
    }

    /// Whether the operation writes a classical bit
    pub fn is_measurement(&self) -> bool {
        matches!(self, Operation::Measure { .. })
    }
}

fn write_qubits(f: &mut fmt::Formatter<'_>, qubits: &[usize]) -> fmt::Result {
    for (i, q) in qubits.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "q[{}]", q)?;
    }
    Ok(())
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Gate { gate, targets } => {
                write!(f, "{} ", gate)?;
                write_qubits(f, targets)
            }
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive,
            } => {
                let verb = if *destructive { "measure" } else { "peek" };
                write!(f, "{}_{} q[{}] -> b[{}]", verb, basis.label(), qubit, cbit)
            }
            Operation::Reset { qubit } => write!(f, "reset q[{}]", qubit),
            Operation::Barrier { qubits } => {
                f.write_str("barrier ")?;
                write_qubits(f, qubits)
            }
            Operation::Conditional {
                cbits,
                value,
                gate,
                targets,
            } => {
                let bits: Vec<String> = cbits.iter().map(|b| format!("b[{}]", b)).collect();
                write!(f, "if({} == {}) {} ", bits.join(", "), value, gate)?;
                write_qubits(f, targets)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qubits_and_cbits() {
        let op = Operation::conditional(&[2, 0], 1, GateKind::CX, &[1, 3]);
        assert_eq!(op.qubits().as_slice(), &[1, 3]);
        assert_eq!(op.cbits().as_slice(), &[2, 0]);
        assert!(!op.is_measurement());

        let op = Operation::peek(4, 1);
        assert_eq!(op.qubits().as_slice(), &[4]);
        assert_eq!(op.cbits().as_slice(), &[1]);
        assert!(op.is_measurement());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Operation::gate(GateKind::RX(1.23), &[0]).to_string(),
            "RX(1.2300) q[0]"
        );
        assert_eq!(Operation::measure(1, 2).to_string(), "measure_z q[1] -> b[2]");
        assert_eq!(Operation::peek(0, 0).to_string(), "peek_z q[0] -> b[0]");
        assert_eq!(
            Operation::conditional(&[0, 1], 3, GateKind::X, &[2]).to_string(),
            "if(b[0], b[1] == 3) X q[2]"
        );
    }

    #[test]
    fn test_basis_changes_are_inverse() {
        for basis in [Basis::Z, Basis::X, Basis::Y] {
            let forward = basis.to_computational();
            let back = basis.from_computational();
            assert_eq!(forward.len(), back.len());
            for (f, b) in forward.iter().zip(back.iter().rev()) {
                assert_eq!(f.adjoint(), *b);
            }
        }
    }
}
