//! Circuit: register sizes plus the append-only operation log

use crate::error::{QuantumError, Result};
use crate::export::{self, LatexConfig};
use crate::operation::{Basis, Operation};
use qshot_gates::GateKind;
use qshot_state::{MAX_PACKED_BITS, MAX_QUBITS};
use smallvec::SmallVec;
use std::fmt;

/// A quantum circuit over `n` qubits and `m` classical bits
///
/// Operations are only ever appended. Every append is validated first, so a
/// rejected operation leaves the circuit exactly as it was.
///
/// # Example
/// ```
/// use qshot_core::Circuit;
/// use qshot_gates::GateKind;
///
/// let mut circuit = Circuit::new(2, 2).unwrap();
/// circuit.add_gate(GateKind::H, &[0]).unwrap();
/// circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
/// circuit.measure(0, 0).unwrap();
/// circuit.measure(1, 1).unwrap();
///
/// assert_eq!(circuit.len(), 4);
/// assert!(circuit.add_gate(GateKind::X, &[2]).is_err());
/// assert_eq!(circuit.len(), 4);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    num_bits: usize,
    operations: Vec<Operation>,
}

impl Circuit {
    /// Create an empty circuit
    ///
    /// # Errors
    /// `InvalidArgument` if `num_qubits` is 0 or above [`MAX_QUBITS`]
    pub fn new(num_qubits: usize, num_bits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(QuantumError::InvalidArgument(
                "Circuit must have at least one qubit".to_string(),
            ));
        }
        if num_qubits > MAX_QUBITS {
            return Err(QuantumError::InvalidArgument(format!(
                "Circuit of {} qubits exceeds the maximum of {}",
                num_qubits, MAX_QUBITS
            )));
        }
        Ok(Self {
            num_qubits,
            num_bits,
            operations: Vec::new(),
        })
    }

    /// Number of qubits
    #[inline]
    pub const fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of classical bits
    #[inline]
    pub const fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// Number of recorded operations
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been recorded
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// The operation log in order
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// A specific operation by position
    pub fn get_operation(&self, index: usize) -> Option<&Operation> {
        self.operations.get(index)
    }

    /// Validate and append an operation
    ///
    /// # Errors
    /// - `OutOfRange` for a qubit or classical bit outside its register
    /// - `InvalidOperation` for wrong arity, repeated qubits or bits, or an
    ///   empty barrier or condition
    /// - `InvalidArgument` for non-finite gate parameters or a condition
    ///   value that does not fit its bits
    pub fn push(&mut self, operation: Operation) -> Result<()> {
        self.validate_operation(&operation)?;
        self.operations.push(operation);
        Ok(())
    }

    /// Append a gate
    pub fn add_gate(&mut self, gate: GateKind, targets: &[usize]) -> Result<()> {
        self.push(Operation::gate(gate, targets))
    }

    /// Append a destructive computational basis measurement
    pub fn measure(&mut self, qubit: usize, cbit: usize) -> Result<()> {
        self.push(Operation::measure(qubit, cbit))
    }

    /// Append a destructive measurement in `basis`
    pub fn measure_in(&mut self, qubit: usize, cbit: usize, basis: Basis) -> Result<()> {
        self.push(Operation::Measure {
            qubit,
            cbit,
            basis,
            destructive: true,
        })
    }

    /// Append a non-destructive measurement
    pub fn peek(&mut self, qubit: usize, cbit: usize) -> Result<()> {
        self.push(Operation::peek(qubit, cbit))
    }

    /// Append a reset of `qubit` to |0⟩
    pub fn reset(&mut self, qubit: usize) -> Result<()> {
        self.push(Operation::Reset { qubit })
    }

    /// Append a barrier; an empty list means every qubit
    pub fn barrier(&mut self, qubits: &[usize]) -> Result<()> {
        let qubits: SmallVec<[usize; 4]> = if qubits.is_empty() {
            (0..self.num_qubits).collect()
        } else {
            SmallVec::from_slice(qubits)
        };
        self.push(Operation::Barrier { qubits })
    }

    /// Append a gate conditioned on classical bits
    pub fn add_conditional(
        &mut self,
        cbits: &[usize],
        value: u64,
        gate: GateKind,
        targets: &[usize],
    ) -> Result<()> {
        self.push(Operation::conditional(cbits, value, gate, targets))
    }

    /// Check an operation against this circuit without appending it
    pub fn validate_operation(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::Gate { gate, targets } => self.check_gate(gate, targets),
            Operation::Measure { qubit, cbit, .. } => {
                self.check_qubit(*qubit)?;
                self.check_bit(*cbit)
            }
            Operation::Reset { qubit } => self.check_qubit(*qubit),
            Operation::Barrier { qubits } => {
                if qubits.is_empty() {
                    return Err(QuantumError::InvalidOperation(
                        "Barrier must cover at least one qubit".to_string(),
                    ));
                }
                self.check_distinct_qubits(qubits)
            }
            Operation::Conditional {
                cbits,
                value,
                gate,
                targets,
            } => {
                if cbits.is_empty() {
                    return Err(QuantumError::InvalidOperation(
                        "Condition must read at least one classical bit".to_string(),
                    ));
                }
                if cbits.len() > MAX_PACKED_BITS {
                    return Err(QuantumError::InvalidArgument(format!(
                        "Condition reads {} classical bits, at most {} are supported",
                        cbits.len(),
                        MAX_PACKED_BITS
                    )));
                }
                for (i, &bit) in cbits.iter().enumerate() {
                    self.check_bit(bit)?;
                    if cbits[..i].contains(&bit) {
                        return Err(QuantumError::InvalidOperation(format!(
                            "Duplicate classical bit {} in condition",
                            bit
                        )));
                    }
                }
                if cbits.len() < MAX_PACKED_BITS && *value >> cbits.len() != 0 {
                    return Err(QuantumError::InvalidArgument(format!(
                        "Condition value {} does not fit in {} bit(s)",
                        value,
                        cbits.len()
                    )));
                }
                self.check_gate(gate, targets)
            }
        }
    }

    fn check_gate(&self, gate: &GateKind, targets: &[usize]) -> Result<()> {
        gate.check(targets)?;
        self.check_distinct_qubits(targets)
    }

    fn check_distinct_qubits(&self, qubits: &[usize]) -> Result<()> {
        for (i, &qubit) in qubits.iter().enumerate() {
            self.check_qubit(qubit)?;
            if qubits[..i].contains(&qubit) {
                return Err(QuantumError::InvalidOperation(format!(
                    "Duplicate qubit {} in operation",
                    qubit
                )));
            }
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(QuantumError::invalid_qubit(qubit, self.num_qubits));
        }
        Ok(())
    }

    fn check_bit(&self, bit: usize) -> Result<()> {
        if bit >= self.num_bits {
            return Err(QuantumError::invalid_bit(bit, self.num_bits));
        }
        Ok(())
    }

    /// Number of layers when every operation waits for the wires it touches
    ///
    /// Classical bits count as wires, so a conditional waits for the
    /// measurements it reads.
    pub fn depth(&self) -> usize {
        let mut qubit_depth = vec![0usize; self.num_qubits];
        let mut bit_depth = vec![0usize; self.num_bits];
        let mut depth = 0;

        for op in &self.operations {
            let qubits = op.qubits();
            let cbits = op.cbits();
            let layer = qubits
                .iter()
                .map(|&q| qubit_depth[q])
                .chain(cbits.iter().map(|&b| bit_depth[b]))
                .max()
                .unwrap_or(0)
                + 1;
            for &q in &qubits {
                qubit_depth[q] = layer;
            }
            for &b in &cbits {
                bit_depth[b] = layer;
            }
            depth = depth.max(layer);
        }
        depth
    }

    /// Number of gate applications, conditional ones included
    pub fn gate_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, Operation::Gate { .. } | Operation::Conditional { .. }))
            .count()
    }

    /// Render as a `qcircuit` LaTeX diagram with default settings
    pub fn to_latex(&self) -> String {
        export::latex(self, &LatexConfig::default())
    }

    /// Render as OpenQASM 2.0
    pub fn to_open_qasm(&self) -> String {
        export::open_qasm(self)
    }

    /// Render as cQASM 1.0
    pub fn to_c_qasm(&self) -> String {
        export::c_qasm(self)
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Circuit({} qubits, {} bits, {} operations)",
            self.num_qubits,
            self.num_bits,
            self.operations.len()
        )?;
        for (i, op) in self.operations.iter().enumerate() {
            writeln!(f, "  {:>3}: {}", i, op)?;
        }
        Ok(())
    }
}
