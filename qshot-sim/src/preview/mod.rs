//! Exact outcome probabilities without sampling
//!
//! A preview replays the operation log over the mixture the executor samples
//! from. It starts as weighted pure-state branches:
//!
//! - a measurement into a bit no conditional reads later only marks the
//!   qubit as dephased; the branches are split when a later operation acts
//!   on that qubit in another basis
//! - a measurement into a bit that is read splits both the states and the
//!   registers, and the bit is forgotten after the last conditional reading it
//! - branches with equal registers and equal states (up to a global phase)
//!   are merged
//!
//! When the branches would outgrow [`MAX_PREVIEW_AMPLITUDES`] and the
//! register is small enough, the ensemble switches to one density matrix per
//! register value. Past both limits the preview fails with
//! [`QuantumError::ResourceExhausted`].

mod branches;
mod mixture;

use branches::Branches;
use mixture::Mixture;
use qshot_core::{Basis, Circuit, Operation, QuantumError, Result};
use qshot_gates::GateKind;
use qshot_state::{measurement, DensityMatrix, StateVector, MAX_DENSITY_QUBITS};
use tracing::debug;

/// Default cap on the complex amplitudes a preview holds (256 MiB)
pub const MAX_PREVIEW_AMPLITUDES: usize = 1 << 24;

/// Outcomes below this weight are dropped
const PRUNE_WEIGHT: f64 = 1e-15;

/// Largest factor one operation can grow the branch count by: three
/// deferred dephasings resolved under a three-qubit gate
const WORST_GROWTH: usize = 8;

fn rotate_state(state: &mut StateVector, gates: &[GateKind], qubit: usize) -> Result<()> {
    for gate in gates {
        gate.apply(state, &[qubit])?;
    }
    Ok(())
}

fn rotate_density(rho: &mut DensityMatrix, gates: &[GateKind], qubit: usize) -> Result<()> {
    for gate in gates {
        gate.apply_to_density(rho, &[qubit])?;
    }
    Ok(())
}

/// Probability that measuring `qubit` of a pure state in `basis` yields 1
fn probability_in(state: &StateVector, qubit: usize, basis: Basis) -> Result<f64> {
    if basis == Basis::Z {
        return Ok(measurement::probability_one(state, qubit)?);
    }
    let mut rotated = state.clone();
    rotate_state(&mut rotated, basis.to_computational(), qubit)?;
    Ok(measurement::probability_one(&rotated, qubit)?)
}

#[derive(Debug, Clone)]
enum Ensemble {
    Pure(Branches),
    Mixed(Mixture),
}

/// Ensemble reached by replaying a circuit
///
/// # Example
/// ```
/// use qshot_core::{Circuit, GateKind};
/// use qshot_sim::Preview;
///
/// let mut circuit = Circuit::new(1, 0).unwrap();
/// circuit.add_gate(GateKind::RX(std::f64::consts::FRAC_PI_2), &[0]).unwrap();
///
/// let preview = Preview::of(&circuit).unwrap();
/// assert!((preview.probability_one(0).unwrap() - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct Preview {
    num_qubits: usize,
    num_bits: usize,
    budget: usize,
    applied: usize,
    last_read: Vec<Option<usize>>,
    ensemble: Ensemble,
}

impl Preview {
    /// Replay every operation of `circuit`
    ///
    /// # Errors
    /// `ResourceExhausted` if the ensemble outgrows
    /// [`MAX_PREVIEW_AMPLITUDES`] even as density matrices
    pub fn of(circuit: &Circuit) -> Result<Self> {
        Self::with_budget(circuit, MAX_PREVIEW_AMPLITUDES)
    }

    /// Replay `circuit` holding at most `budget` complex amplitudes
    ///
    /// A single pure state is always allowed, whatever the budget.
    pub fn with_budget(circuit: &Circuit, budget: usize) -> Result<Self> {
        let mut last_read = vec![None; circuit.num_bits()];
        for (index, op) in circuit.operations().iter().enumerate() {
            if let Operation::Conditional { cbits, .. } = op {
                for &bit in cbits {
                    last_read[bit] = Some(index);
                }
            }
        }

        let mut preview = Self {
            num_qubits: circuit.num_qubits(),
            num_bits: circuit.num_bits(),
            budget,
            applied: 0,
            last_read,
            ensemble: Ensemble::Pure(Branches::new(
                circuit.num_qubits(),
                circuit.num_bits(),
                budget,
            )?),
        };
        preview.replay(circuit.operations())?;
        Ok(preview)
    }

    /// Bring the preview up to date with `circuit`, which must extend the
    /// circuit it was built from
    ///
    /// New operations are replayed on top of the current ensemble unless one
    /// of them is a conditional: which bits are worth tracking depends on the
    /// conditionals, so the preview is then rebuilt from the start.
    pub fn update(&mut self, circuit: &Circuit) -> Result<()> {
        let operations = circuit.operations();
        let extends = circuit.num_qubits() == self.num_qubits
            && circuit.num_bits() == self.num_bits
            && operations.len() >= self.applied
            && !operations[self.applied..]
                .iter()
                .any(|op| matches!(op, Operation::Conditional { .. }));
        if !extends {
            *self = Self::with_budget(circuit, self.budget)?;
            return Ok(());
        }
        self.replay(operations)
    }

    /// Number of qubits
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Number of operations replayed so far
    pub fn len(&self) -> usize {
        self.applied
    }

    /// Whether no operation has been replayed yet
    pub fn is_empty(&self) -> bool {
        self.applied == 0
    }

    /// Number of pure branches, or of register values once mixed
    pub fn num_branches(&self) -> usize {
        match &self.ensemble {
            Ensemble::Pure(branches) => branches.len(),
            Ensemble::Mixed(mixture) => mixture.len(),
        }
    }

    /// Whether the ensemble is held as density matrices
    pub fn is_mixed(&self) -> bool {
        matches!(self.ensemble, Ensemble::Mixed(_))
    }

    /// Exact probability that a Z measurement of `qubit` yields 1
    pub fn probability_one(&self, qubit: usize) -> Result<f64> {
        self.probability_one_in(qubit, Basis::Z)
    }

    /// Exact probability that a measurement of `qubit` in `basis` yields 1
    pub fn probability_one_in(&self, qubit: usize, basis: Basis) -> Result<f64> {
        if qubit >= self.num_qubits {
            return Err(QuantumError::invalid_qubit(qubit, self.num_qubits));
        }
        let total = match &self.ensemble {
            Ensemble::Pure(branches) => branches.probability_one_in(qubit, basis)?,
            Ensemble::Mixed(mixture) => mixture.probability_one_in(qubit, basis)?,
        };
        Ok(total.clamp(0.0, 1.0))
    }

    fn replay(&mut self, operations: &[Operation]) -> Result<()> {
        for (index, op) in operations.iter().enumerate().skip(self.applied) {
            self.step(index, op)?;
            self.applied = index + 1;
        }
        Ok(())
    }

    /// Whether the bit written at `index` is read by a later conditional
    fn is_live(&self, bit: usize, index: usize) -> bool {
        matches!(self.last_read.get(bit), Some(Some(last)) if *last > index)
    }

    fn step(&mut self, index: usize, op: &Operation) -> Result<()> {
        self.relieve_pressure()?;
        match op {
            Operation::Gate { gate, targets } => match &mut self.ensemble {
                Ensemble::Pure(branches) => branches.apply_gate(gate, targets)?,
                Ensemble::Mixed(mixture) => mixture.apply_gate(gate, targets)?,
            },
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive: true,
            } => {
                let record = self.is_live(*cbit, index).then_some(*cbit);
                match &mut self.ensemble {
                    Ensemble::Pure(branches) => branches.measure(*qubit, *basis, record)?,
                    Ensemble::Mixed(mixture) => mixture.measure(*qubit, *basis, record)?,
                }
            }
            Operation::Measure {
                qubit,
                cbit,
                basis,
                destructive: false,
            } => {
                if self.is_live(*cbit, index) {
                    match &mut self.ensemble {
                        Ensemble::Pure(branches) => branches.peek(*qubit, *cbit, *basis)?,
                        Ensemble::Mixed(mixture) => mixture.peek(*qubit, *cbit, *basis)?,
                    }
                }
            }
            Operation::Reset { qubit } => match &mut self.ensemble {
                Ensemble::Pure(branches) => branches.reset(*qubit)?,
                Ensemble::Mixed(mixture) => mixture.reset(*qubit)?,
            },
            Operation::Barrier { .. } => {}
            Operation::Conditional {
                cbits,
                value,
                gate,
                targets,
            } => {
                match &mut self.ensemble {
                    Ensemble::Pure(branches) => {
                        branches.apply_conditional(cbits, *value, gate, targets)?
                    }
                    Ensemble::Mixed(mixture) => {
                        mixture.apply_conditional(cbits, *value, gate, targets)?
                    }
                }
                let done: Vec<usize> = cbits
                    .iter()
                    .copied()
                    .filter(|&bit| !self.is_live(bit, index))
                    .collect();
                if !done.is_empty() {
                    match &mut self.ensemble {
                        Ensemble::Pure(branches) => branches.forget(&done)?,
                        Ensemble::Mixed(mixture) => mixture.forget(&done)?,
                    }
                }
            }
        }
        Ok(())
    }

    /// Switch to density matrices before an operation could push the pure
    /// branches past the budget, if the register is small enough for them
    fn relieve_pressure(&mut self) -> Result<()> {
        let branches = match &self.ensemble {
            Ensemble::Pure(branches) => branches,
            Ensemble::Mixed(_) => return Ok(()),
        };
        if branches.amplitudes().saturating_mul(WORST_GROWTH) <= self.budget
            || self.num_qubits > MAX_DENSITY_QUBITS
        {
            return Ok(());
        }
        let density_size = 1usize << (2 * self.num_qubits);
        if branches.distinct_registers().saturating_mul(density_size) > self.budget {
            return Ok(());
        }

        debug!(
            branches = branches.len(),
            qubits = self.num_qubits,
            "preview switching to density matrices"
        );
        let mixture = branches.to_mixture(self.budget)?;
        self.ensemble = Ensemble::Mixed(mixture);
        Ok(())
    }
}
