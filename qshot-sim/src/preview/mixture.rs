//! Density matrices keyed by classical register

use super::{rotate_density, PRUNE_WEIGHT};
use qshot_core::{Basis, QuantumError, Result};
use qshot_gates::GateKind;
use qshot_state::{ClassicalRegister, DensityMatrix};
use std::collections::HashMap;

/// Classical-quantum state: for every register value reached, the
/// unnormalized density matrix of the qubits given that value
///
/// Traces sum to one. Used once the pure branches outgrow their limit and
/// the register is small enough for `4^n` elements per part.
#[derive(Debug, Clone)]
pub(super) struct Mixture {
    num_qubits: usize,
    limit: usize,
    parts: Vec<(ClassicalRegister, DensityMatrix)>,
    index: HashMap<ClassicalRegister, usize>,
}

impl Mixture {
    pub(super) fn new(num_qubits: usize, limit: usize) -> Self {
        Self {
            num_qubits,
            limit,
            parts: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub(super) fn len(&self) -> usize {
        self.parts.len()
    }

    /// Mix `rho` into the part for `register`
    pub(super) fn add(&mut self, register: ClassicalRegister, rho: DensityMatrix) -> Result<()> {
        if let Some(&slot) = self.index.get(&register) {
            self.parts[slot].1.accumulate(&rho)?;
            return Ok(());
        }

        let needed = (self.parts.len() + 1).saturating_mul(rho.matrix().len());
        if needed > self.limit {
            return Err(QuantumError::ResourceExhausted {
                needed,
                limit: self.limit,
            });
        }
        self.index.insert(register.clone(), self.parts.len());
        self.parts.push((register, rho));
        Ok(())
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(QuantumError::invalid_qubit(qubit, self.num_qubits));
        }
        Ok(())
    }

    pub(super) fn apply_gate(&mut self, gate: &GateKind, targets: &[usize]) -> Result<()> {
        for (_, rho) in &mut self.parts {
            gate.apply_to_density(rho, targets)?;
        }
        Ok(())
    }

    pub(super) fn apply_conditional(
        &mut self,
        cbits: &[usize],
        value: u64,
        gate: &GateKind,
        targets: &[usize],
    ) -> Result<()> {
        for (register, rho) in &mut self.parts {
            if register.matches(cbits, value)? {
                gate.apply_to_density(rho, targets)?;
            }
        }
        Ok(())
    }

    /// Remove the coherences a measurement of `qubit` in `basis` destroys
    pub(super) fn dephase(&mut self, qubit: usize, basis: Basis) -> Result<()> {
        self.check_qubit(qubit)?;
        for (_, rho) in &mut self.parts {
            rotate_density(rho, basis.to_computational(), qubit)?;
            rho.dephase(qubit)?;
            rotate_density(rho, basis.from_computational(), qubit)?;
        }
        Ok(())
    }

    /// Collapsing measurement; `record` is the bit to write when a later
    /// conditional reads it
    pub(super) fn measure(&mut self, qubit: usize, basis: Basis, record: Option<usize>) -> Result<()> {
        let cbit = match record {
            Some(cbit) => cbit,
            None => return self.dephase(qubit, basis),
        };
        self.check_qubit(qubit)?;

        let mut next = Mixture::new(self.num_qubits, self.limit);
        for (register, mut rho) in self.take_parts() {
            rotate_density(&mut rho, basis.to_computational(), qubit)?;
            for outcome in [false, true] {
                let mut child = rho.clone();
                if child.project(qubit, outcome)? <= PRUNE_WEIGHT {
                    continue;
                }
                rotate_density(&mut child, basis.from_computational(), qubit)?;
                let mut register = register.clone();
                register.set(cbit, outcome)?;
                next.add(register, child)?;
            }
        }
        *self = next;
        Ok(())
    }

    /// Peek into a bit a later conditional reads: registers split, states stay
    pub(super) fn peek(&mut self, qubit: usize, cbit: usize, basis: Basis) -> Result<()> {
        self.check_qubit(qubit)?;
        let mut next = Mixture::new(self.num_qubits, self.limit);
        for (register, rho) in self.take_parts() {
            let p_one = part_probability(&rho, qubit, basis)?;
            for (outcome, p) in [(false, 1.0 - p_one), (true, p_one)] {
                if p <= PRUNE_WEIGHT {
                    continue;
                }
                let mut child = rho.clone();
                child.scale(p);
                let mut register = register.clone();
                register.set(cbit, outcome)?;
                next.add(register, child)?;
            }
        }
        *self = next;
        Ok(())
    }

    pub(super) fn reset(&mut self, qubit: usize) -> Result<()> {
        for (_, rho) in &mut self.parts {
            rho.reset(qubit)?;
        }
        Ok(())
    }

    /// Clear bits no later conditional reads and mix the parts that meet
    pub(super) fn forget(&mut self, bits: &[usize]) -> Result<()> {
        let mut next = Mixture::new(self.num_qubits, self.limit);
        for (mut register, rho) in self.take_parts() {
            for &bit in bits {
                register.set(bit, false)?;
            }
            next.add(register, rho)?;
        }
        *self = next;
        Ok(())
    }

    pub(super) fn probability_one_in(&self, qubit: usize, basis: Basis) -> Result<f64> {
        self.check_qubit(qubit)?;
        let mut total = 0.0;
        for (_, rho) in &self.parts {
            total += rho.trace() * part_probability(rho, qubit, basis)?;
        }
        Ok(total)
    }

    fn take_parts(&mut self) -> Vec<(ClassicalRegister, DensityMatrix)> {
        self.index.clear();
        std::mem::take(&mut self.parts)
    }
}

/// Probability of reading 1 in `basis`, relative to the part's own trace
fn part_probability(rho: &DensityMatrix, qubit: usize, basis: Basis) -> Result<f64> {
    if basis == Basis::Z {
        return Ok(rho.probability_one(qubit)?);
    }
    let mut rotated = rho.clone();
    rotate_density(&mut rotated, basis.to_computational(), qubit)?;
    Ok(rotated.probability_one(qubit)?)
}
