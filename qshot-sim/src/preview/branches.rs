//! Weighted pure-state branches with deferred dephasing

use super::mixture::Mixture;
use super::{probability_in, rotate_state, PRUNE_WEIGHT};
use qshot_core::{Basis, QuantumError, Result};
use qshot_gates::GateKind;
use qshot_state::{measurement, ClassicalRegister, DensityMatrix, StateVector};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

/// Fidelity above `1 - MERGE_TOLERANCE` counts as the same state
const MERGE_TOLERANCE: f64 = 1e-10;

/// Resolution of the probabilities hashed into a state fingerprint
const FINGERPRINT_SCALE: f64 = 1e6;

#[derive(Debug, Clone)]
struct Branch {
    weight: f64,
    state: StateVector,
    register: ClassicalRegister,
}

/// Pure states with probabilities, each paired with the bits it has recorded
///
/// `pending[q]` holds the basis of a measurement of `q` into a bit nothing
/// reads. That dephasing commutes with every operation until one acts on
/// `q` in another basis, so the branches are only split at that point.
#[derive(Debug, Clone)]
pub(super) struct Branches {
    num_qubits: usize,
    limit: usize,
    branches: Vec<Branch>,
    pending: Vec<Option<Basis>>,
}

impl Branches {
    /// One branch in `|0...0⟩`; `limit` caps the amplitudes held, but a
    /// single branch is always allowed
    pub(super) fn new(num_qubits: usize, num_bits: usize, limit: usize) -> Result<Self> {
        Ok(Self {
            num_qubits,
            limit: limit.max(1 << num_qubits),
            branches: vec![Branch {
                weight: 1.0,
                state: StateVector::new(num_qubits)?,
                register: ClassicalRegister::new(num_bits),
            }],
            pending: vec![None; num_qubits],
        })
    }

    pub(super) fn len(&self) -> usize {
        self.branches.len()
    }

    /// Amplitudes held by all branches together
    pub(super) fn amplitudes(&self) -> usize {
        self.branches.len().saturating_mul(1 << self.num_qubits)
    }

    pub(super) fn distinct_registers(&self) -> usize {
        self.branches
            .iter()
            .map(|branch| &branch.register)
            .collect::<HashSet<_>>()
            .len()
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(QuantumError::invalid_qubit(qubit, self.num_qubits));
        }
        Ok(())
    }

    fn pending_on(&self, qubit: usize) -> Option<Basis> {
        self.pending.get(qubit).copied().flatten()
    }

    pub(super) fn apply_gate(&mut self, gate: &GateKind, targets: &[usize]) -> Result<()> {
        self.resolve_under(gate, targets)?;
        for branch in &mut self.branches {
            gate.apply(&mut branch.state, targets)?;
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
        self.resolve_under(gate, targets)?;
        for branch in &mut self.branches {
            if branch.register.matches(cbits, value)? {
                gate.apply(&mut branch.state, targets)?;
            }
        }
        Ok(())
    }

    /// Collapsing measurement; `record` is the bit to write when a later
    /// conditional reads it
    pub(super) fn measure(&mut self, qubit: usize, basis: Basis, record: Option<usize>) -> Result<()> {
        self.check_qubit(qubit)?;
        if self.pending[qubit] == Some(basis) {
            if record.is_none() {
                return Ok(());
            }
            self.pending[qubit] = None;
        } else {
            self.resolve(qubit)?;
        }

        match record {
            None => {
                self.pending[qubit] = Some(basis);
                Ok(())
            }
            Some(cbit) => self.split(qubit, basis, |branch, outcome| {
                branch.register.set(cbit, outcome)?;
                Ok(())
            }),
        }
    }

    /// Peek into a bit a later conditional reads: registers split, states stay
    pub(super) fn peek(&mut self, qubit: usize, cbit: usize, basis: Basis) -> Result<()> {
        self.check_qubit(qubit)?;
        let mut merger = Merger::new(self.limit, self.num_qubits);
        for branch in std::mem::take(&mut self.branches) {
            let p_one = self.branch_probability(&branch, qubit, basis)?;
            for (outcome, p) in [(false, 1.0 - p_one), (true, p_one)] {
                if p <= PRUNE_WEIGHT {
                    continue;
                }
                let mut child = branch.clone();
                child.weight *= p;
                child.register.set(cbit, outcome)?;
                merger.push(child)?;
            }
        }
        self.branches = merger.finish();
        Ok(())
    }

    /// Reset discards whatever basis `qubit` was measured in
    pub(super) fn reset(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        self.pending[qubit] = None;
        self.split(qubit, Basis::Z, |branch, outcome| {
            if outcome {
                GateKind::X.apply(&mut branch.state, &[qubit])?;
            }
            Ok(())
        })
    }

    /// Clear bits no later conditional reads and merge the branches that
    /// become equal
    pub(super) fn forget(&mut self, bits: &[usize]) -> Result<()> {
        let mut merger = Merger::new(self.limit, self.num_qubits);
        for mut branch in std::mem::take(&mut self.branches) {
            for &bit in bits {
                branch.register.set(bit, false)?;
            }
            merger.push(branch)?;
        }
        self.branches = merger.finish();
        Ok(())
    }

    pub(super) fn probability_one_in(&self, qubit: usize, basis: Basis) -> Result<f64> {
        self.check_qubit(qubit)?;
        let mut total = 0.0;
        for branch in &self.branches {
            total += branch.weight * self.branch_probability(branch, qubit, basis)?;
        }
        Ok(total)
    }

    /// Same ensemble as density matrices, one per distinct register
    pub(super) fn to_mixture(&self, limit: usize) -> Result<Mixture> {
        let mut mixture = Mixture::new(self.num_qubits, limit);
        for branch in &self.branches {
            let rho = DensityMatrix::from_state_vector(&branch.state, branch.weight)?;
            mixture.add(branch.register.clone(), rho)?;
        }
        for (qubit, basis) in self.pending.iter().enumerate() {
            if let Some(basis) = basis {
                mixture.dephase(qubit, *basis)?;
            }
        }
        Ok(mixture)
    }

    /// Split the qubits a gate touches unless their deferred dephasing
    /// commutes with it
    fn resolve_under(&mut self, gate: &GateKind, targets: &[usize]) -> Result<()> {
        for &qubit in targets {
            let commutes = gate.is_diagonal() && self.pending_on(qubit) == Some(Basis::Z);
            if !commutes {
                self.resolve(qubit)?;
            }
        }
        Ok(())
    }

    fn resolve(&mut self, qubit: usize) -> Result<()> {
        match self.pending.get_mut(qubit).and_then(Option::take) {
            Some(basis) => self.split(qubit, basis, |_, _| Ok(())),
            None => Ok(()),
        }
    }

    /// Probability of reading 1 in `basis`, with the branch's deferred
    /// dephasing of `qubit` taken into account
    fn branch_probability(&self, branch: &Branch, qubit: usize, basis: Basis) -> Result<f64> {
        let pending = match self.pending_on(qubit) {
            Some(pending) if pending != basis => pending,
            _ => return probability_in(&branch.state, qubit, basis),
        };

        let mut rotated = branch.state.clone();
        rotate_state(&mut rotated, pending.to_computational(), qubit)?;
        let p_one = measurement::probability_one(&rotated, qubit)?;
        let mut total = 0.0;
        for (outcome, p) in [(false, 1.0 - p_one), (true, p_one)] {
            if p <= PRUNE_WEIGHT {
                continue;
            }
            let mut collapsed = rotated.clone();
            measurement::collapse(&mut collapsed, qubit, outcome)?;
            rotate_state(&mut collapsed, pending.from_computational(), qubit)?;
            total += p * probability_in(&collapsed, qubit, basis)?;
        }
        Ok(total)
    }

    /// Split every branch on the outcome of a collapsing measurement
    fn split<F>(&mut self, qubit: usize, basis: Basis, mut on_outcome: F) -> Result<()>
    where
        F: FnMut(&mut Branch, bool) -> Result<()>,
    {
        let mut merger = Merger::new(self.limit, self.num_qubits);
        for mut branch in std::mem::take(&mut self.branches) {
            rotate_state(&mut branch.state, basis.to_computational(), qubit)?;
            let p_one = measurement::probability_one(&branch.state, qubit)?;

            let live: Vec<(bool, f64)> = [(false, 1.0 - p_one), (true, p_one)]
                .into_iter()
                .filter(|(_, p)| *p > PRUNE_WEIGHT)
                .collect();

            let children = match live.as_slice() {
                [(outcome, p)] => vec![(branch, *outcome, *p)],
                [(first, p_first), (second, p_second)] => vec![
                    (branch.clone(), *first, *p_first),
                    (branch, *second, *p_second),
                ],
                _ => Vec::new(),
            };

            for (mut child, outcome, p) in children {
                measurement::collapse(&mut child.state, qubit, outcome)?;
                rotate_state(&mut child.state, basis.from_computational(), qubit)?;
                child.weight *= p;
                on_outcome(&mut child, outcome)?;
                merger.push(child)?;
            }
        }
        self.branches = merger.finish();
        Ok(())
    }
}

/// Collects branches, folding each into an equal one it already holds
struct Merger {
    limit: usize,
    dimension: usize,
    branches: Vec<Branch>,
    index: HashMap<(ClassicalRegister, u64), Vec<usize>>,
}

impl Merger {
    fn new(limit: usize, num_qubits: usize) -> Self {
        Self {
            limit,
            dimension: 1 << num_qubits,
            branches: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn push(&mut self, branch: Branch) -> Result<()> {
        let key = (branch.register.clone(), fingerprint(&branch.state));
        let slots = self.index.entry(key).or_default();
        for &slot in slots.iter() {
            let held = &mut self.branches[slot];
            // equal up to a global phase
            if held.state.fidelity(&branch.state)? > 1.0 - MERGE_TOLERANCE {
                held.weight += branch.weight;
                return Ok(());
            }
        }

        let needed = (self.branches.len() + 1).saturating_mul(self.dimension);
        if needed > self.limit {
            return Err(QuantumError::ResourceExhausted {
                needed,
                limit: self.limit,
            });
        }
        slots.push(self.branches.len());
        self.branches.push(branch);
        Ok(())
    }

    fn finish(self) -> Vec<Branch> {
        self.branches
    }
}

fn fingerprint(state: &StateVector) -> u64 {
    let mut hasher = DefaultHasher::new();
    for amplitude in state.amplitudes() {
        ((amplitude.norm_sqr() * FINGERPRINT_SCALE).round() as u64).hash(&mut hasher);
    }
    hasher.finish()
}
