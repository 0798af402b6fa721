//! Replaying logged operations against one state

use qshot_core::{Basis, Circuit, Operation, QuantumError};
use qshot_gates::GateKind;
use qshot_state::{measurement, ClassicalRegister, QubitMeasurement, StateVector};
use rand::Rng;

/// What a replayed operation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// A gate acted on the state
    Gate,
    /// A classical bit was written
    Measurement,
    /// The qubit was forced to |0⟩
    Reset,
    /// Nothing happened (barrier, or a condition that did not hold)
    Skipped,
}

fn rotate(state: &mut StateVector, gates: &[GateKind], qubit: usize) -> Result<(), QuantumError> {
    for gate in gates {
        gate.apply(state, &[qubit])?;
    }
    Ok(())
}

/// Measure `qubit` in `basis`, optionally collapsing, and return the outcome
pub fn measure_in_basis<R: Rng + ?Sized>(
    state: &mut StateVector,
    register: &mut ClassicalRegister,
    qubit: usize,
    cbit: usize,
    basis: Basis,
    destructive: bool,
    rng: &mut R,
) -> Result<bool, QuantumError> {
    // range checks first so a failure leaves the state unrotated
    state.check_qubit(qubit)?;
    register.get(cbit)?;

    rotate(state, basis.to_computational(), qubit)?;
    let result = QubitMeasurement::new(qubit, cbit)
        .with_collapse(destructive)
        .perform(state, register, rng)?;
    rotate(state, basis.from_computational(), qubit)?;
    Ok(result.outcome)
}

/// Apply one operation of a shot
///
/// Gates act on the state, measurements sample with `rng` and write the
/// register, resets measure and flip back to |0⟩ without touching the
/// register, conditionals read the register.
pub fn apply_operation<R: Rng + ?Sized>(
    operation: &Operation,
    state: &mut StateVector,
    register: &mut ClassicalRegister,
    rng: &mut R,
) -> Result<Effect, QuantumError> {
    match operation {
        Operation::Gate { gate, targets } => {
            gate.apply(state, targets)?;
            Ok(Effect::Gate)
        }
        Operation::Measure {
            qubit,
            cbit,
            basis,
            destructive,
        } => {
            measure_in_basis(state, register, *qubit, *cbit, *basis, *destructive, rng)?;
            Ok(Effect::Measurement)
        }
        Operation::Reset { qubit } => {
            if measurement::measure(state, *qubit, rng)?.outcome {
                GateKind::X.apply(state, &[*qubit])?;
            }
            Ok(Effect::Reset)
        }
        Operation::Barrier { .. } => Ok(Effect::Skipped),
        Operation::Conditional {
            cbits,
            value,
            gate,
            targets,
        } => {
            if register.matches(cbits, *value)? {
                gate.apply(state, targets)?;
                Ok(Effect::Gate)
            } else {
                Ok(Effect::Skipped)
            }
        }
    }
}

/// Per-shot tallies
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShotTally {
    /// Gates that acted on the state
    pub gates: usize,
    /// Classical bits written
    pub measurements: usize,
}

/// Run every operation of `circuit` in order
///
/// `state` and `register` are used as given; callers reset them between
/// shots.
///
/// # Example
/// ```
/// use qshot_core::{Circuit, GateKind};
/// use qshot_sim::replay;
/// use qshot_state::{ClassicalRegister, StateVector};
/// use rand::SeedableRng;
///
/// let mut circuit = Circuit::new(1, 1).unwrap();
/// circuit.add_gate(GateKind::X, &[0]).unwrap();
/// circuit.measure(0, 0).unwrap();
///
/// let mut state = StateVector::new(1).unwrap();
/// let mut register = ClassicalRegister::new(1);
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// replay::run_shot(&circuit, &mut state, &mut register, &mut rng).unwrap();
/// assert_eq!(register.to_bitstring(), "1");
/// ```
pub fn run_shot<R: Rng + ?Sized>(
    circuit: &Circuit,
    state: &mut StateVector,
    register: &mut ClassicalRegister,
    rng: &mut R,
) -> Result<ShotTally, QuantumError> {
    let mut tally = ShotTally::default();
    for operation in circuit.operations() {
        match apply_operation(operation, state, register, rng)? {
            Effect::Gate => tally.gates += 1,
            Effect::Measurement => tally.measurements += 1,
            Effect::Reset | Effect::Skipped => {}
        }
    }
    Ok(tally)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(circuit: &Circuit, seed: u64) -> (StateVector, ClassicalRegister) {
        let mut state = StateVector::new(circuit.num_qubits()).unwrap();
        let mut register = ClassicalRegister::new(circuit.num_bits());
        let mut rng = StdRng::seed_from_u64(seed);
        run_shot(circuit, &mut state, &mut register, &mut rng).unwrap();
        (state, register)
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        circuit.reset(0).unwrap();
        circuit.measure(0, 0).unwrap();
        for seed in 0..32 {
            let (state, register) = run(&circuit, seed);
            assert_eq!(register.to_bitstring(), "0");
            assert!((state.amplitudes()[0].norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_reset_leaves_register_alone() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::X, &[0]).unwrap();
        circuit.measure(0, 0).unwrap();
        circuit.reset(0).unwrap();
        let (state, register) = run(&circuit, 3);
        assert_eq!(register.to_bitstring(), "1");
        assert!((state.amplitudes()[0].norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_conditional_only_when_condition_holds() {
        let mut circuit = Circuit::new(2, 2).unwrap();
        circuit.add_gate(GateKind::X, &[0]).unwrap();
        circuit.measure(0, 0).unwrap();
        // b = "10" encodes value 1 on bits [0, 1]
        circuit.add_conditional(&[0, 1], 1, GateKind::X, &[1]).unwrap();
        circuit.add_conditional(&[0], 0, GateKind::H, &[1]).unwrap();
        circuit.measure(1, 1).unwrap();
        for seed in 0..8 {
            let (_, register) = run(&circuit, seed);
            assert_eq!(register.to_bitstring(), "11");
        }
    }

    #[test]
    fn test_conditional_over_full_width_register() {
        let mut circuit = Circuit::new(1, 64).unwrap();
        circuit.add_gate(GateKind::X, &[0]).unwrap();
        for bit in 0..64 {
            circuit.measure(0, bit).unwrap();
        }
        let all: Vec<usize> = (0..64).collect();
        circuit
            .add_conditional(&all, u64::MAX, GateKind::X, &[0])
            .unwrap();
        let (state, register) = run(&circuit, 5);
        assert_eq!(register.to_bitstring(), "1".repeat(64));
        assert!((state.amplitudes()[0].norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_x_basis_measurement_of_plus_is_zero() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        circuit.measure_in(0, 0, Basis::X).unwrap();
        for seed in 0..16 {
            let (state, register) = run(&circuit, seed);
            assert_eq!(register.to_bitstring(), "0");
            // left in |+>
            assert!((state.probabilities()[0] - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_y_basis_measurement_of_plus_i_is_zero() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        circuit.add_gate(GateKind::S, &[0]).unwrap();
        circuit.measure_in(0, 0, Basis::Y).unwrap();
        for seed in 0..16 {
            let (_, register) = run(&circuit, seed);
            assert_eq!(register.to_bitstring(), "0");
        }
    }

    #[test]
    fn test_peek_does_not_collapse() {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        circuit.peek(0, 0).unwrap();
        let (state, _) = run(&circuit, 11);
        assert!((state.probabilities()[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_tally() {
        let mut circuit = Circuit::new(2, 1).unwrap();
        circuit.add_gate(GateKind::H, &[0]).unwrap();
        circuit.barrier(&[]).unwrap();
        circuit.measure(1, 0).unwrap();
        circuit.add_conditional(&[0], 1, GateKind::X, &[0]).unwrap();
        let mut state = StateVector::new(2).unwrap();
        let mut register = ClassicalRegister::new(1);
        let mut rng = StdRng::seed_from_u64(0);
        let tally = run_shot(&circuit, &mut state, &mut register, &mut rng).unwrap();
        assert_eq!(tally, ShotTally { gates: 1, measurements: 1 });
    }
}
