//! Property-based tests for the amplitude store and measurement engine

use num_complex::Complex64;
use proptest::prelude::*;
use qshot_state::{measurement, StateVector};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rotation_y(theta: f64) -> [[Complex64; 2]; 2] {
    let (s, c) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(c, 0.0), Complex64::new(-s, 0.0)],
        [Complex64::new(s, 0.0), Complex64::new(c, 0.0)],
    ]
}

fn rotation_z(theta: f64) -> [[Complex64; 2]; 2] {
    let half = theta / 2.0;
    [
        [Complex64::from_polar(1.0, -half), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, half)],
    ]
}

/// Random 3-qubit unitary built as RY·RZ on the first target, a CNOT, and a phase
fn scrambler(a: f64, b: f64) -> Vec<Complex64> {
    let mut out = vec![Complex64::new(0.0, 0.0); 64];
    for col in 0..8 {
        let mut state = StateVector::from_amplitudes({
            let mut v = vec![Complex64::new(0.0, 0.0); 8];
            v[col] = Complex64::new(1.0, 0.0);
            v
        })
        .unwrap();
        state.apply_single_qubit_gate(&rotation_y(a), 2).unwrap();
        state.apply_single_qubit_gate(&rotation_z(b), 0).unwrap();
        let o = Complex64::new(1.0, 0.0);
        let z = Complex64::new(0.0, 0.0);
        let cnot = [[o, z, z, z], [z, o, z, z], [z, z, z, o], [z, z, o, z]];
        state.apply_two_qubit_gate(&cnot, 2, 1).unwrap();
        for row in 0..8 {
            out[row * 8 + col] = state.amplitudes()[row];
        }
    }
    out
}

proptest! {
    #[test]
    fn gates_preserve_normalization(
        angles in prop::collection::vec(-10.0f64..10.0, 1..12),
        qubits in prop::collection::vec(0usize..4, 1..12),
    ) {
        let mut state = StateVector::new(4).unwrap();
        for (angle, qubit) in angles.iter().zip(qubits.iter()) {
            state.apply_single_qubit_gate(&rotation_y(*angle), *qubit).unwrap();
            state.apply_single_qubit_gate(&rotation_z(angle * 0.5), (*qubit + 1) % 4).unwrap();
        }
        prop_assert!(state.is_normalized(1e-9), "norm^2 = {}", state.norm_sqr());
    }

    #[test]
    fn general_kernel_preserves_normalization_for_any_target_order(
        a in -3.2f64..3.2,
        b in -3.2f64..3.2,
        perm in 0usize..6,
    ) {
        let orders = [[0, 1, 3], [0, 3, 1], [1, 0, 3], [1, 3, 0], [3, 0, 1], [3, 1, 0]];
        let mut state = StateVector::new(4).unwrap();
        state.apply_single_qubit_gate(&rotation_y(1.1), 0).unwrap();
        state.apply_single_qubit_gate(&rotation_y(0.4), 3).unwrap();
        state.apply_unitary(&scrambler(a, b), &orders[perm]).unwrap();
        prop_assert!(state.is_normalized(1e-9));
    }

    #[test]
    fn probabilities_stay_in_unit_interval(theta in -20.0f64..20.0, seed in any::<u64>()) {
        let mut state = StateVector::new(2).unwrap();
        state.apply_single_qubit_gate(&rotation_y(theta), 1).unwrap();
        let p = measurement::probability_one(&state, 1).unwrap();
        prop_assert!((0.0..=1.0).contains(&p));

        let mut rng = StdRng::seed_from_u64(seed);
        measurement::measure(&mut state, 1, &mut rng).unwrap();
        prop_assert!(state.is_normalized(1e-9));
        let after = measurement::probability_one(&state, 1).unwrap();
        prop_assert!(after < 1e-9 || (after - 1.0).abs() < 1e-9);
    }
}

#[test]
fn general_kernel_agrees_with_composed_small_kernels() {
    // Applying the scrambler on targets [2, 1, 0] must equal applying its
    // factors directly on those wires.
    let mut direct = StateVector::new(3).unwrap();
    direct.apply_single_qubit_gate(&rotation_y(0.3), 0).unwrap();
    let mut via_matrix = direct.clone();

    direct.apply_single_qubit_gate(&rotation_y(0.9), 2).unwrap();
    direct.apply_single_qubit_gate(&rotation_z(-1.7), 0).unwrap();
    let o = Complex64::new(1.0, 0.0);
    let z = Complex64::new(0.0, 0.0);
    let cnot = [[o, z, z, z], [z, o, z, z], [z, z, z, o], [z, z, o, z]];
    direct.apply_two_qubit_gate(&cnot, 2, 1).unwrap();

    via_matrix.apply_unitary(&scrambler(0.9, -1.7), &[2, 1, 0]).unwrap();

    for (d, m) in direct.amplitudes().iter().zip(via_matrix.amplitudes()) {
        assert!((d - m).norm() < 1e-12, "{} != {}", d, m);
    }
}
