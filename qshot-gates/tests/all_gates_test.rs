//! Algebraic checks across every gate kind

use approx::assert_abs_diff_eq;
use num_complex::Complex64;
use proptest::prelude::*;
use qshot_gates::{GateKind, GateMatrix};
use qshot_state::StateVector;
use std::f64::consts::PI;

const EPSILON: f64 = 1e-10;

fn every_kind() -> Vec<GateKind> {
    vec![
        GateKind::I,
        GateKind::X,
        GateKind::Y,
        GateKind::Z,
        GateKind::H,
        GateKind::S,
        GateKind::Sdg,
        GateKind::T,
        GateKind::Tdg,
        GateKind::V,
        GateKind::Vdg,
        GateKind::RX(0.37),
        GateKind::RY(-1.2),
        GateKind::RZ(2.9),
        GateKind::U1(0.8),
        GateKind::U2(0.4, -0.9),
        GateKind::U3(1.1, 0.2, -2.5),
        GateKind::CX,
        GateKind::CY,
        GateKind::CZ,
        GateKind::CH,
        GateKind::Swap,
        GateKind::CCX,
    ]
}

fn assert_states_close(a: &StateVector, b: &StateVector) {
    for (x, y) in a.amplitudes().iter().zip(b.amplitudes().iter()) {
        assert_abs_diff_eq!(x.re, y.re, epsilon = 1e-9);
        assert_abs_diff_eq!(x.im, y.im, epsilon = 1e-9);
    }
}

#[test]
fn test_every_gate_is_unitary() {
    for kind in every_kind() {
        let m = kind.matrix();
        assert_eq!(m.dimension(), 1 << kind.num_qubits(), "{}", kind);
        assert!(m.is_unitary(EPSILON), "{} is not unitary", kind);
    }
}

#[test]
fn test_adjoint_inverts_every_gate() {
    for kind in every_kind() {
        let product = kind.adjoint().matrix().multiply(&kind.matrix()).unwrap();
        assert!(
            product.approx_eq(&GateMatrix::identity(product.dimension()), EPSILON),
            "{}† · {} is not identity",
            kind,
            kind
        );
        assert!(kind.adjoint().matrix().approx_eq(&kind.matrix().adjoint(), EPSILON));
    }
}

#[test]
fn test_hermitian_flags_match_matrices() {
    for kind in every_kind() {
        if kind.is_hermitian() {
            assert!(kind.matrix().is_hermitian(EPSILON), "{}", kind);
            assert_eq!(kind.adjoint(), kind);
        }
    }
}

#[test]
fn test_diagonal_flags_match_matrices() {
    for kind in every_kind() {
        assert_eq!(
            kind.is_diagonal(),
            kind.matrix().is_diagonal(EPSILON),
            "{}",
            kind
        );
    }
}

#[test]
fn test_v_squared_is_x() {
    let v = GateKind::V.matrix();
    let vv = v.multiply(&v).unwrap();
    assert!(vv.approx_eq(&GateKind::X.matrix(), EPSILON));
}

#[test]
fn test_rotations_at_pi_match_paulis_up_to_phase() {
    assert!(GateKind::RX(PI)
        .matrix()
        .approx_eq_up_to_phase(&GateKind::X.matrix(), EPSILON));
    assert!(GateKind::RY(PI)
        .matrix()
        .approx_eq_up_to_phase(&GateKind::Y.matrix(), EPSILON));
    assert!(GateKind::RZ(PI)
        .matrix()
        .approx_eq_up_to_phase(&GateKind::Z.matrix(), EPSILON));
}

#[test]
fn test_u1_equals_rz_up_to_phase() {
    assert!(GateKind::U1(0.61)
        .matrix()
        .approx_eq_up_to_phase(&GateKind::RZ(0.61).matrix(), EPSILON));
}

#[test]
fn test_ch_is_controlled_hadamard() {
    // |10> (control set) -> |1>(|0> + |1>)/√2 on [control=1, target=0]
    let mut state = StateVector::new(2).unwrap();
    GateKind::X.apply(&mut state, &[1]).unwrap();
    GateKind::CH.apply(&mut state, &[1, 0]).unwrap();
    let h = std::f64::consts::FRAC_1_SQRT_2;
    assert_abs_diff_eq!(state.amplitudes()[0b10].re, h, epsilon = EPSILON);
    assert_abs_diff_eq!(state.amplitudes()[0b11].re, h, epsilon = EPSILON);
}

#[test]
fn test_swap_exchanges_qubits() {
    let mut state = StateVector::new(3).unwrap();
    GateKind::X.apply(&mut state, &[0]).unwrap();
    GateKind::Swap.apply(&mut state, &[0, 2]).unwrap();
    assert_abs_diff_eq!(state.amplitudes()[0b100].re, 1.0, epsilon = EPSILON);
}

#[test]
fn test_kind_application_matches_full_matrix() {
    // Applying a kind equals applying its full matrix through the general kernel
    let prep = [
        (GateKind::H, vec![0]),
        (GateKind::RY(0.7), vec![1]),
        (GateKind::U3(0.3, 1.0, -0.4), vec![2]),
    ];
    let cases = [
        (GateKind::CY, vec![2, 0]),
        (GateKind::CH, vec![0, 2]),
        (GateKind::CZ, vec![1, 2]),
        (GateKind::CCX, vec![2, 0, 1]),
        (GateKind::T, vec![1]),
    ];
    for (kind, targets) in cases {
        let mut fast = StateVector::new(3).unwrap();
        for (p, t) in &prep {
            p.apply(&mut fast, t).unwrap();
        }
        let mut general = fast.clone();
        kind.apply(&mut fast, &targets).unwrap();
        general
            .apply_unitary(kind.matrix().as_slice(), &targets)
            .unwrap();
        assert_states_close(&fast, &general);
    }
}

proptest! {
    #[test]
    fn prop_rotation_homomorphism(alpha in -10.0f64..10.0, beta in -10.0f64..10.0, axis in 0usize..3) {
        let rot = |angle: f64| match axis {
            0 => GateKind::RX(angle),
            1 => GateKind::RY(angle),
            _ => GateKind::RZ(angle),
        };

        let mut stepwise = StateVector::new(2).unwrap();
        GateKind::H.apply(&mut stepwise, &[1]).unwrap();
        let mut combined = stepwise.clone();

        rot(alpha).apply(&mut stepwise, &[1]).unwrap();
        rot(beta).apply(&mut stepwise, &[1]).unwrap();
        rot(alpha + beta).apply(&mut combined, &[1]).unwrap();

        for (x, y) in stepwise.amplitudes().iter().zip(combined.amplitudes().iter()) {
            prop_assert!((x - y).norm() < 1e-9);
        }
    }

    #[test]
    fn prop_u3_is_unitary(theta in -7.0f64..7.0, phi in -7.0f64..7.0, lambda in -7.0f64..7.0) {
        prop_assert!(GateKind::U3(theta, phi, lambda).matrix().is_unitary(1e-9));
    }

    #[test]
    fn prop_gates_preserve_norm(kinds in proptest::collection::vec(0usize..23, 1..30), seed in 0usize..1000) {
        let all = every_kind();
        let mut state = StateVector::new(4).unwrap();
        for (step, &k) in kinds.iter().enumerate() {
            let kind = all[k];
            let n = kind.num_qubits();
            let targets: Vec<usize> = (0..n).map(|i| (seed + step + i) % 4).collect();
            kind.apply(&mut state, &targets).unwrap();
        }
        prop_assert!((state.norm_sqr() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_phase_kickback_under_cz() {
    // CZ on |+>|1> yields |->|1>
    let mut state = StateVector::new(2).unwrap();
    GateKind::H.apply(&mut state, &[0]).unwrap();
    GateKind::X.apply(&mut state, &[1]).unwrap();
    GateKind::CZ.apply(&mut state, &[1, 0]).unwrap();
    GateKind::H.apply(&mut state, &[0]).unwrap();
    let amp: Complex64 = state.amplitudes()[0b11];
    assert_abs_diff_eq!(amp.re, 1.0, epsilon = EPSILON);
    assert_abs_diff_eq!(amp.im, 0.0, epsilon = EPSILON);
}
