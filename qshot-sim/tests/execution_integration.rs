//! End-to-end executor behavior on small circuits

use approx::assert_abs_diff_eq;
use proptest::prelude::*;
use qshot_core::{Basis, Circuit, GateKind};
use qshot_sim::{CancelToken, ErrorKind, ExecutionError, Executor, ExecutorConfig, Preview};
use std::sync::Once;

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn teleportation(theta: f64) -> Circuit {
    let mut circuit = Circuit::new(3, 3).unwrap();
    circuit.add_gate(GateKind::RY(theta), &[0]).unwrap();
    circuit.add_gate(GateKind::H, &[1]).unwrap();
    circuit.add_gate(GateKind::CX, &[1, 2]).unwrap();
    circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
    circuit.add_gate(GateKind::H, &[0]).unwrap();
    circuit.measure(0, 0).unwrap();
    circuit.measure(1, 1).unwrap();
    circuit.add_conditional(&[1], 1, GateKind::X, &[2]).unwrap();
    circuit.add_conditional(&[0], 1, GateKind::Z, &[2]).unwrap();
    circuit.measure(2, 2).unwrap();
    circuit
}

#[test]
fn test_counts_sum_to_shots() {
    init_tracing();
    let circuit = teleportation(0.9);
    for shots in [1, 63, 64, 65, 1000] {
        let result = Executor::new(ExecutorConfig::deterministic(3))
            .execute(&circuit, shots)
            .unwrap();
        assert_eq!(result.histogram.total(), shots);
        let sum: usize = result.histogram.iter().map(|(_, count)| count).sum();
        assert_eq!(sum, shots);
    }
}

#[test]
fn test_teleportation_matches_preview() {
    init_tracing();
    let theta = 1.3;
    let circuit = teleportation(theta);
    let result = Executor::new(ExecutorConfig::deterministic(11))
        .execute(&circuit, 20_000)
        .unwrap();
    let expected = (theta / 2.0).sin().powi(2);
    assert!((result.histogram.marginal_one(2) - expected).abs() < 0.02);

    let preview = Preview::of(&circuit).unwrap();
    assert_abs_diff_eq!(preview.probability_one(2).unwrap(), expected, epsilon = 1e-9);
}

#[test]
fn test_same_seed_any_thread_count() {
    init_tracing();
    let circuit = teleportation(0.4);
    let reference = Executor::new(ExecutorConfig::deterministic(2024).with_parallel(false))
        .execute(&circuit, 3000)
        .unwrap()
        .histogram;
    for threads in [1, 2, 4, 7] {
        let hist = Executor::new(ExecutorConfig::deterministic(2024).with_num_threads(threads))
            .execute(&circuit, 3000)
            .unwrap()
            .histogram;
        assert_eq!(hist, reference, "{} threads", threads);
    }
}

#[test]
fn test_different_seeds_differ() {
    let circuit = teleportation(1.0);
    let a = Executor::new(ExecutorConfig::deterministic(1))
        .execute(&circuit, 2000)
        .unwrap();
    let b = Executor::new(ExecutorConfig::deterministic(2))
        .execute(&circuit, 2000)
        .unwrap();
    assert_ne!(a.histogram, b.histogram);
}

#[test]
fn test_reset_then_measure_is_zero() {
    let mut circuit = Circuit::new(2, 2).unwrap();
    circuit.add_gate(GateKind::H, &[0]).unwrap();
    circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
    circuit.reset(0).unwrap();
    circuit.measure(0, 0).unwrap();
    circuit.measure(1, 1).unwrap();
    let hist = Executor::new(ExecutorConfig::deterministic(8))
        .execute(&circuit, 500)
        .unwrap()
        .histogram;
    assert_eq!(hist.get("00") + hist.get("01"), 500);
    assert!(hist.get("01") > 0);
}

#[test]
fn test_basis_measurements() {
    let mut circuit = Circuit::new(2, 2).unwrap();
    circuit.add_gate(GateKind::H, &[0]).unwrap();
    circuit.measure_in(0, 0, Basis::X).unwrap();
    circuit.add_gate(GateKind::H, &[1]).unwrap();
    circuit.add_gate(GateKind::S, &[1]).unwrap();
    circuit.measure_in(1, 1, Basis::Y).unwrap();
    let hist = Executor::new(ExecutorConfig::deterministic(4))
        .execute(&circuit, 200)
        .unwrap()
        .histogram;
    assert_eq!(hist.get("00"), 200);
}

#[test]
fn test_unmeasured_bits_stay_zero() {
    let mut circuit = Circuit::new(2, 5).unwrap();
    circuit.add_gate(GateKind::RX(1.23), &[0]).unwrap();
    circuit.peek(0, 0).unwrap();
    circuit.peek(0, 1).unwrap();
    let hist = Executor::new(ExecutorConfig::deterministic(9))
        .execute(&circuit, 1024)
        .unwrap()
        .histogram;
    assert_eq!(hist.total(), 1024);
    for (outcome, _) in &hist {
        assert_eq!(&outcome[2..], "000");
    }
}

#[test]
fn test_cancel_from_another_thread() {
    init_tracing();
    let mut circuit = Circuit::new(10, 10).unwrap();
    for _ in 0..50 {
        for q in 0..10 {
            circuit.add_gate(GateKind::H, &[q]).unwrap();
        }
    }
    for q in 0..10 {
        circuit.measure(q, q).unwrap();
    }
    let cancel = CancelToken::new();
    let trigger = cancel.clone();
    let handle = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(20));
        trigger.cancel();
    });

    let executor = Executor::new(ExecutorConfig::deterministic(0).with_max_shots(usize::MAX));
    let result = executor.execute_with_cancel(&circuit, 50_000_000, &cancel);
    handle.join().unwrap();

    match result {
        Err(ExecutionError::Cancelled { completed }) => assert!(completed < 50_000_000),
        other => panic!("expected cancellation, got {:?}", other.map(|r| r.histogram.total())),
    }
}

#[derive(Debug, Clone)]
enum Step {
    Rotate(usize, f64),
    Entangle(usize),
    Measure(usize, Basis),
    Peek(usize),
    Reset(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..2, -3.2f64..3.2).prop_map(|(q, theta)| Step::Rotate(q, theta)),
        (0usize..2).prop_map(Step::Entangle),
        (0usize..2, prop_oneof![Just(Basis::Z), Just(Basis::X), Just(Basis::Y)])
            .prop_map(|(q, basis)| Step::Measure(q, basis)),
        (0usize..2).prop_map(Step::Peek),
        (0usize..2).prop_map(Step::Reset),
    ]
}

fn build(steps: &[Step]) -> Circuit {
    let mut circuit = Circuit::new(2, 2).unwrap();
    for step in steps {
        let appended = match *step {
            Step::Rotate(q, theta) => circuit.add_gate(GateKind::U3(theta, 0.4, -theta), &[q]),
            Step::Entangle(control) => circuit.add_gate(GateKind::CX, &[control, 1 - control]),
            Step::Measure(q, basis) => circuit.measure_in(q, q, basis),
            Step::Peek(q) => circuit.peek(q, 1 - q),
            Step::Reset(q) => circuit.reset(q),
        };
        appended.unwrap();
    }
    circuit
}

#[test]
fn test_preview_resource_error_kind() {
    let mut circuit = Circuit::new(3, 1).unwrap();
    for round in 0..4 {
        circuit.add_gate(GateKind::RY(0.3 + round as f64), &[0]).unwrap();
        circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
        circuit.measure(1, 0).unwrap();
        circuit.add_gate(GateKind::RY(0.7), &[1]).unwrap();
        circuit.add_gate(GateKind::CX, &[1, 2]).unwrap();
    }
    let err: ExecutionError = Preview::with_budget(&circuit, 24).unwrap_err().into();
    assert_eq!(err.kind(), ErrorKind::Resource);
}

#[test]
fn test_error_kinds() {
    let circuit = teleportation(0.1);
    let err = Executor::new(ExecutorConfig::new().with_num_threads(0))
        .execute(&circuit, 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert!(!err.is_cancelled());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_chunking_does_not_change_totals(
        shots in 0usize..400,
        chunk in 1usize..80,
        seed in any::<u64>(),
    ) {
        let circuit = teleportation(0.7);
        let config = ExecutorConfig::deterministic(seed).with_shots_per_chunk(chunk);
        let parallel = Executor::new(config.clone()).execute(&circuit, shots).unwrap();
        let serial = Executor::new(config.with_parallel(false)).execute(&circuit, shots).unwrap();
        prop_assert_eq!(parallel.histogram.total(), shots);
        prop_assert_eq!(parallel.histogram, serial.histogram);
    }

    #[test]
    fn prop_density_preview_agrees(steps in prop::collection::vec(step_strategy(), 1..24)) {
        let circuit = build(&steps);
        let pure = Preview::of(&circuit).unwrap();
        let mixed = Preview::with_budget(&circuit, 16).unwrap();
        prop_assert!(mixed.is_mixed());
        for q in 0..2 {
            for basis in [Basis::Z, Basis::X, Basis::Y] {
                let a = pure.probability_one_in(q, basis).unwrap();
                let b = mixed.probability_one_in(q, basis).unwrap();
                prop_assert!((a - b).abs() < 1e-9, "{:?} {}: {} vs {}", basis, q, a, b);
            }
        }
    }

    #[test]
    fn prop_single_rotation_preview(theta in -6.3f64..6.3) {
        let mut circuit = Circuit::new(1, 1).unwrap();
        circuit.add_gate(GateKind::RY(theta), &[0]).unwrap();
        let p = Preview::of(&circuit).unwrap().probability_one(0).unwrap();
        prop_assert!((p - (theta / 2.0).sin().powi(2)).abs() < 1e-12);
    }
}
