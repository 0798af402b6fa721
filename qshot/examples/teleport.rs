//! Teleport a rotated qubit and print every export format
//!
//! Run with `RUST_LOG=debug` to see session and executor events.

use qshot::prelude::*;

fn main() -> Result<(), ExecutionError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("qshot teleportation demo");
    println!("========================");

    let theta = 1.1;
    let config = ExecutorConfig::deterministic(2024).with_statistics(true);
    let mut session = Session::new(3, 3)?.with_config(config)?;

    session.ry(theta, 0)?;
    let before = session.probability(0)?;

    session.h(1)?.cx(1, 2)?;
    session.barrier(&[])?;
    session.cx(0, 1)?.h(0)?;
    session.measure(0, 0)?.measure(1, 1)?;
    session.apply_if(&[1], 1, GateKind::X, &[2])?;
    session.apply_if(&[0], 1, GateKind::Z, &[2])?;
    let after = session.peek(2, 2)?;

    println!("P(1) of the source qubit:      {:.6}", before);
    println!("P(1) of the teleported qubit:  {:.6}", after);

    let counts = session.execute(10_000)?;
    println!("\nHistogram (b0 b1 b2): {}", counts);
    println!("Sampled P(b2 = 1): {:.4}", counts.marginal_one(2));
    if let Some(stats) = session.statistics() {
        println!("\n{}", stats);
    }

    println!("\n--- OpenQASM 2.0 ---\n{}", session.open_qasm());
    println!("--- cQASM 1.0 ---\n{}", session.c_qasm());
    println!("--- LaTeX ---\n{}", session.latex());

    session.close();
    Ok(())
}
