//! Shot executor
//!
//! Shots are split into fixed-size chunks. Each chunk owns one state, one
//! register and one generator seeded from the base seed and the chunk
//! index, so a seeded execution produces the same histogram whether chunks
//! run sequentially, on the global rayon pool or on a dedicated pool.

use crate::cancel::CancelToken;
use crate::config::ExecutorConfig;
use crate::error::{ExecutionError, Result};
use crate::histogram::Histogram;
use crate::replay;
use crate::statistics::ExecutionStatistics;
use qshot_core::{Circuit, QuantumError};
use qshot_state::kernels::DEFAULT_PARALLEL_THRESHOLD;
use qshot_state::{ClassicalRegister, StateVector};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Outcome of an execution
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Counts of classical register outcomes
    pub histogram: Histogram,
    /// Timing and counters, if enabled in the configuration
    pub statistics: Option<ExecutionStatistics>,
}

#[derive(Debug, Default)]
struct ChunkOutcome {
    histogram: Histogram,
    gates: usize,
    measurements: usize,
}

/// Seed of chunk `index` (splitmix64 finalizer over the base seed)
fn chunk_seed(base: u64, index: usize) -> u64 {
    let step = (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    let mut z = base.wrapping_add(step);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Runs a circuit many times and aggregates the classical outcomes
///
/// # Example
/// ```
/// use qshot_core::{Circuit, GateKind};
/// use qshot_sim::{Executor, ExecutorConfig};
///
/// let mut circuit = Circuit::new(2, 2).unwrap();
/// circuit.add_gate(GateKind::H, &[0]).unwrap();
/// circuit.add_gate(GateKind::CX, &[0, 1]).unwrap();
/// circuit.measure(0, 0).unwrap();
/// circuit.measure(1, 1).unwrap();
///
/// let executor = Executor::new(ExecutorConfig::deterministic(42));
/// let result = executor.execute(&circuit, 1000).unwrap();
/// assert_eq!(result.histogram.total(), 1000);
/// assert_eq!(result.histogram.get("01") + result.histogram.get("10"), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: ExecutorConfig,
}

impl Executor {
    /// Create an executor
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Executor configuration
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Run `shots` shots of `circuit`
    pub fn execute(&self, circuit: &Circuit, shots: usize) -> Result<ExecutionResult> {
        self.execute_with_cancel(circuit, shots, &CancelToken::new())
    }

    /// Run `shots` shots of `circuit`, stopping early once `cancel` fires
    ///
    /// # Errors
    /// - `InvalidArgument` for an invalid configuration or more than
    ///   `max_shots` shots
    /// - `Cancelled` with the number of shots finished before stopping
    /// - `ThreadPool` if a dedicated pool could not be built
    /// - any error raised while replaying the circuit
    pub fn execute_with_cancel(
        &self,
        circuit: &Circuit,
        shots: usize,
        cancel: &CancelToken,
    ) -> Result<ExecutionResult> {
        self.config.validate()?;
        if shots > self.config.max_shots {
            return Err(QuantumError::InvalidArgument(format!(
                "{} shots requested, limit is {}",
                shots, self.config.max_shots
            ))
            .into());
        }

        let start = Instant::now();
        let chunk_size = self.config.shots_per_chunk;
        let num_chunks = shots / chunk_size + usize::from(shots % chunk_size != 0);
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        tracing::debug!(
            shots,
            chunks = num_chunks,
            qubits = circuit.num_qubits(),
            operations = circuit.len(),
            parallel = self.config.parallel,
            "starting execution"
        );

        // Parallel kernels only pay off when chunks are not already spread
        // over the pool.
        let kernel_threshold = if self.config.parallel && num_chunks == 1 {
            DEFAULT_PARALLEL_THRESHOLD
        } else {
            usize::MAX
        };

        let completed = AtomicUsize::new(0);
        let run_chunk = |index: usize| -> Result<ChunkOutcome> {
            let first = index * chunk_size;
            let count = chunk_size.min(shots - first);
            let mut rng = StdRng::seed_from_u64(chunk_seed(base_seed, index));
            let mut state =
                StateVector::new(circuit.num_qubits())?.with_parallel_threshold(kernel_threshold);
            let mut register = ClassicalRegister::new(circuit.num_bits());
            let mut outcome = ChunkOutcome::default();

            for _ in 0..count {
                if cancel.is_cancelled() {
                    return Err(ExecutionError::Cancelled {
                        completed: completed.load(Ordering::Relaxed),
                    });
                }
                state.reset();
                register.clear();
                let tally = replay::run_shot(circuit, &mut state, &mut register, &mut rng)?;
                outcome.histogram.record(&register.to_bitstring());
                outcome.gates += tally.gates;
                outcome.measurements += tally.measurements;
                completed.fetch_add(1, Ordering::Relaxed);
            }

            tracing::trace!(chunk = index, shots = count, "chunk finished");
            Ok(outcome)
        };

        let shots_start = Instant::now();
        let (outcomes, threads) = if !self.config.parallel {
            let outcomes: Result<Vec<ChunkOutcome>> = (0..num_chunks).map(run_chunk).collect();
            (outcomes, 1)
        } else if let Some(threads) = self.config.num_threads {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ExecutionError::ThreadPool(e.to_string()))?;
            let outcomes = pool.install(|| {
                (0..num_chunks)
                    .into_par_iter()
                    .map(&run_chunk)
                    .collect::<Result<Vec<_>>>()
            });
            (outcomes, pool.current_num_threads())
        } else {
            let outcomes = (0..num_chunks)
                .into_par_iter()
                .map(&run_chunk)
                .collect::<Result<Vec<_>>>();
            (outcomes, rayon::current_num_threads())
        };
        let shot_time = shots_start.elapsed();

        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            Err(err) if err.is_cancelled() => {
                let completed = completed.load(Ordering::SeqCst);
                tracing::warn!(completed, requested = shots, "execution cancelled");
                return Err(ExecutionError::Cancelled { completed });
            }
            Err(err) => return Err(err),
        };

        let merge_start = Instant::now();
        let mut histogram = Histogram::new();
        let mut gates_applied = 0;
        let mut measurements = 0;
        for outcome in &outcomes {
            histogram.merge(&outcome.histogram);
            gates_applied += outcome.gates;
            measurements += outcome.measurements;
        }
        let merge_time = merge_start.elapsed();

        tracing::debug!(
            shots,
            outcomes = histogram.num_outcomes(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
            "execution finished"
        );

        let statistics = self.config.collect_statistics.then(|| ExecutionStatistics {
            total_time: start.elapsed(),
            shot_time,
            merge_time,
            shots,
            chunks: num_chunks,
            threads: if num_chunks == 0 { 0 } else { threads },
            operations_per_shot: circuit.len(),
            gates_applied,
            measurements,
        });

        Ok(ExecutionResult {
            histogram,
            statistics,
        })
    }
}

impl ExecutionResult {
    /// Wall time of the whole execution, if statistics were collected
    pub fn elapsed(&self) -> Option<Duration> {
        self.statistics.as_ref().map(|s| s.total_time)
    }
}
