//! Single-qubit computational basis measurement
//!
//! This module provides:
//! - Exact outcome probabilities (no randomness consumed)
//! - Sampled measurement with state collapse
//! - Sampled non-destructive measurement ("peek") that leaves the state intact
//!
//! Randomness always comes from a caller-supplied generator so that shot
//! workers can own independent, seedable sources.

use crate::classical::ClassicalRegister;
use crate::error::{Result, StateError};
use crate::state_vector::StateVector;
use num_complex::Complex64;
use rand::Rng;

/// Result of measuring one qubit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementResult {
    /// Observed value
    pub outcome: bool,

    /// Probability the observed value had before the measurement
    pub probability: f64,
}

impl MeasurementResult {
    /// Outcome as 0 or 1
    pub fn bit(&self) -> u8 {
        u8::from(self.outcome)
    }
}

/// Probabilities of reading qubit `qubit` as 0 and as 1, unnormalized
fn outcome_weights(state: &StateVector, qubit: usize) -> Result<(f64, f64)> {
    state.check_qubit(qubit)?;
    let mask = 1usize << qubit;
    Ok(state
        .amplitudes()
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(zero, one), (idx, amp)| {
            if idx & mask == 0 {
                (zero + amp.norm_sqr(), one)
            } else {
                (zero, one + amp.norm_sqr())
            }
        }))
}

/// Probability that `qubit` is observed as 1
///
/// Sum of `|a_i|²` over basis states with bit `qubit` set, clamped to [0, 1].
/// Does not touch the state and consumes no randomness.
///
/// # Example
/// ```
/// use qshot_state::{measurement, StateVector};
///
/// let state = StateVector::new(2).unwrap();
/// assert_eq!(measurement::probability_one(&state, 1).unwrap(), 0.0);
/// ```
pub fn probability_one(state: &StateVector, qubit: usize) -> Result<f64> {
    let (_, one) = outcome_weights(state, qubit)?;
    Ok(one.clamp(0.0, 1.0))
}

/// Draw an outcome for `qubit` without modifying the state
///
/// # Errors
/// `NumericDegeneracy` if both outcomes have exactly zero weight
pub fn sample<R: Rng + ?Sized>(
    state: &StateVector,
    qubit: usize,
    rng: &mut R,
) -> Result<MeasurementResult> {
    let (zero, one) = outcome_weights(state, qubit)?;
    let total = zero + one;
    if total <= 0.0 {
        return Err(StateError::NumericDegeneracy { qubit });
    }

    let outcome = rng.gen::<f64>() * total >= zero;
    let weight = if outcome { one } else { zero };
    Ok(MeasurementResult {
        outcome,
        probability: (weight / total).clamp(0.0, 1.0),
    })
}

/// Project `qubit` onto `outcome` and renormalize
///
/// Amplitudes inconsistent with the outcome are zeroed, the remaining ones
/// are divided by the square root of the outcome's total probability.
/// Returns that probability.
///
/// # Errors
/// `NumericDegeneracy` if the outcome has zero probability
pub fn collapse(state: &mut StateVector, qubit: usize, outcome: bool) -> Result<f64> {
    let (zero, one) = outcome_weights(state, qubit)?;
    let weight = if outcome { one } else { zero };
    if weight <= 0.0 {
        return Err(StateError::NumericDegeneracy { qubit });
    }

    let inv_norm = 1.0 / weight.sqrt();
    let mask = 1usize << qubit;
    for (idx, amp) in state.amplitudes_mut().iter_mut().enumerate() {
        if (idx & mask != 0) == outcome {
            *amp *= inv_norm;
        } else {
            *amp = Complex64::new(0.0, 0.0);
        }
    }

    Ok(weight / (zero + one))
}

/// Measure `qubit` and collapse the state onto the sampled outcome
///
/// # Example
/// ```
/// use qshot_state::{measurement, StateVector};
/// use rand::SeedableRng;
///
/// let mut state = StateVector::new(1).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let result = measurement::measure(&mut state, 0, &mut rng).unwrap();
/// assert!(!result.outcome);
/// ```
pub fn measure<R: Rng + ?Sized>(
    state: &mut StateVector,
    qubit: usize,
    rng: &mut R,
) -> Result<MeasurementResult> {
    let result = sample(state, qubit, rng)?;
    collapse(state, qubit, result.outcome)?;
    Ok(result)
}

/// A measurement of one qubit into one classical bit
///
/// With `collapse` disabled the measurement is a peek: the outcome is
/// sampled and recorded but the amplitudes are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QubitMeasurement {
    qubit: usize,
    bit: usize,
    collapse: bool,
}

impl QubitMeasurement {
    /// Destructive measurement of `qubit` into classical bit `bit`
    pub fn new(qubit: usize, bit: usize) -> Self {
        Self {
            qubit,
            bit,
            collapse: true,
        }
    }

    /// Set whether to collapse the state after measurement
    pub fn with_collapse(mut self, collapse: bool) -> Self {
        self.collapse = collapse;
        self
    }

    /// Measured qubit
    pub fn qubit(&self) -> usize {
        self.qubit
    }

    /// Destination classical bit
    pub fn bit(&self) -> usize {
        self.bit
    }

    /// Whether the state collapses
    pub fn collapses(&self) -> bool {
        self.collapse
    }

    /// Perform the measurement and write the outcome into `register`
    ///
    /// Both indices are checked before any randomness is drawn, so a failed
    /// call leaves state, register and generator untouched.
    pub fn perform<R: Rng + ?Sized>(
        &self,
        state: &mut StateVector,
        register: &mut ClassicalRegister,
        rng: &mut R,
    ) -> Result<MeasurementResult> {
        state.check_qubit(self.qubit)?;
        register.get(self.bit)?;

        let result = if self.collapse {
            measure(state, self.qubit, rng)?
        } else {
            sample(state, self.qubit, rng)?
        };
        register.set(self.bit, result.outcome)?;
        Ok(result)
    }
}
