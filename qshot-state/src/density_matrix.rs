//! Density matrix for mixed states of a few qubits
//!
//! Element `(row, col)` is stored at `row * 2^n + col`. Read as a vector
//! over `2n` qubits, bits `0..n` of that index address the column and bits
//! `n..2n` the row, so `ρ → UρU†` is the state-vector kernel applied with
//! `U` on the row bits and `conj(U)` on the column bits.
//!
//! The trace is not forced to one: a matrix may carry the weight of one
//! part of a larger classical mixture.

use crate::error::{Result, StateError};
use crate::kernels::{self, DEFAULT_PARALLEL_THRESHOLD};
use crate::state_vector::StateVector;
use num_complex::Complex64;
use rayon::prelude::*;
use std::fmt;

/// Largest register a density matrix will allocate (`4^13` elements)
pub const MAX_DENSITY_QUBITS: usize = 13;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Unnormalized density matrix of `n` qubits
///
/// # Example
///
/// ```
/// use qshot_state::{DensityMatrix, StateVector};
///
/// let mut rho = DensityMatrix::from_state_vector(&StateVector::new(1).unwrap(), 1.0).unwrap();
/// let x = [0.0, 1.0, 1.0, 0.0].map(|re| num_complex::Complex64::new(re, 0.0));
/// rho.apply_unitary(&x, &[0]).unwrap();
/// assert!((rho.probability_one(0).unwrap() - 1.0).abs() < 1e-12);
/// ```
#[derive(Clone, PartialEq)]
pub struct DensityMatrix {
    num_qubits: usize,
    dimension: usize,
    matrix: Vec<Complex64>,
}

impl DensityMatrix {
    /// Create `|0...0⟩⟨0...0|`
    ///
    /// # Errors
    /// `TooManyQubits` above [`MAX_DENSITY_QUBITS`]
    pub fn new(num_qubits: usize) -> Result<Self> {
        let mut rho = Self::zeroed(num_qubits)?;
        rho.matrix[0] = Complex64::new(1.0, 0.0);
        Ok(rho)
    }

    /// `weight · |ψ⟩⟨ψ|` for the given state
    pub fn from_state_vector(state: &StateVector, weight: f64) -> Result<Self> {
        let mut rho = Self::zeroed(state.num_qubits())?;
        let amplitudes = state.amplitudes();
        rho.matrix
            .par_chunks_mut(rho.dimension)
            .zip(amplitudes.par_iter())
            .for_each(|(row, a)| {
                let scaled = *a * weight;
                for (element, b) in row.iter_mut().zip(amplitudes) {
                    *element = scaled * b.conj();
                }
            });
        Ok(rho)
    }

    fn zeroed(num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_DENSITY_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max: MAX_DENSITY_QUBITS,
            });
        }
        let dimension = 1usize << num_qubits;
        Ok(Self {
            num_qubits,
            dimension,
            matrix: vec![ZERO; dimension * dimension],
        })
    }

    /// Number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Matrix dimension (`2^n`)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Element `ρ[row, col]`
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.matrix[row * self.dimension + col]
    }

    /// Row-major elements
    pub fn matrix(&self) -> &[Complex64] {
        &self.matrix
    }

    /// `Tr(ρ)`
    pub fn trace(&self) -> f64 {
        (0..self.dimension).map(|i| self.get(i, i).re).sum()
    }

    fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::QubitOutOfRange {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply `ρ → UρU†` for a row-major `2^k × 2^k` unitary
    ///
    /// The first target is the most significant bit of the matrix index.
    ///
    /// # Errors
    /// `QubitOutOfRange`, `DuplicateTarget` or `MatrixMismatch`
    pub fn apply_unitary(&mut self, unitary: &[Complex64], targets: &[usize]) -> Result<()> {
        for (i, &target) in targets.iter().enumerate() {
            self.check_qubit(target)?;
            if targets[..i].contains(&target) {
                return Err(StateError::DuplicateTarget { qubit: target });
            }
        }
        let dim = 1usize << targets.len();
        if unitary.len() != dim * dim {
            return Err(StateError::MatrixMismatch {
                dimension: unitary.len(),
                targets: targets.len(),
            });
        }
        if targets.is_empty() {
            return Ok(());
        }

        let rows: Vec<usize> = targets.iter().map(|t| t + self.num_qubits).collect();
        kernels::apply_matrix(&mut self.matrix, unitary, &rows, DEFAULT_PARALLEL_THRESHOLD);
        let conjugate: Vec<Complex64> = unitary.iter().map(|u| u.conj()).collect();
        kernels::apply_matrix(&mut self.matrix, &conjugate, targets, DEFAULT_PARALLEL_THRESHOLD);
        Ok(())
    }

    /// Unnormalized weight of `qubit` reading `outcome`: `Σ ρ[i, i]` over matching `i`
    pub fn outcome_weight(&self, qubit: usize, outcome: bool) -> Result<f64> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        Ok((0..self.dimension)
            .filter(|i| (i & mask != 0) == outcome)
            .map(|i| self.get(i, i).re)
            .sum())
    }

    /// Probability that a Z measurement of `qubit` yields 1, relative to the trace
    pub fn probability_one(&self, qubit: usize) -> Result<f64> {
        let one = self.outcome_weight(qubit, true)?;
        let trace = self.trace();
        if trace <= 0.0 {
            return Ok(0.0);
        }
        Ok((one / trace).clamp(0.0, 1.0))
    }

    /// Keep only the block where `qubit` reads `outcome` on both sides
    ///
    /// Returns the trace that remains; nothing is renormalized.
    pub fn project(&mut self, qubit: usize, outcome: bool) -> Result<f64> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        let dimension = self.dimension;
        self.matrix
            .par_chunks_mut(dimension)
            .enumerate()
            .for_each(|(row, elements)| {
                let row_keeps = (row & mask != 0) == outcome;
                for (col, element) in elements.iter_mut().enumerate() {
                    if !row_keeps || (col & mask != 0) != outcome {
                        *element = ZERO;
                    }
                }
            });
        Ok(self.trace())
    }

    /// Drop the coherences between `qubit` reading 0 and reading 1
    pub fn dephase(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        let dimension = self.dimension;
        self.matrix
            .par_chunks_mut(dimension)
            .enumerate()
            .for_each(|(row, elements)| {
                for (col, element) in elements.iter_mut().enumerate() {
                    if (row ^ col) & mask != 0 {
                        *element = ZERO;
                    }
                }
            });
        Ok(())
    }

    /// Send `qubit` to `|0⟩` whatever it held, keeping the trace
    pub fn reset(&mut self, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        let mask = 1usize << qubit;
        let dimension = self.dimension;
        for row in (0..dimension).filter(|r| r & mask == 0) {
            for col in (0..dimension).filter(|c| c & mask == 0) {
                let moved = self.matrix[(row | mask) * dimension + (col | mask)];
                self.matrix[row * dimension + col] += moved;
            }
        }
        for row in 0..dimension {
            for col in 0..dimension {
                if (row | col) & mask != 0 {
                    self.matrix[row * dimension + col] = ZERO;
                }
            }
        }
        Ok(())
    }

    /// Multiply every element by `factor`
    pub fn scale(&mut self, factor: f64) {
        self.matrix.par_iter_mut().for_each(|element| *element *= factor);
    }

    /// Add `other` element-wise, mixing the two ensembles
    ///
    /// # Errors
    /// `InvalidDimension` if the matrices differ in size
    pub fn accumulate(&mut self, other: &DensityMatrix) -> Result<()> {
        if other.dimension != self.dimension {
            return Err(StateError::InvalidDimension {
                dimension: other.dimension,
            });
        }
        self.matrix
            .par_iter_mut()
            .zip(other.matrix.par_iter())
            .for_each(|(a, b)| *a += *b);
        Ok(())
    }
}

impl fmt::Debug for DensityMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DensityMatrix")
            .field("num_qubits", &self.num_qubits)
            .field("trace", &self.trace())
            .finish()
    }
}
