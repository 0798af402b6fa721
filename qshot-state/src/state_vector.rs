//! Dense state vector (the amplitude store)

use crate::error::{Result, StateError};
use crate::kernels::{self, Matrix2x2, Matrix4x4, DEFAULT_PARALLEL_THRESHOLD};
use num_complex::Complex64;
use std::fmt;

/// Largest register a dense state vector will allocate
pub const MAX_QUBITS: usize = 30;

/// Quantum state of `n` qubits as `2^n` complex amplitudes
///
/// Bit `q` of an amplitude index is the value of qubit `q`, so qubit 0 is the
/// least significant bit.
///
/// # Example
///
/// ```
/// use qshot_state::StateVector;
///
/// let state = StateVector::new(2).unwrap();
/// assert_eq!(state.num_qubits(), 2);
/// assert_eq!(state.dimension(), 4);
/// assert!(state.is_normalized(1e-12));
/// ```
#[derive(Clone, PartialEq)]
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
    parallel_threshold: usize,
}

impl StateVector {
    /// Create a new state vector initialized to |0...0⟩
    ///
    /// # Errors
    /// Returns error if `num_qubits` exceeds [`MAX_QUBITS`]
    pub fn new(num_qubits: usize) -> Result<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max: MAX_QUBITS,
            });
        }

        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);

        Ok(Self {
            num_qubits,
            amplitudes,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Create a state vector from raw amplitude data
    ///
    /// The amplitudes are used as given; call [`normalize`](Self::normalize)
    /// if they are not already of unit norm.
    ///
    /// # Errors
    /// Returns error if the length is not a power of two
    pub fn from_amplitudes(amplitudes: Vec<Complex64>) -> Result<Self> {
        let dimension = amplitudes.len();
        if dimension == 0 || !dimension.is_power_of_two() {
            return Err(StateError::InvalidDimension { dimension });
        }
        let num_qubits = dimension.trailing_zeros() as usize;
        if num_qubits > MAX_QUBITS {
            return Err(StateError::TooManyQubits {
                num_qubits,
                max: MAX_QUBITS,
            });
        }

        Ok(Self {
            num_qubits,
            amplitudes,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    /// Set the state size above which kernels run on multiple threads
    ///
    /// Pass `usize::MAX` to keep every kernel on the calling thread, which is
    /// what a shot worker wants when shots themselves already run in parallel.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Get the number of qubits
    #[inline]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the state dimension (2^num_qubits)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.amplitudes.len()
    }

    /// Get a reference to the state amplitudes
    #[inline]
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Get a mutable reference to the state amplitudes
    #[inline]
    pub fn amplitudes_mut(&mut self) -> &mut [Complex64] {
        &mut self.amplitudes
    }

    /// Amplitude of one basis state
    pub fn amplitude(&self, basis_state: usize) -> Option<Complex64> {
        self.amplitudes.get(basis_state).copied()
    }

    /// Sum of squared magnitudes
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// Compute the L2 norm of the state vector
    pub fn norm(&self) -> f64 {
        self.norm_sqr().sqrt()
    }

    /// Scale all amplitudes so that the norm equals 1
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 1e-15 {
            let inv_norm = 1.0 / norm;
            for amplitude in &mut self.amplitudes {
                *amplitude *= inv_norm;
            }
        }
    }

    /// Check if the state is normalized, i.e. `|norm² - 1| < epsilon`
    pub fn is_normalized(&self, epsilon: f64) -> bool {
        (self.norm_sqr() - 1.0).abs() < epsilon
    }

    /// Reset the state to |0...0⟩ without reallocating
    pub fn reset(&mut self) {
        self.amplitudes.fill(Complex64::new(0.0, 0.0));
        self.amplitudes[0] = Complex64::new(1.0, 0.0);
    }

    /// Probabilities of every computational basis state
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Inner product ⟨self|other⟩
    ///
    /// # Errors
    /// Returns error if the states have different dimensions
    pub fn inner_product(&self, other: &StateVector) -> Result<Complex64> {
        if self.dimension() != other.dimension() {
            return Err(StateError::InvalidDimension {
                dimension: other.dimension(),
            });
        }
        Ok(self
            .amplitudes
            .iter()
            .zip(other.amplitudes.iter())
            .map(|(a, b)| a.conj() * b)
            .sum())
    }

    /// Fidelity |⟨self|other⟩|², insensitive to global phase
    pub fn fidelity(&self, other: &StateVector) -> Result<f64> {
        Ok(self.inner_product(other)?.norm_sqr())
    }

    /// Check that every target is in range and that no target repeats
    ///
    /// # Errors
    /// `QubitOutOfRange` or `DuplicateTarget`
    pub fn check_targets(&self, targets: &[usize]) -> Result<()> {
        for (i, &target) in targets.iter().enumerate() {
            if target >= self.num_qubits {
                return Err(StateError::QubitOutOfRange {
                    index: target,
                    num_qubits: self.num_qubits,
                });
            }
            if targets[..i].contains(&target) {
                return Err(StateError::DuplicateTarget { qubit: target });
            }
        }
        Ok(())
    }

    /// Check a single qubit index
    pub fn check_qubit(&self, qubit: usize) -> Result<()> {
        if qubit >= self.num_qubits {
            return Err(StateError::QubitOutOfRange {
                index: qubit,
                num_qubits: self.num_qubits,
            });
        }
        Ok(())
    }

    /// Apply a single-qubit gate
    ///
    /// # Example
    /// ```
    /// use qshot_state::StateVector;
    /// use num_complex::Complex64;
    ///
    /// let mut state = StateVector::new(2).unwrap();
    /// let (o, z) = (Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0));
    /// state.apply_single_qubit_gate(&[[z, o], [o, z]], 1).unwrap();
    /// assert_eq!(state.amplitudes()[0b10], o);
    /// ```
    pub fn apply_single_qubit_gate(&mut self, matrix: &Matrix2x2, qubit: usize) -> Result<()> {
        self.check_qubit(qubit)?;
        kernels::apply_single_qubit(&mut self.amplitudes, matrix, qubit, self.parallel_threshold);
        Ok(())
    }

    /// Apply a two-qubit gate; `first` addresses the most significant matrix bit
    pub fn apply_two_qubit_gate(
        &mut self,
        matrix: &Matrix4x4,
        first: usize,
        second: usize,
    ) -> Result<()> {
        self.check_targets(&[first, second])?;
        kernels::apply_two_qubit(
            &mut self.amplitudes,
            matrix,
            first,
            second,
            self.parallel_threshold,
        );
        Ok(())
    }

    /// Apply a diagonal gate given the diagonal of its matrix
    pub fn apply_diagonal_gate(&mut self, diagonal: &[Complex64], targets: &[usize]) -> Result<()> {
        self.check_targets(targets)?;
        if diagonal.len() != 1 << targets.len() {
            return Err(StateError::MatrixMismatch {
                dimension: diagonal.len(),
                targets: targets.len(),
            });
        }
        kernels::apply_diagonal(&mut self.amplitudes, diagonal, targets, self.parallel_threshold);
        Ok(())
    }

    /// Apply an arbitrary k-qubit unitary given as a row-major `2^k × 2^k` matrix
    ///
    /// For every assignment of the non-target qubits, the `2^k` amplitudes
    /// addressed by the targets are multiplied by the matrix. The first target
    /// is the most significant bit of the matrix index.
    ///
    /// # Errors
    /// - `QubitOutOfRange` if a target is outside the register
    /// - `DuplicateTarget` if a target repeats
    /// - `MatrixMismatch` if the matrix is not `2^k × 2^k`
    pub fn apply_unitary(&mut self, matrix: &[Complex64], targets: &[usize]) -> Result<()> {
        self.check_targets(targets)?;
        let dim = 1usize << targets.len();
        if matrix.len() != dim * dim {
            return Err(StateError::MatrixMismatch {
                dimension: matrix.len(),
                targets: targets.len(),
            });
        }

        match targets {
            [] => {}
            [qubit] => {
                let m = [[matrix[0], matrix[1]], [matrix[2], matrix[3]]];
                kernels::apply_single_qubit(&mut self.amplitudes, &m, *qubit, self.parallel_threshold);
            }
            [first, second] => {
                let mut m = [[Complex64::new(0.0, 0.0); 4]; 4];
                for (row, chunk) in m.iter_mut().zip(matrix.chunks_exact(4)) {
                    row.copy_from_slice(chunk);
                }
                kernels::apply_two_qubit(
                    &mut self.amplitudes,
                    &m,
                    *first,
                    *second,
                    self.parallel_threshold,
                );
            }
            _ => kernels::apply_matrix(&mut self.amplitudes, matrix, targets, self.parallel_threshold),
        }
        Ok(())
    }
}

impl fmt::Debug for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateVector")
            .field("num_qubits", &self.num_qubits)
            .field("norm", &self.norm())
            .finish()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (index, amp) in self.amplitudes.iter().enumerate() {
            if amp.norm_sqr() < 1e-12 {
                continue;
            }
            if !first {
                write!(f, " + ")?;
            }
            first = false;
            write!(
                f,
                "({:.4}{:+.4}i)|{:0width$b}⟩",
                amp.re,
                amp.im,
                index,
                width = self.num_qubits.max(1)
            )?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}
