//! Dense square complex matrices and the operations the gate algebra needs
//!
//! [`GateMatrix`] stores a `d × d` matrix row-major. It is what
//! [`GateKind::matrix`](crate::GateKind::matrix) returns and what the state
//! kernels consume through [`GateMatrix::as_slice`].
//!
//! # Example
//!
//! ```
//! use qshot_gates::matrix_ops::GateMatrix;
//! use qshot_gates::matrices::{HADAMARD, PAULI_X};
//!
//! let h = GateMatrix::from_2x2(&HADAMARD);
//! let x = GateMatrix::from_2x2(&PAULI_X);
//!
//! // X on the first target, H on the second
//! let xh = x.kron(&h);
//! assert_eq!(xh.dimension(), 4);
//! assert!(xh.is_unitary(1e-12));
//! ```

use num_complex::Complex64;
use qshot_state::kernels::{Matrix2x2, Matrix4x4};
use std::fmt;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Square complex matrix in row-major order
#[derive(Clone, PartialEq)]
pub struct GateMatrix {
    dimension: usize,
    data: Vec<Complex64>,
}

impl GateMatrix {
    /// Wrap row-major data; `None` unless `data.len()` is a perfect square
    pub fn from_row_major(data: Vec<Complex64>) -> Option<Self> {
        let dimension = (data.len() as f64).sqrt().round() as usize;
        if dimension == 0 || dimension * dimension != data.len() {
            return None;
        }
        Some(Self { dimension, data })
    }

    /// Matrix from a 2×2 table
    pub fn from_2x2(matrix: &Matrix2x2) -> Self {
        Self::from_table(matrix)
    }

    /// Matrix from a 4×4 table
    pub fn from_4x4(matrix: &Matrix4x4) -> Self {
        Self::from_table(matrix)
    }

    /// Matrix from any `N × N` table
    pub fn from_table<const N: usize>(matrix: &[[Complex64; N]; N]) -> Self {
        Self {
            dimension: N,
            data: matrix.iter().flatten().copied().collect(),
        }
    }

    /// Identity of the given dimension
    pub fn identity(dimension: usize) -> Self {
        let mut data = vec![ZERO; dimension * dimension];
        for i in 0..dimension {
            data[i * dimension + i] = Complex64::new(1.0, 0.0);
        }
        Self { dimension, data }
    }

    /// Number of rows (= columns)
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Entry at (`row`, `col`)
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Complex64> {
        if row >= self.dimension || col >= self.dimension {
            return None;
        }
        Some(self.data[row * self.dimension + col])
    }

    /// Row-major entries
    #[inline]
    pub fn as_slice(&self) -> &[Complex64] {
        &self.data
    }

    /// Consume into row-major entries
    pub fn into_vec(self) -> Vec<Complex64> {
        self.data
    }

    /// Diagonal entries
    pub fn diagonal(&self) -> Vec<Complex64> {
        (0..self.dimension)
            .map(|i| self.data[i * self.dimension + i])
            .collect()
    }

    /// Whether every off-diagonal entry is within `tolerance` of zero
    pub fn is_diagonal(&self, tolerance: f64) -> bool {
        self.data.iter().enumerate().all(|(idx, value)| {
            idx / self.dimension == idx % self.dimension || value.norm() <= tolerance
        })
    }

    /// Matrix product `self · other`; `None` on dimension mismatch
    pub fn multiply(&self, other: &GateMatrix) -> Option<GateMatrix> {
        if self.dimension != other.dimension {
            return None;
        }
        let n = self.dimension;
        let mut data = vec![ZERO; n * n];
        for i in 0..n {
            for k in 0..n {
                let a = self.data[i * n + k];
                if a == ZERO {
                    continue;
                }
                for j in 0..n {
                    data[i * n + j] += a * other.data[k * n + j];
                }
            }
        }
        Some(GateMatrix { dimension: n, data })
    }

    /// Conjugate transpose
    pub fn adjoint(&self) -> GateMatrix {
        let n = self.dimension;
        let mut data = vec![ZERO; n * n];
        for i in 0..n {
            for j in 0..n {
                data[i * n + j] = self.data[j * n + i].conj();
            }
        }
        GateMatrix { dimension: n, data }
    }

    /// Kronecker product `self ⊗ other`
    ///
    /// `self` acts on the more significant index bits, so the result is the
    /// matrix of `self` on the first targets and `other` on the remaining ones.
    pub fn kron(&self, other: &GateMatrix) -> GateMatrix {
        let (na, nb) = (self.dimension, other.dimension);
        let n = na * nb;
        let mut data = vec![ZERO; n * n];
        for i in 0..na {
            for j in 0..na {
                let a = self.data[i * na + j];
                for k in 0..nb {
                    for l in 0..nb {
                        data[(i * nb + k) * n + j * nb + l] = a * other.data[k * nb + l];
                    }
                }
            }
        }
        GateMatrix { dimension: n, data }
    }

    /// Trace
    pub fn trace(&self) -> Complex64 {
        self.diagonal().into_iter().sum()
    }

    /// Entry-wise equality within `tolerance`
    pub fn approx_eq(&self, other: &GateMatrix, tolerance: f64) -> bool {
        self.dimension == other.dimension
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).norm() <= tolerance)
    }

    /// Equality up to a global phase, within `tolerance`
    pub fn approx_eq_up_to_phase(&self, other: &GateMatrix, tolerance: f64) -> bool {
        if self.dimension != other.dimension {
            return false;
        }
        // Phase from the largest entry of `other`
        let pivot = other
            .data
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))
            .map(|(idx, _)| idx);
        let Some(pivot) = pivot else {
            return true;
        };
        if other.data[pivot].norm() <= tolerance {
            return self.approx_eq(other, tolerance);
        }
        let ratio = self.data[pivot] / other.data[pivot];
        if (ratio.norm() - 1.0).abs() > tolerance {
            return false;
        }
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - ratio * b).norm() <= tolerance)
    }

    /// Whether `U†U = I` within `tolerance`
    pub fn is_unitary(&self, tolerance: f64) -> bool {
        self.adjoint()
            .multiply(self)
            .map_or(false, |product| {
                product.approx_eq(&GateMatrix::identity(self.dimension), tolerance)
            })
    }

    /// Whether `A = A†` within `tolerance`
    pub fn is_hermitian(&self, tolerance: f64) -> bool {
        self.approx_eq(&self.adjoint(), tolerance)
    }
}

impl fmt::Debug for GateMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "GateMatrix({}×{}) [", self.dimension, self.dimension)?;
        for row in self.data.chunks(self.dimension) {
            let cells: Vec<String> = row
                .iter()
                .map(|c| format!("{:+.4}{:+.4}i", c.re, c.im))
                .collect();
            writeln!(f, "  [{}]", cells.join(", "))?;
        }
        write!(f, "]")
    }
}
