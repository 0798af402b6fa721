//! The closed set of gate kinds
//!
//! Every gate the simulator knows is a [`GateKind`] variant carrying its own
//! parameters. The kind knows its arity, its unitary matrix, its adjoint and
//! how to act on a [`StateVector`].

use crate::error::{GateError, Result};
use crate::matrices;
use crate::matrix_ops::GateMatrix;
use num_complex::Complex64;
use qshot_state::kernels::{Matrix2x2, Matrix4x4};
use qshot_state::{DensityMatrix, StateVector};
use smallvec::{smallvec, SmallVec};
use std::f64::consts::FRAC_PI_2;
use std::fmt;

/// A quantum gate with its parameters
///
/// Angles are in radians. For multi-qubit kinds the first target is the most
/// significant bit of the matrix index: `CX` takes `[control, target]`,
/// `CCX` takes `[control, control, target]`.
///
/// # Example
///
/// ```
/// use qshot_gates::GateKind;
///
/// let rx = GateKind::RX(0.5);
/// assert_eq!(rx.name(), "RX");
/// assert_eq!(rx.num_qubits(), 1);
/// assert_eq!(rx.adjoint(), GateKind::RX(-0.5));
/// assert!(GateKind::CZ.is_diagonal());
/// ```
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GateKind {
    /// Identity
    I,
    /// Pauli-X
    X,
    /// Pauli-Y
    Y,
    /// Pauli-Z
    Z,
    /// Hadamard
    H,
    /// Phase, √Z
    S,
    /// S†
    Sdg,
    /// π/8 gate, √S
    T,
    /// T†
    Tdg,
    /// √X
    V,
    /// V†
    Vdg,
    /// Rotation about X by θ
    RX(f64),
    /// Rotation about Y by θ
    RY(f64),
    /// Rotation about Z by θ
    RZ(f64),
    /// Phase gate U1(λ)
    U1(f64),
    /// U2(φ, λ)
    U2(f64, f64),
    /// Generic single-qubit unitary U3(θ, φ, λ)
    U3(f64, f64, f64),
    /// Controlled-X
    CX,
    /// Controlled-Y
    CY,
    /// Controlled-Z
    CZ,
    /// Controlled-Hadamard
    CH,
    /// Swap
    Swap,
    /// Toffoli
    CCX,
}

impl GateKind {
    /// Short upper-case name
    pub fn name(&self) -> &'static str {
        match self {
            GateKind::I => "I",
            GateKind::X => "X",
            GateKind::Y => "Y",
            GateKind::Z => "Z",
            GateKind::H => "H",
            GateKind::S => "S",
            GateKind::Sdg => "SDG",
            GateKind::T => "T",
            GateKind::Tdg => "TDG",
            GateKind::V => "V",
            GateKind::Vdg => "VDG",
            GateKind::RX(_) => "RX",
            GateKind::RY(_) => "RY",
            GateKind::RZ(_) => "RZ",
            GateKind::U1(_) => "U1",
            GateKind::U2(..) => "U2",
            GateKind::U3(..) => "U3",
            GateKind::CX => "CX",
            GateKind::CY => "CY",
            GateKind::CZ => "CZ",
            GateKind::CH => "CH",
            GateKind::Swap => "SWAP",
            GateKind::CCX => "CCX",
        }
    }

    /// Number of qubits the gate acts on
    pub fn num_qubits(&self) -> usize {
        match self {
            GateKind::CX | GateKind::CY | GateKind::CZ | GateKind::CH | GateKind::Swap => 2,
            GateKind::CCX => 3,
            _ => 1,
        }
    }

    /// Number of control qubits leading the target list
    pub fn num_controls(&self) -> usize {
        match self {
            GateKind::CX | GateKind::CY | GateKind::CZ | GateKind::CH => 1,
            GateKind::CCX => 2,
            _ => 0,
        }
    }

    /// Numeric parameters in declaration order
    pub fn params(&self) -> SmallVec<[f64; 3]> {
        match *self {
            GateKind::RX(theta) | GateKind::RY(theta) | GateKind::RZ(theta) => smallvec![theta],
            GateKind::U1(lambda) => smallvec![lambda],
            GateKind::U2(phi, lambda) => smallvec![phi, lambda],
            GateKind::U3(theta, phi, lambda) => smallvec![theta, phi, lambda],
            _ => SmallVec::new(),
        }
    }

    /// Whether the gate matrix is diagonal in the computational basis
    pub fn is_diagonal(&self) -> bool {
        matches!(
            self,
            GateKind::I
                | GateKind::Z
                | GateKind::S
                | GateKind::Sdg
                | GateKind::T
                | GateKind::Tdg
                | GateKind::RZ(_)
                | GateKind::U1(_)
                | GateKind::CZ
        )
    }

    /// Whether the gate is its own inverse
    pub fn is_hermitian(&self) -> bool {
        matches!(
            self,
            GateKind::I
                | GateKind::X
                | GateKind::Y
                | GateKind::Z
                | GateKind::H
                | GateKind::CX
                | GateKind::CY
                | GateKind::CZ
                | GateKind::CH
                | GateKind::Swap
                | GateKind::CCX
        )
    }

    /// The inverse gate
    pub fn adjoint(&self) -> GateKind {
        match *self {
            GateKind::S => GateKind::Sdg,
            GateKind::Sdg => GateKind::S,
            GateKind::T => GateKind::Tdg,
            GateKind::Tdg => GateKind::T,
            GateKind::V => GateKind::Vdg,
            GateKind::Vdg => GateKind::V,
            GateKind::RX(theta) => GateKind::RX(-theta),
            GateKind::RY(theta) => GateKind::RY(-theta),
            GateKind::RZ(theta) => GateKind::RZ(-theta),
            GateKind::U1(lambda) => GateKind::U1(-lambda),
            GateKind::U2(phi, lambda) => GateKind::U3(-FRAC_PI_2, -lambda, -phi),
            GateKind::U3(theta, phi, lambda) => GateKind::U3(-theta, -lambda, -phi),
            other => other,
        }
    }

    /// Reject NaN and infinite parameters
    pub fn validate(&self) -> Result<()> {
        match self.params().into_iter().find(|p| !p.is_finite()) {
            Some(value) => Err(GateError::NonFiniteParameter {
                gate: self.name(),
                value,
            }),
            None => Ok(()),
        }
    }

    /// Check parameters and that `targets` has the right length
    ///
    /// Range and duplicate checks need the register size and are done by
    /// the caller or by the state kernels.
    pub fn check(&self, targets: &[usize]) -> Result<()> {
        if targets.len() != self.num_qubits() {
            return Err(GateError::ArityMismatch {
                gate: self.name(),
                expected: self.num_qubits(),
                found: targets.len(),
            });
        }
        self.validate()
    }

    /// 2×2 matrix of a single-qubit kind
    pub fn matrix_2x2(&self) -> Option<Matrix2x2> {
        let m = match *self {
            GateKind::I => matrices::IDENTITY,
            GateKind::X => matrices::PAULI_X,
            GateKind::Y => matrices::PAULI_Y,
            GateKind::Z => matrices::PAULI_Z,
            GateKind::H => matrices::HADAMARD,
            GateKind::S => matrices::S_GATE,
            GateKind::Sdg => matrices::S_GATE_DAGGER,
            GateKind::T => matrices::T_GATE,
            GateKind::Tdg => matrices::T_GATE_DAGGER,
            GateKind::V => matrices::V_GATE,
            GateKind::Vdg => matrices::V_GATE_DAGGER,
            GateKind::RX(theta) => matrices::rotation_x(theta),
            GateKind::RY(theta) => matrices::rotation_y(theta),
            GateKind::RZ(theta) => matrices::rotation_z(theta),
            GateKind::U1(lambda) => matrices::u1(lambda),
            GateKind::U2(phi, lambda) => matrices::u2(phi, lambda),
            GateKind::U3(theta, phi, lambda) => matrices::u3(theta, phi, lambda),
            _ => return None,
        };
        Some(m)
    }

    /// 4×4 matrix of a two-qubit kind
    pub fn matrix_4x4(&self) -> Option<Matrix4x4> {
        match self {
            GateKind::CX => Some(matrices::CNOT),
            GateKind::CY => Some(matrices::CY),
            GateKind::CZ => Some(matrices::CZ),
            GateKind::CH => Some(matrices::CH),
            GateKind::Swap => Some(matrices::SWAP),
            _ => None,
        }
    }

    /// Full `2^k × 2^k` unitary
    pub fn matrix(&self) -> GateMatrix {
        if let Some(m) = self.matrix_2x2() {
            return GateMatrix::from_2x2(&m);
        }
        if let Some(m) = self.matrix_4x4() {
            return GateMatrix::from_4x4(&m);
        }
        GateMatrix::from_table(&matrices::TOFFOLI)
    }

    /// Diagonal entries of a diagonal kind
    pub fn diagonal(&self) -> Option<SmallVec<[Complex64; 4]>> {
        if !self.is_diagonal() {
            return None;
        }
        if let Some(m) = self.matrix_2x2() {
            return Some(smallvec![m[0][0], m[1][1]]);
        }
        self.matrix_4x4()
            .map(|m| (0..4).map(|i| m[i][i]).collect())
    }

    /// Apply the gate to `state` on `targets`
    ///
    /// # Errors
    /// - `ArityMismatch` if `targets` has the wrong length
    /// - `NonFiniteParameter` for NaN or infinite angles
    /// - `State` if a target is out of range or repeated
    ///
    /// # Example
    /// ```
    /// use qshot_gates::GateKind;
    /// use qshot_state::StateVector;
    ///
    /// let mut state = StateVector::new(2).unwrap();
    /// GateKind::X.apply(&mut state, &[0]).unwrap();
    /// GateKind::CX.apply(&mut state, &[0, 1]).unwrap();
    /// assert!((state.amplitudes()[0b11].re - 1.0).abs() < 1e-12);
    /// ```
    pub fn apply(&self, state: &mut StateVector, targets: &[usize]) -> Result<()> {
        self.check(targets)?;

        if let Some(diagonal) = self.diagonal() {
            state.apply_diagonal_gate(&diagonal, targets)?;
        } else if let Some(m) = self.matrix_2x2() {
            state.apply_single_qubit_gate(&m, targets[0])?;
        } else if let Some(m) = self.matrix_4x4() {
            state.apply_two_qubit_gate(&m, targets[0], targets[1])?;
        } else {
            state.apply_unitary(self.matrix().as_slice(), targets)?;
        }
        Ok(())
    }

    /// Conjugate a density matrix by this gate: `ρ → UρU†`
    pub fn apply_to_density(&self, rho: &mut DensityMatrix, targets: &[usize]) -> Result<()> {
        self.check(targets)?;
        rho.apply_unitary(self.matrix().as_slice(), targets)?;
        Ok(())
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())?;
        let params = self.params();
        if !params.is_empty() {
            let rendered: Vec<String> = params.iter().map(|p| format!("{:.4}", p)).collect();
            write!(f, "({})", rendered.join(", "))?;
        }
        Ok(())
    }
}
