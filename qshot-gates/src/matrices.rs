//! Constant and parametric gate matrices
//!
//! Fixed gates are `const` tables; rotations and generic unitaries are
//! generated from their angles. Multi-qubit matrices list the first target
//! as the most significant bit of the row/column index, so `CNOT` reads
//! `[control, target]`.

use num_complex::Complex64;
use qshot_state::kernels::{Matrix2x2, Matrix4x4};

const ZERO: Complex64 = Complex64::new(0.0, 0.0);
const ONE: Complex64 = Complex64::new(1.0, 0.0);
const I: Complex64 = Complex64::new(0.0, 1.0);
const NEG_I: Complex64 = Complex64::new(0.0, -1.0);
const NEG_ONE: Complex64 = Complex64::new(-1.0, 0.0);

const INV_SQRT2: f64 = std::f64::consts::FRAC_1_SQRT_2;
const H_POS: Complex64 = Complex64::new(INV_SQRT2, 0.0);
const H_NEG: Complex64 = Complex64::new(-INV_SQRT2, 0.0);

// Single-qubit gates

/// Identity
pub const IDENTITY: Matrix2x2 = [[ONE, ZERO], [ZERO, ONE]];

/// Hadamard
/// H = 1/√2 * [[1,  1],
///             [1, -1]]
pub const HADAMARD: Matrix2x2 = [[H_POS, H_POS], [H_POS, H_NEG]];

/// Pauli-X (NOT)
pub const PAULI_X: Matrix2x2 = [[ZERO, ONE], [ONE, ZERO]];

/// Pauli-Y
/// Y = [[0, -i],
///      [i,  0]]
pub const PAULI_Y: Matrix2x2 = [[ZERO, NEG_I], [I, ZERO]];

/// Pauli-Z
pub const PAULI_Z: Matrix2x2 = [[ONE, ZERO], [ZERO, NEG_ONE]];

/// S = diag(1, i)
pub const S_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, I]];

/// S† = diag(1, -i)
pub const S_GATE_DAGGER: Matrix2x2 = [[ONE, ZERO], [ZERO, NEG_I]];

/// T = diag(1, e^(iπ/4))
pub const T_GATE: Matrix2x2 = [[ONE, ZERO], [ZERO, Complex64::new(INV_SQRT2, INV_SQRT2)]];

/// T† = diag(1, e^(-iπ/4))
pub const T_GATE_DAGGER: Matrix2x2 = [
    [ONE, ZERO],
    [ZERO, Complex64::new(INV_SQRT2, -INV_SQRT2)],
];

/// V = √X
/// V = 1/2 * [[1+i, 1-i],
///            [1-i, 1+i]]
pub const V_GATE: Matrix2x2 = [
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
];

/// V† = (√X)†
pub const V_GATE_DAGGER: Matrix2x2 = [
    [Complex64::new(0.5, -0.5), Complex64::new(0.5, 0.5)],
    [Complex64::new(0.5, 0.5), Complex64::new(0.5, -0.5)],
];

// Two-qubit gates

/// Controlled-NOT
pub const CNOT: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
    [ZERO, ZERO, ONE, ZERO],
];

/// Controlled-Y
pub const CY: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, NEG_I],
    [ZERO, ZERO, I, ZERO],
];

/// Controlled-Z
pub const CZ: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ZERO, ZERO, NEG_ONE],
];

/// Controlled-Hadamard
pub const CH: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, H_POS, H_POS],
    [ZERO, ZERO, H_POS, H_NEG],
];

/// SWAP
pub const SWAP: Matrix4x4 = [
    [ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO],
    [ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE],
];

// Three-qubit gates

/// Toffoli (CCNOT): flips the last target when both controls are |1⟩
pub const TOFFOLI: [[Complex64; 8]; 8] = [
    [ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO, ZERO],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE],
    [ZERO, ZERO, ZERO, ZERO, ZERO, ZERO, ONE, ZERO],
];

#[inline]
fn phase_factor(angle: f64) -> Complex64 {
    Complex64::from_polar(1.0, angle)
}

/// RX(θ) = [[cos(θ/2),    -i·sin(θ/2)],
///          [-i·sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_x(theta: f64) -> Matrix2x2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(0.0, -sin)],
        [Complex64::new(0.0, -sin), Complex64::new(cos, 0.0)],
    ]
}

/// RY(θ) = [[cos(θ/2), -sin(θ/2)],
///          [sin(θ/2),  cos(θ/2)]]
#[inline]
pub fn rotation_y(theta: f64) -> Matrix2x2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(cos, 0.0), Complex64::new(-sin, 0.0)],
        [Complex64::new(sin, 0.0), Complex64::new(cos, 0.0)],
    ]
}

/// RZ(θ) = diag(e^(-iθ/2), e^(iθ/2))
#[inline]
pub fn rotation_z(theta: f64) -> Matrix2x2 {
    [
        [phase_factor(-theta / 2.0), ZERO],
        [ZERO, phase_factor(theta / 2.0)],
    ]
}

/// U1(λ) = diag(1, e^(iλ))
#[inline]
pub fn u1(lambda: f64) -> Matrix2x2 {
    [[ONE, ZERO], [ZERO, phase_factor(lambda)]]
}

/// U2(φ,λ) = 1/√2 * [[1,       -e^(iλ)    ],
///                   [e^(iφ),   e^(i(φ+λ))]]
#[inline]
pub fn u2(phi: f64, lambda: f64) -> Matrix2x2 {
    [
        [H_POS, -phase_factor(lambda) * INV_SQRT2],
        [
            phase_factor(phi) * INV_SQRT2,
            phase_factor(phi + lambda) * INV_SQRT2,
        ],
    ]
}

/// U3(θ,φ,λ) = [[cos(θ/2),          -e^(iλ)·sin(θ/2)    ],
///              [e^(iφ)·sin(θ/2),    e^(i(φ+λ))·cos(θ/2)]]
#[inline]
pub fn u3(theta: f64, phi: f64, lambda: f64) -> Matrix2x2 {
    let (sin, cos) = (theta / 2.0).sin_cos();
    [
        [Complex64::new(cos, 0.0), -phase_factor(lambda) * sin],
        [phase_factor(phi) * sin, phase_factor(phi + lambda) * cos],
    ]
}
