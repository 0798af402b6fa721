//! Gate application kernels over a dense amplitude slice
//!
//! All kernels use the same index convention: bit `q` of an amplitude index
//! is the value of qubit `q`. For a k-qubit matrix acting on targets
//! `[t_1, ..., t_k]`, the first target is the most significant bit of the
//! matrix row/column index.
//!
//! Kernels do not validate their arguments; [`crate::StateVector`] checks
//! targets before dispatching here.

use num_complex::Complex64;
use rayon::prelude::*;
use smallvec::SmallVec;

/// 2×2 gate matrix
pub type Matrix2x2 = [[Complex64; 2]; 2];

/// 4×4 gate matrix
pub type Matrix4x4 = [[Complex64; 4]; 4];

/// Minimum number of amplitudes before kernels split work across threads
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1 << 14;

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

/// Insert a zero bit at `position`, shifting the higher bits up by one
#[inline]
pub fn insert_zero_bit(value: usize, position: usize) -> usize {
    let low_mask = (1usize << position) - 1;
    ((value & !low_mask) << 1) | (value & low_mask)
}

/// Expand a block counter into the base index with all `sorted_targets` bits cleared
#[inline]
fn block_base(block: usize, sorted_targets: &[usize]) -> usize {
    sorted_targets
        .iter()
        .fold(block, |acc, &position| insert_zero_bit(acc, position))
}

/// Offsets of every sub-index of a k-qubit block, in matrix order
fn block_offsets(targets: &[usize]) -> SmallVec<[usize; 8]> {
    let k = targets.len();
    (0..1usize << k)
        .map(|sub| {
            targets
                .iter()
                .enumerate()
                .filter(|(pos, _)| (sub >> (k - 1 - pos)) & 1 == 1)
                .fold(0usize, |acc, (_, &t)| acc | (1 << t))
        })
        .collect()
}

/// Apply a single-qubit gate
pub fn apply_single_qubit(
    state: &mut [Complex64],
    gate: &Matrix2x2,
    qubit: usize,
    parallel_threshold: usize,
) {
    let stride = 1usize << qubit;
    let chunk = stride * 2;

    let kernel = |block: &mut [Complex64]| {
        let (low, high) = block.split_at_mut(stride);
        for (a, b) in low.iter_mut().zip(high.iter_mut()) {
            let (x, y) = (*a, *b);
            *a = gate[0][0] * x + gate[0][1] * y;
            *b = gate[1][0] * x + gate[1][1] * y;
        }
    };

    if state.len() >= parallel_threshold && state.len() / chunk > 1 {
        state.par_chunks_mut(chunk).for_each(kernel);
    } else {
        state.chunks_mut(chunk).for_each(kernel);
    }
}

/// Apply a two-qubit gate; `first` is the most significant matrix bit
pub fn apply_two_qubit(
    state: &mut [Complex64],
    gate: &Matrix4x4,
    first: usize,
    second: usize,
    parallel_threshold: usize,
) {
    let (low, high) = if first < second {
        (first, second)
    } else {
        (second, first)
    };
    let first_mask = 1usize << first;
    let second_mask = 1usize << second;
    let chunk = 1usize << (high + 1);

    let kernel = |block: &mut [Complex64]| {
        for local in 0..block.len() / 4 {
            let i00 = insert_zero_bit(insert_zero_bit(local, low), high);
            let i01 = i00 | second_mask;
            let i10 = i00 | first_mask;
            let i11 = i10 | second_mask;

            let a = [block[i00], block[i01], block[i10], block[i11]];
            for (row, &out) in [i00, i01, i10, i11].iter().enumerate() {
                block[out] = gate[row][0] * a[0]
                    + gate[row][1] * a[1]
                    + gate[row][2] * a[2]
                    + gate[row][3] * a[3];
            }
        }
    };

    if state.len() >= parallel_threshold && state.len() / chunk > 1 {
        state.par_chunks_mut(chunk).for_each(kernel);
    } else {
        state.chunks_mut(chunk).for_each(kernel);
    }
}

/// Apply a diagonal gate given its diagonal entries in matrix order
pub fn apply_diagonal(
    state: &mut [Complex64],
    diagonal: &[Complex64],
    targets: &[usize],
    parallel_threshold: usize,
) {
    let k = targets.len();
    let phase_index = |index: usize| {
        targets
            .iter()
            .enumerate()
            .fold(0usize, |acc, (pos, &t)| acc | (((index >> t) & 1) << (k - 1 - pos)))
    };

    if state.len() >= parallel_threshold {
        state.par_iter_mut().enumerate().for_each(|(i, amp)| {
            *amp *= diagonal[phase_index(i)];
        });
    } else {
        for (i, amp) in state.iter_mut().enumerate() {
            *amp *= diagonal[phase_index(i)];
        }
    }
}

/// Apply an arbitrary k-qubit gate given as a row-major `2^k × 2^k` matrix
///
/// Targets need be neither sorted nor contiguous.
pub fn apply_matrix(
    state: &mut [Complex64],
    matrix: &[Complex64],
    targets: &[usize],
    parallel_threshold: usize,
) {
    let k = targets.len();
    let dim = 1usize << k;
    let offsets = block_offsets(targets);

    let mut sorted: SmallVec<[usize; 4]> = targets.iter().copied().collect();
    sorted.sort_unstable();
    let high = sorted.last().copied().unwrap_or(0);
    let chunk = 1usize << (high + 1);

    let kernel = |block: &mut [Complex64]| {
        let mut gathered: SmallVec<[Complex64; 8]> = SmallVec::from_elem(ZERO, dim);
        for local in 0..block.len() >> k {
            let base = block_base(local, &sorted);
            for (slot, &offset) in gathered.iter_mut().zip(offsets.iter()) {
                *slot = block[base | offset];
            }
            for (row, &offset) in offsets.iter().enumerate() {
                let coefficients = &matrix[row * dim..(row + 1) * dim];
                block[base | offset] = coefficients
                    .iter()
                    .zip(gathered.iter())
                    .fold(ZERO, |acc, (m, a)| acc + m * a);
            }
        }
    };

    if state.len() >= parallel_threshold && state.len() / chunk > 1 {
        state.par_chunks_mut(chunk).for_each(kernel);
    } else {
        state.chunks_mut(chunk).for_each(kernel);
    }
}
