//! Classical bit register written by measurements

use crate::error::{Result, StateError};
use std::fmt;

/// Most bits [`ClassicalRegister::value_of`] can pack into a `u64`
pub const MAX_PACKED_BITS: usize = u64::BITS as usize;

/// Register of `m` classical bits, all zero on creation
///
/// # Example
/// ```
/// use qshot_state::ClassicalRegister;
///
/// let mut reg = ClassicalRegister::new(3);
/// reg.set(2, true).unwrap();
/// assert_eq!(reg.to_bitstring(), "001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ClassicalRegister {
    bits: Vec<bool>,
}

impl ClassicalRegister {
    /// Create a register of `num_bits` zero bits
    pub fn new(num_bits: usize) -> Self {
        Self {
            bits: vec![false; num_bits],
        }
    }

    /// Number of bits
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the register holds no bits
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    fn check(&self, index: usize) -> Result<()> {
        if index >= self.bits.len() {
            return Err(StateError::BitOutOfRange {
                index,
                num_bits: self.bits.len(),
            });
        }
        Ok(())
    }

    /// Read one bit
    pub fn get(&self, index: usize) -> Result<bool> {
        self.check(index)?;
        Ok(self.bits[index])
    }

    /// Write one bit
    pub fn set(&mut self, index: usize, value: bool) -> Result<()> {
        self.check(index)?;
        self.bits[index] = value;
        Ok(())
    }

    /// Value of the selected bits as an integer, first listed bit least significant
    ///
    /// At most [`MAX_PACKED_BITS`] indices fit.
    pub fn value_of(&self, indices: &[usize]) -> Result<u64> {
        if indices.len() > MAX_PACKED_BITS {
            return Err(StateError::TooManyBits {
                count: indices.len(),
                max: MAX_PACKED_BITS,
            });
        }
        indices.iter().enumerate().try_fold(0u64, |acc, (pos, &index)| {
            Ok(acc | (u64::from(self.get(index)?) << pos))
        })
    }

    /// Whether the selected bits spell `value`, first listed bit least significant
    ///
    /// Bits past the width of `value` must be zero.
    pub fn matches(&self, indices: &[usize], value: u64) -> Result<bool> {
        let mut equal = true;
        for (pos, &index) in indices.iter().enumerate() {
            let wanted = pos < MAX_PACKED_BITS && (value >> pos) & 1 == 1;
            equal &= self.get(index)? == wanted;
        }
        Ok(equal && (indices.len() >= MAX_PACKED_BITS || value >> indices.len() == 0))
    }

    /// Clear every bit
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// All bits, index 0 first
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Canonical outcome string: one `0`/`1` per bit, index 0 first
    pub fn to_bitstring(&self) -> String {
        self.bits.iter().map(|&b| if b { '1' } else { '0' }).collect()
    }
}

impl fmt::Display for ClassicalRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bitstring())
    }
}
