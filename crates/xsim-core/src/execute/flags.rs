//! Condition flags derived from arithmetic results.

use super::helpers::WORD_MASK;

/// Sign, zero, parity and carry conditions of one arithmetic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArithmeticFlags {
    /// Bit 15 of the masked result.
    pub sign: bool,
    /// Masked result is zero.
    pub zero: bool,
    /// Even number of set bits in the masked result.
    pub parity: bool,
    /// Unmasked result exceeded 16 bits.
    pub carry: bool,
}

impl ArithmeticFlags {
    /// Derives the flags of an unmasked result.
    #[must_use]
    pub const fn from_result(result: i64) -> Self {
        let masked = mask(result);
        Self {
            sign: masked & 0x8000 != 0,
            zero: masked == 0,
            parity: masked.count_ones() % 2 == 0,
            carry: result > WORD_MASK as i64,
        }
    }

    /// Names of the flags whose condition holds.
    #[must_use]
    pub fn seated(self) -> Vec<&'static str> {
        [
            (self.sign, "S"),
            (self.zero, "Z"),
            (self.parity, "P"),
            (self.carry, "C"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Low 16 bits of a result, two's complement for negatives.
#[must_use]
pub const fn mask(result: i64) -> u64 {
    (result as u64) & WORD_MASK
}
