//! Bounds, width and byte-order helpers shared by every memory space.

use crate::Fault;

/// Widest single access in bytes; values travel as `u64`.
pub const MAX_ACCESS_BYTES: usize = 8;

/// Byte order used to encode multi-byte values inside a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Endianness {
    /// Most significant byte at the lowest address.
    #[default]
    Big,
    /// Least significant byte at the lowest address.
    Little,
}

impl Endianness {
    /// Encodes the low `size` bytes of `value`, truncating higher bytes.
    #[must_use]
    pub fn encode(self, value: u64, size: usize) -> Vec<u8> {
        let size = size.min(MAX_ACCESS_BYTES);
        match self {
            Self::Big => value.to_be_bytes()[MAX_ACCESS_BYTES - size..].to_vec(),
            Self::Little => value.to_le_bytes()[..size].to_vec(),
        }
    }

    /// Decodes up to eight bytes into an unsigned value.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> u64 {
        let fold = |acc: u64, byte: &u8| (acc << 8) | u64::from(*byte);
        match self {
            Self::Big => bytes.iter().fold(0, fold),
            Self::Little => bytes.iter().rev().fold(0, fold),
        }
    }
}

/// Validates that an access width can be carried in a `u64`.
///
/// # Errors
///
/// Returns [`Fault::UnsupportedWidth`] when `size` is zero or wider than
/// [`MAX_ACCESS_BYTES`].
pub const fn validate_width(size: usize) -> Result<(), Fault> {
    if size == 0 || size > MAX_ACCESS_BYTES {
        Err(Fault::UnsupportedWidth { size })
    } else {
        Ok(())
    }
}

/// Validates that `[address, address + size)` lies inside a space of
/// `space_size` bytes.
///
/// The start address itself must always be inside the space, even for
/// zero-sized requests.
///
/// # Errors
///
/// Returns [`Fault::AddressOutOfRange`] when the range escapes the space.
pub const fn validate_range(address: usize, size: usize, space_size: usize) -> Result<(), Fault> {
    let fits = address < space_size
        && match address.checked_add(size) {
            Some(end) => end <= space_size,
            None => false,
        };
    if fits {
        Ok(())
    } else {
        Err(Fault::AddressOutOfRange {
            address,
            size,
            space_size,
        })
    }
}
