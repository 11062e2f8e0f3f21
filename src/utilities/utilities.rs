use crate::utilities::error::{PrimError, Result};
use crate::utilities::int64::FixedInt64;

pub const SLOT_SIZE: usize = 8;

/// Slot index and byte remainder of a backing-store offset.
#[inline]
pub fn slot_index(offset: usize) -> (usize, usize) {
    (offset / SLOT_SIZE, offset % SLOT_SIZE)
}

#[inline]
pub fn word_to_bytes(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

#[inline]
pub fn bytes_to_word(b: [u8; 4]) -> u32 {
    u32::from_le_bytes(b)
}

#[inline]
pub fn slot_int(arr: &[f64], index: usize) -> Result<FixedInt64> {
    arr.get(index)
        .map(|d| FixedInt64::from_double(*d))
        .ok_or(PrimError::OutOfBounds {
            index,
            len: arr.len(),
        })
}

#[inline]
pub fn check_slot(arr: &[f64], index: usize) -> Result<()> {
    if index < arr.len() {
        Ok(())
    } else {
        Err(PrimError::OutOfBounds {
            index,
            len: arr.len(),
        })
    }
}

#[inline]
pub fn check_length(arr: &[f64], length: usize) -> Result<()> {
    if length > arr.len() {
        return Err(PrimError::OutOfBounds {
            index: length - 1,
            len: arr.len(),
        });
    }
    Ok(())
}
