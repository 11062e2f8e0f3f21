use memchr::memmem;

use crate::utilities::error::{PrimError, Result};
use crate::utilities::int64::FixedInt64;
use crate::utilities::structs::{Location, ScanOptions, ScanReport};
use crate::utilities::utilities::{
    SLOT_SIZE, bytes_to_word, check_length, check_slot, slot_index, slot_int, word_to_bytes,
};

/// Low word of the slot when `offset` is slot-aligned, high word otherwise.
pub fn read_aligned32(arr: &[f64], offset: usize) -> Result<u32> {
    let (index, rem) = slot_index(offset);
    let b = slot_int(arr, index)?.bytes();
    let half = if rem == 0 {
        [b[0], b[1], b[2], b[3]]
    } else {
        [b[4], b[5], b[6], b[7]]
    };
    Ok(bytes_to_word(half))
}

pub fn write_aligned32(arr: &mut [f64], offset: usize, value: u32) -> Result<()> {
    let (index, rem) = slot_index(offset);
    let mut b = slot_int(arr, index)?.bytes();
    let at = if rem == 0 { 0 } else { 4 };
    b[at..at + 4].copy_from_slice(&word_to_bytes(value));
    arr[index] = FixedInt64::from(b).to_double_bits()?;
    Ok(())
}

/// Reads the word one byte past `loc`: bytes 1..5 of the slot when aligned,
/// otherwise bytes 5..8 of the slot plus byte 0 of the next one.
pub fn read_straddling32(arr: &[f64], loc: Location) -> Result<u32> {
    let offset = loc.resolve()?;
    let (index, rem) = slot_index(offset);
    let a = slot_int(arr, index)?.bytes();
    if rem != 0 {
        let b = slot_int(arr, index + 1)?.bytes();
        Ok(bytes_to_word([a[5], a[6], a[7], b[0]]))
    } else {
        Ok(bytes_to_word([a[1], a[2], a[3], a[4]]))
    }
}

pub fn write_straddling32(arr: &mut [f64], loc: Location, value: u32) -> Result<()> {
    let offset = loc.resolve()?;
    let (index, rem) = slot_index(offset);
    let w = word_to_bytes(value);
    let mut a = slot_int(arr, index)?.bytes();
    if rem != 0 {
        let mut b = slot_int(arr, index + 1)?.bytes();
        a[5..8].copy_from_slice(&w[0..3]);
        b[0] = w[3];
        // both patterns must be storable before either slot changes
        let first = FixedInt64::from(a).to_double_bits()?;
        let second = FixedInt64::from(b).to_double_bits()?;
        arr[index] = first;
        arr[index + 1] = second;
    } else {
        a[1..5].copy_from_slice(&w);
        arr[index] = FixedInt64::from(a).to_double_bits()?;
    }
    Ok(())
}

/// Reads 8 bytes at `loc`, joining the high half of one slot with the low
/// half of the next when the location is not slot-aligned.
pub fn read64(arr: &[f64], loc: Location) -> Result<FixedInt64> {
    let offset = loc.resolve()?;
    let (index, rem) = slot_index(offset);
    let a = slot_int(arr, index)?;
    if rem == 0 {
        return Ok(a);
    }
    let (a, b) = (a.bytes(), slot_int(arr, index + 1)?.bytes());
    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&a[4..8]);
    out[4..].copy_from_slice(&b[0..4]);
    Ok(FixedInt64::from(out))
}

/// Offset of `needle` in the low half of `slot`, else in its high half.
/// Single-result form for callers probing one slot; `scan_aligned32`
/// reports both halves.
pub fn find_needle_in_slot(needle: [u8; 4], slot: [u8; 8], slot_offset: usize) -> Option<usize> {
    if slot[0..4] == needle {
        Some(slot_offset)
    } else if slot[4..8] == needle {
        Some(slot_offset + 4)
    } else {
        None
    }
}

/// Every word-aligned byte offset within the first `length` slots holding `needle`.
pub fn scan_aligned32(arr: &[f64], needle: u32, length: usize) -> Result<Vec<usize>> {
    check_length(arr, length)?;
    let needle = word_to_bytes(needle);
    let backing: Vec<u8> = arr[..length].iter().flat_map(|d| d.to_le_bytes()).collect();

    let f = memmem::Finder::new(&needle);
    let mut offsets = Vec::new();
    let mut cur = 0usize;
    while let Some(p) = f.find(&backing[cur..]) {
        let at = cur + p;
        if at % 4 == 0 {
            offsets.push(at);
        }
        cur = at + 1;
    }
    Ok(offsets)
}

pub fn scan_straddling32(arr: &[f64], needle: u32, length: usize) -> Result<Vec<usize>> {
    check_length(arr, length)?;
    let mut offsets = Vec::new();
    for i in 0..length {
        let offset = i * SLOT_SIZE;
        if read_straddling32(arr, Location::Offset(offset))? == needle {
            offsets.push(offset);
        }
        // the high probe reaches into slot i + 1
        if check_slot(arr, i + 1).is_err() {
            continue;
        }
        let offset = offset + 4;
        if read_straddling32(arr, Location::Offset(offset))? == needle {
            offsets.push(offset);
        }
    }
    Ok(offsets)
}

/// For every aligned match of `needle`, the 32-bit word `field_offset` bytes further on.
pub fn find_code_offsets(arr: &[f64], needle: u32, options: ScanOptions) -> Result<Vec<u32>> {
    let length = options.length.unwrap_or(arr.len());
    scan_aligned32(arr, needle, length)?
        .into_iter()
        .map(|m| {
            let at = m
                .checked_add(options.field_offset)
                .ok_or(PrimError::OutOfBounds {
                    index: usize::MAX,
                    len: arr.len(),
                })?;
            read_aligned32(arr, at)
        })
        .collect()
}

pub fn scan_report(arr: &[f64], needle: u32, options: ScanOptions) -> Result<ScanReport> {
    let length = options.length.unwrap_or(arr.len());
    Ok(ScanReport {
        needle,
        length,
        aligned: scan_aligned32(arr, needle, length)?,
        straddling: scan_straddling32(arr, needle, length)?,
        code_offsets: find_code_offsets(arr, needle, options)?,
    })
}
