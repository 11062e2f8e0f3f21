use serde::Serialize;

use crate::log_json;
use crate::utilities::error::{PrimError, Result};

/// Where a straddling access points: a byte offset into the array's backing
/// store, or an absolute address together with the address of element 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    Offset(usize),
    Address { addr: u64, base: u64 },
}

#[derive(Serialize)]
struct AddressDiagnostic<'a> {
    message: &'a str,
    addr: String,
    base: String,
}

impl Location {
    pub fn resolve(self) -> Result<usize> {
        match self {
            Location::Offset(offset) => Ok(offset),
            Location::Address { addr, base } => {
                if addr < base {
                    log_json(&AddressDiagnostic {
                        message: "cannot access this address, it is before the array",
                        addr: format!("{addr:#x}"),
                        base: format!("{base:#x}"),
                    });
                    return Err(PrimError::AddressBeforeBase { addr, base });
                }
                usize::try_from(addr - base)
                    .map_err(|_| PrimError::AddressOutOfRange { addr, base })
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanOptions {
    /// Number of slots to scan; `None` scans the whole array.
    pub length: Option<usize>,
    /// Distance from a signature match to the 32-bit field it points at.
    pub field_offset: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            length: None,
            field_offset: 0x0c,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub needle: u32,
    pub length: usize,
    pub aligned: Vec<usize>,
    pub straddling: Vec<usize>,
    pub code_offsets: Vec<u32>,
}
