use core::ffi::c_int;

use crate::utilities::int64::Op;

pub const OK: c_int = 0;
pub const ERR_INVALID_ARGS: c_int = 1;
pub const ERR_PANIC: c_int = 2;
pub const ERR_PARSE: c_int = 4;
pub const ERR_LENGTH: c_int = 8;
pub const ERR_ARITY: c_int = 16;
pub const ERR_RANGE: c_int = 32;
pub const ERR_BOUNDS: c_int = 64;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PrimError {
    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("array must have exactly 8 elements, got {0}")]
    LengthMismatch(usize),

    #[error("{op:?} takes {expected} operand(s), got {actual}")]
    ArityMismatch { op: Op, expected: usize, actual: usize },

    #[error("{value} can not be represented as {target}")]
    UnrepresentableValue { value: String, target: &'static str },

    #[error("invalid hex string: {0}")]
    InvalidHexFormat(String),

    #[error("slot {index} out of bounds for array of length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("address {addr:#x} is before array start {base:#x}")]
    AddressBeforeBase { addr: u64, base: u64 },

    #[error("address {addr:#x} is too far past array start {base:#x}")]
    AddressOutOfRange { addr: u64, base: u64 },
}

impl PrimError {
    /// Status code reported across the C boundary.
    pub fn code(&self) -> c_int {
        match self {
            PrimError::InvalidLength { .. } | PrimError::LengthMismatch(_) => ERR_LENGTH,
            PrimError::ArityMismatch { .. } => ERR_ARITY,
            PrimError::UnrepresentableValue { .. } => ERR_RANGE,
            PrimError::InvalidHexFormat(_) => ERR_PARSE,
            PrimError::OutOfBounds { .. }
            | PrimError::AddressBeforeBase { .. }
            | PrimError::AddressOutOfRange { .. } => ERR_BOUNDS,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrimError>;
