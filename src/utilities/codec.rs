use crate::utilities::error::{PrimError, Result};

/// Element views supported by the codec. Byte order is always little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Int8,
    Int32,
    Float64,
}

impl Kind {
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            Kind::Int8 => 1,
            Kind::Int32 => 4,
            Kind::Float64 => 8,
        }
    }
}

/// Packed bytes, returned by value. Only the first `width` bytes are meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packed {
    bytes: [u8; 8],
    width: usize,
}

impl Packed {
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.width]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0
    }
}

impl AsRef<[u8]> for Packed {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

// Same conversion a typed-array store applies: NaN/inf become 0, the rest is
// truncated and wrapped modulo 2^bits.
#[inline]
fn to_uint(value: f64, bits: i32) -> u64 {
    if !value.is_finite() {
        return 0;
    }
    let modulus = 2f64.powi(bits);
    value.trunc().rem_euclid(modulus) as u64
}

pub fn pack(kind: Kind, value: f64) -> Packed {
    let mut bytes = [0u8; 8];
    match kind {
        Kind::Int8 => bytes[0] = to_uint(value, 8) as u8,
        Kind::Int32 => bytes[..4].copy_from_slice(&(to_uint(value, 32) as u32).to_le_bytes()),
        Kind::Float64 => bytes = value.to_le_bytes(),
    }
    Packed {
        bytes,
        width: kind.width(),
    }
}

pub fn unpack(kind: Kind, bytes: &[u8]) -> Result<f64> {
    if bytes.len() != kind.width() {
        return Err(PrimError::InvalidLength {
            expected: kind.width(),
            actual: bytes.len(),
        });
    }
    let v = match kind {
        Kind::Int8 => bytes[0] as f64,
        Kind::Int32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
        Kind::Float64 => {
            let mut b = [0u8; 8];
            b.copy_from_slice(bytes);
            f64::from_le_bytes(b)
        }
    };
    Ok(v)
}

#[inline]
pub fn pack_f64(value: f64) -> [u8; 8] {
    value.to_le_bytes()
}

#[inline]
pub fn unpack_f64(bytes: &[u8]) -> Result<f64> {
    unpack(Kind::Float64, bytes)
}

#[inline]
pub fn pack_u32(value: u32) -> [u8; 4] {
    value.to_le_bytes()
}

#[inline]
pub fn unpack_u32(bytes: &[u8]) -> Result<u32> {
    unpack(Kind::Int32, bytes).map(|v| v as u32)
}
