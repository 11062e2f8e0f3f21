use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utilities::codec::{Kind, pack, unpack};
use crate::utilities::error::{PrimError, Result};
use crate::utilities::hexdump::{hexlify, unhexlify};

/// Bias added to a double's bit pattern by NaN-boxing engines.
pub const TAG_BIAS: u64 = 1 << 48;

/// A 64-bit integer stored as 8 little-endian bytes.
///
/// Views never mutate. `negate`, `add` and `subtract` overwrite `self` and
/// return it for chaining.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FixedInt64 {
    bytes: [u8; 8],
}

impl FixedInt64 {
    pub const ZERO: FixedInt64 = FixedInt64 { bytes: [0; 8] };
    pub const ONE: FixedInt64 = FixedInt64 {
        bytes: [1, 0, 0, 0, 0, 0, 0, 0],
    };

    #[inline]
    pub const fn new() -> Self {
        Self::ZERO
    }

    /// Floors `value` and stores it. Negative values keep their
    /// two's-complement pattern.
    pub fn from_number(value: f64) -> Result<Self> {
        let f = value.floor();
        if !f.is_finite() || f < -(2f64.powi(63)) || f >= 2f64.powi(64) {
            return Err(PrimError::UnrepresentableValue {
                value: value.to_string(),
                target: "a 64-bit integer",
            });
        }
        let bits = if f < 0.0 { f as i64 as u64 } else { f as u64 };
        Ok(Self::from(bits))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let be = if digits.len() % 2 == 1 {
            unhexlify(&format!("0{digits}"))?
        } else {
            unhexlify(digits)?
        };
        if be.len() > 8 {
            return Err(PrimError::InvalidHexFormat(format!(
                "{s:?}: more than 8 bytes"
            )));
        }
        let mut bytes = [0u8; 8];
        for (i, b) in be.iter().rev().enumerate() {
            bytes[i] = *b;
        }
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; 8] = bytes
            .try_into()
            .map_err(|_| PrimError::LengthMismatch(bytes.len()))?;
        Ok(Self { bytes })
    }

    /// Same bit pattern as `d`.
    pub fn from_double(d: f64) -> Self {
        let packed = pack(Kind::Float64, d);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(packed.as_bytes());
        Self { bytes }
    }

    /// Explicit conversion from anything an operand may be given as.
    pub fn coerce(operand: &Operand) -> Result<Self> {
        match operand {
            Operand::Int(v) => Ok(*v),
            Operand::Number(n) => Self::from_number(*n),
            Operand::Hex(s) => Self::from_hex(s),
            Operand::Bytes(b) => Self::from_bytes(b),
        }
    }

    #[inline]
    pub fn bytes(&self) -> [u8; 8] {
        self.bytes
    }

    /// Byte `i` in little-endian order, `None` past the 8th.
    #[inline]
    pub fn byte_at(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    #[inline]
    pub fn to_u64(&self) -> u64 {
        u64::from_le_bytes(self.bytes)
    }

    /// Low and high 32-bit words.
    pub fn to_u32_pair(&self) -> (u32, u32) {
        let b = self.bytes;
        (
            u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
            u32::from_le_bytes([b[4], b[5], b[6], b[7]]),
        )
    }

    pub fn to_hex_string(&self) -> String {
        let mut be = self.bytes;
        be.reverse();
        format!("0x{}", hexlify(&be))
    }

    /// Double with the same bit pattern. Patterns whose top bytes are
    /// `ff ff` or `ff fe` are refused.
    pub fn to_double_bits(&self) -> Result<f64> {
        if self.bytes[7] == 0xff && (self.bytes[6] == 0xff || self.bytes[6] == 0xfe) {
            return Err(PrimError::UnrepresentableValue {
                value: self.to_hex_string(),
                target: "a double",
            });
        }
        unpack(Kind::Float64, &self.bytes)
    }

    /// Double whose NaN-boxed encoding equals this value, i.e. the bit
    /// pattern minus 2^48. Only values in `[0x0001000000000000, 0xffff000000000000)`.
    pub fn to_tagged_value(&self) -> Result<f64> {
        let (b6, b7) = (self.bytes[6], self.bytes[7]);
        if (b7 == 0 && b6 == 0) || (b7 == 0xff && b6 == 0xff) {
            return Err(PrimError::UnrepresentableValue {
                value: self.to_hex_string(),
                target: "a tagged value",
            });
        }
        let mut unboxed = Self::new();
        unboxed.subtract(self, &Self::from(TAG_BIAS));
        unboxed.to_double_bits()
    }

    /// self = -n
    pub fn negate(&mut self, n: &FixedInt64) -> &mut Self {
        self.bytes = (!*n).bytes;
        let complement = *self;
        self.add(&complement, &Self::ONE)
    }

    /// self = a + b (mod 2^64)
    pub fn add(&mut self, a: &FixedInt64, b: &FixedInt64) -> &mut Self {
        let (a, b) = (a.bytes, b.bytes);
        let mut carry = 0u16;
        for i in 0..8 {
            let cur = a[i] as u16 + b[i] as u16 + carry;
            carry = (cur > 0xff) as u16;
            self.bytes[i] = cur as u8;
        }
        self
    }

    /// self = a - b (mod 2^64)
    pub fn subtract(&mut self, a: &FixedInt64, b: &FixedInt64) -> &mut Self {
        let (a, b) = (a.bytes, b.bytes);
        let mut borrow = 0i16;
        for i in 0..8 {
            let cur = a[i] as i16 - b[i] as i16 - borrow;
            borrow = (cur < 0) as i16;
            self.bytes[i] = cur as u8;
        }
        self
    }
}

impl From<[u8; 8]> for FixedInt64 {
    fn from(bytes: [u8; 8]) -> Self {
        Self { bytes }
    }
}

impl From<u64> for FixedInt64 {
    fn from(v: u64) -> Self {
        Self {
            bytes: v.to_le_bytes(),
        }
    }
}

impl From<FixedInt64> for u64 {
    fn from(v: FixedInt64) -> u64 {
        v.to_u64()
    }
}

impl Not for FixedInt64 {
    type Output = FixedInt64;

    fn not(self) -> FixedInt64 {
        Self {
            bytes: self.bytes.map(|b| !b),
        }
    }
}

impl fmt::Display for FixedInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

impl fmt::Debug for FixedInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedInt64({})", self.to_hex_string())
    }
}

impl fmt::LowerHex for FixedInt64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.to_u64(), f)
    }
}

impl Serialize for FixedInt64 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_string())
    }
}

impl<'de> Deserialize<'de> for FixedInt64 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        FixedInt64::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Returns -n.
pub fn neg(n: &FixedInt64) -> FixedInt64 {
    *FixedInt64::new().negate(n)
}

/// Returns a + b.
pub fn add(a: &FixedInt64, b: &FixedInt64) -> FixedInt64 {
    *FixedInt64::new().add(a, b)
}

/// Returns a - b.
pub fn sub(a: &FixedInt64, b: &FixedInt64) -> FixedInt64 {
    *FixedInt64::new().subtract(a, b)
}

/// Any representation a `FixedInt64` can be built from. Strings are hex.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Number(f64),
    Hex(String),
    Bytes(Vec<u8>),
    Int(FixedInt64),
}

impl From<FixedInt64> for Operand {
    fn from(v: FixedInt64) -> Self {
        Operand::Int(v)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Number(v)
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Hex(v.to_string())
    }
}

impl From<Vec<u8>> for Operand {
    fn from(v: Vec<u8>) -> Self {
        Operand::Bytes(v)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Op {
    Neg,
    Add,
    Sub,
}

impl Op {
    pub const fn arity(self) -> usize {
        match self {
            Op::Neg => 1,
            Op::Add | Op::Sub => 2,
        }
    }
}

/// Checks the operand count, coerces every operand and computes a fresh result.
pub fn evaluate(op: Op, operands: &[Operand]) -> Result<FixedInt64> {
    if operands.len() != op.arity() {
        return Err(PrimError::ArityMismatch {
            op,
            expected: op.arity(),
            actual: operands.len(),
        });
    }
    let args = operands
        .iter()
        .map(FixedInt64::coerce)
        .collect::<Result<Vec<_>>>()?;
    let out = match op {
        Op::Neg => neg(&args[0]),
        Op::Add => add(&args[0], &args[1]),
        Op::Sub => sub(&args[0], &args[1]),
    };
    Ok(out)
}

/// Concatenates the bytes of `values` as Latin-1 characters.
pub fn to_latin1_string(values: &[FixedInt64]) -> String {
    values
        .iter()
        .flat_map(|v| v.bytes())
        .map(char::from)
        .collect()
}
