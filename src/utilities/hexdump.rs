use crate::utilities::error::{PrimError, Result};

#[inline]
pub fn hexlify(bytes: &[u8]) -> String {
    ::hex::encode(bytes)
}

pub fn unhexlify(hexstr: &str) -> Result<Vec<u8>> {
    ::hex::decode(hexstr).map_err(|e| PrimError::InvalidHexFormat(format!("{hexstr:?}: {e}")))
}

/// Renders bytes as `xx xx ...`, 16 per line, with a blank group after the
/// 8th byte of any line holding more than 8 bytes.
pub fn hexdump(data: &[u8]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(data.len().div_ceil(16));
    for chunk in data.chunks(16) {
        let mut parts: Vec<String> = chunk.iter().map(|b| format!("{b:02x}")).collect();
        if parts.len() > 8 {
            parts.insert(8, " ".to_string());
        }
        lines.push(parts.join(" "));
    }
    lines.join("\n")
}
