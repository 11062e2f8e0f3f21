// tests/helpers/mod.rs

/// A slot holding exactly the given bit pattern.
#[allow(dead_code)]
#[inline]
pub fn slot(bits: u64) -> f64 {
    f64::from_bits(bits)
}

/// Build a numeric array from raw 64-bit patterns.
#[allow(dead_code)]
pub fn array_from_bits(bits: &[u64]) -> Vec<f64> {
    bits.iter().map(|&b| slot(b)).collect()
}

/// Raw patterns of every slot, for exact comparisons (NaN-safe).
#[allow(dead_code)]
pub fn bits_of(arr: &[f64]) -> Vec<u64> {
    arr.iter().map(|d| d.to_bits()).collect()
}

/// Deterministic 64-bit values (splitmix64) so loops stay repeatable.
#[allow(dead_code)]
pub fn random_u64s(n: usize, seed: u64) -> Vec<u64> {
    let mut s = seed;
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        s = s.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = s;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        out.push(z ^ (z >> 31));
    }
    out
}

/// True when the top two bytes fall in the range a double can not carry.
#[allow(dead_code)]
pub fn is_reserved(bits: u64) -> bool {
    let top = (bits >> 48) as u16;
    top == 0xffff || top == 0xfffe
}
