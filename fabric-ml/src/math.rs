//! Shared numeric utilities for model fitting.

/// FNV-1a hash for deterministic seed generation.
pub fn fnv1a_hash(data: &[u8]) -> u64 {
    let mut hash: u64 = 14695981039346656037;
    for &byte in data {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

/// Derive an independent, reproducible seed for the `index`-th member of
/// an ensemble. Members seeded this way do not depend on training order,
/// so they can be fitted in parallel.
pub fn member_seed(base_seed: u64, index: usize) -> u64 {
    fnv1a_hash(&(index as u64).to_le_bytes()) ^ base_seed
}

/// Index of the largest value. Ties resolve to the lowest index so that
/// votes are deterministic.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Round to a fixed number of decimal digits.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}
