use serde::{Deserialize, Serialize};

/// Deterministic pseudo-random value in `[0, 1)` keyed by a string.
///
/// Implementations must be pure: the same key always yields the same value, which is what makes cache spawning
/// reproducible across sessions without storing decisions for cells never visited.
pub trait Luck {
    fn luck(&self, key: &str) -> f64;
}

impl<F> Luck for F
where
    F: Fn(&str) -> f64,
{
    fn luck(&self, key: &str) -> f64 {
        self(key)
    }
}

/// Default luck source, a seeded small RNG drawn once per key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededLuck {
    seed: u64,
}

impl SeededLuck {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl Luck for SeededLuck {
    fn luck(&self, key: &str) -> f64 {
        use rand::prelude::*;

        let mut rng = SmallRng::seed_from_u64(fnv1a(key.as_bytes()) ^ self.seed);
        rng.random::<f64>()
    }
}

/// 64-bit FNV-1a, stable across platforms and releases unlike `std`'s hasher.
const fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = OFFSET;
    let mut index = 0;
    while index < bytes.len() {
        hash ^= bytes[index] as u64;
        hash = hash.wrapping_mul(PRIME);
        index += 1;
    }
    hash
}
