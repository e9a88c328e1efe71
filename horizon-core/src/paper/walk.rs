//! Seeded synthetic price paths.
//!
//! Seeds for independent streams are derived from one master seed with
//! BLAKE3, so the same `(seed, label)` always yields the same path.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Derive a stream seed from a master seed and a label.
pub fn sub_seed(master: u64, label: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master.to_le_bytes());
    hasher.update(label.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Multiplicative random walk: `price *= 1 + step_volatility * u`, `u ~ U(-1, 1)`.
///
/// Endless iterator; take as many ticks as needed.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    rng: StdRng,
    price: f64,
    step_volatility: f64,
}

impl RandomWalk {
    pub fn new(seed: u64, start: f64, step_volatility: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            price: start,
            step_volatility,
        }
    }

    /// Walk seeded from `sub_seed(master, label)`.
    pub fn labelled(master: u64, label: &str, start: f64, step_volatility: f64) -> Self {
        Self::new(sub_seed(master, label), start, step_volatility)
    }
}

impl Iterator for RandomWalk {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let current = self.price;
        let u: f64 = self.rng.gen_range(-1.0..1.0);
        self.price = (self.price * (1.0 + self.step_volatility * u)).max(f64::MIN_POSITIVE);
        Some(current)
    }
}
