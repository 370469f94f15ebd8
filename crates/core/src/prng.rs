//! Injectable randomness for k-means seeding.
//!
//! Clustering never reaches for ambient randomness: callers pass a
//! [`RandomSource`], and [`Xorshift64`] is the seedable default. A given
//! seed yields the same sequence on every platform, so cluster assignments
//! are reproducible in tests.

use serde::{Deserialize, Serialize};

/// A source of uniform random numbers.
pub trait RandomSource {
    /// Uniform f64 in [0, 1).
    fn next_f64(&mut self) -> f64;

    /// Uniform index in [0, max). `max` must be non-zero.
    fn next_index(&mut self, max: usize) -> usize {
        ((self.next_f64() * max as f64) as usize).min(max - 1)
    }
}

/// Xorshift64 with shifts (13, 7, 17).
///
/// A zero seed is a fixed point of xorshift, so it is swapped for a
/// non-zero constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Xorshift64 {
    state: u64,
}

impl Xorshift64 {
    const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 {
                Self::ZERO_SEED_REPLACEMENT
            } else {
                seed
            },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl RandomSource for Xorshift64 {
    /// Top 53 bits scaled into [0, 1).
    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn next_index(&mut self, max: usize) -> usize {
        (self.next_u64() % max as u64) as usize
    }
}
