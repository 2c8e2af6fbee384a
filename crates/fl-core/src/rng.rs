//! Deterministic, explicitly threaded RNG.
//!
//! # Determinism strategy
//!
//! There is no global generator.  Every operation that needs randomness (role
//! assignment, capacity assignment, traffic multipliers, clustering seeds)
//! takes a `&mut FleetRng`.  A run seeded with the same value therefore
//! produces identical networks, weights and groupings.
//!
//! Independent streams for parallel workers are derived with
//! [`FleetRng::child`]:
//!
//!   child_seed = parent.next_u64() XOR (offset * MIXING_CONSTANT)
//!
//! The mixing constant is the 64-bit fractional part of the golden ratio,
//! which spreads consecutive offsets uniformly across the seed space.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Seeded run-level RNG.
///
/// Used only in single-threaded or explicitly synchronised contexts.  If you
/// need parallel randomness, give each worker its own `FleetRng` derived with
/// [`child`](Self::child).
#[derive(Clone, Debug)]
pub struct FleetRng(SmallRng);

impl FleetRng {
    pub fn new(seed: u64) -> Self {
        FleetRng(SmallRng::seed_from_u64(seed))
    }

    /// Derive a child `FleetRng` with a different seed offset.
    pub fn child(&mut self, offset: u64) -> FleetRng {
        let child_seed: u64 = self.0.r#gen::<u64>() ^ offset.wrapping_mul(MIXING_CONSTANT);
        FleetRng(SmallRng::seed_from_u64(child_seed))
    }

    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.0.r#gen()
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Shuffle a mutable slice in-place (Fisher-Yates).
    #[inline]
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.0);
    }

    /// Draw an index in `0..weights.len()` with probability proportional to
    /// its weight.
    ///
    /// Returns `None` if `weights` is empty, has a negative entry, or sums
    /// to zero.
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.0))
    }
}
