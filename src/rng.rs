//! Seedable Random Number Generation for `no_std`
//!
//! Sequencer engines need randomness for probability gates, random step
//! selection, and shift-register mutation, but they must stay deterministic
//! when the host seeds them. This module provides a small Xorshift128+
//! generator that each engine owns directly. There is no global state; two
//! engines seeded identically replay identical sequences.
//!
//! With the `std` feature enabled, `from_entropy` pulls a fresh seed from
//! the operating system. In `no_std` mode, hosts seed explicitly.

/// A seedable random number generator using Xorshift128+.
///
/// Fast, with a period of 2^128 - 1, and comfortably good enough for
/// musical probability decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRng {
    s0: u64,
    s1: u64,
}

impl SequenceRng {
    /// Create a new RNG with the given seed values.
    ///
    /// The seeds should not both be zero.
    #[inline]
    pub const fn new(s0: u64, s1: u64) -> Self {
        // Xorshift state must never be all-zero
        let s0 = if s0 == 0 && s1 == 0 { 1 } else { s0 };
        Self { s0, s1 }
    }

    /// Create a new RNG from a single 64-bit seed.
    ///
    /// The seed is split into two state values using a mixing function.
    #[inline]
    pub fn from_seed(seed: u64) -> Self {
        // Use splitmix64 to derive state from seed
        let s0 = splitmix64(seed);
        let s1 = splitmix64(seed.wrapping_add(0x9e3779b97f4a7c15));
        Self::new(s0, s1)
    }

    /// Create a new RNG seeded from operating system entropy (std only).
    #[cfg(feature = "std")]
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// Generate the next u64 value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.s0;
        let mut s1 = self.s1;
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.s0 = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.s1 = s1.rotate_left(37);

        result
    }

    /// Generate a random f32 in the range [0.0, 1.0).
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        // Use the upper 24 bits for the mantissa
        (self.next_u64() >> 40) as f32 * (1.0 / (1u64 << 24) as f32)
    }

    /// Generate a random bool with the given probability (0.0 to 1.0).
    ///
    /// A probability at or above 1.0 always passes, at or below 0.0 never.
    #[inline]
    pub fn next_bool_with_probability(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    /// Generate a uniform index in `[0, bound)`. A zero bound yields zero.
    #[inline]
    pub fn next_index(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        // Multiply-shift maps the top 32 bits onto the range without modulo bias
        (((self.next_u64() >> 32) * bound as u64) >> 32) as usize
    }

    /// Jump the RNG state forward by 2^64 steps.
    ///
    /// Useful for creating independent streams.
    pub fn jump(&mut self) {
        const JUMP: [u64; 2] = [0xdf900294d8f554a5, 0x170865df4b3201fc];

        let mut s0 = 0u64;
        let mut s1 = 0u64;

        for jump_val in JUMP.iter() {
            for b in 0..64 {
                if (jump_val >> b) & 1 != 0 {
                    s0 ^= self.s0;
                    s1 ^= self.s1;
                }
                self.next_u64();
            }
        }

        self.s0 = s0;
        self.s1 = s1;
    }
}

impl Default for SequenceRng {
    fn default() -> Self {
        #[cfg(feature = "std")]
        {
            Self::from_entropy()
        }
        #[cfg(not(feature = "std"))]
        {
            Self::new(0x853c49e6748fea9b, 0xda3e39cb94b95bdb)
        }
    }
}

/// Splitmix64 mixing function for deriving state from seeds.
#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e3779b97f4a7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d049bb133111eb);
    x ^ (x >> 31)
}
