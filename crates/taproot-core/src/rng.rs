//! Deterministic PRNG for cosmetic tile variant picks.
//!
//! Uses the SplitMix64 algorithm: fast, 8 bytes of state, excellent
//! statistical properties, and trivially serializable for snapshots.
//! Behavioral simulation state never consults this generator -- only the
//! background/foreground variant selection at grid build time does.

/// SplitMix64 pseudo-random number generator.
///
/// Deterministic across platforms, so two engines built from the same
/// layers and the same seed render identically.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with the given seed.
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate the next `u64` in the sequence.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform value in `0..n`. `n` must be nonzero.
    ///
    /// Uses the multiply-shift reduction rather than modulo, so the bias
    /// for the tiny `n` values used in variant picks is negligible.
    pub fn below(&mut self, n: u32) -> u32 {
        debug_assert!(n > 0, "below(0) has no valid range");
        let r = self.next_u64() >> 32;
        ((r * u64::from(n)) >> 32) as u32
    }

    /// Returns `true` with probability `1/n`.
    pub fn one_in(&mut self, n: u32) -> bool {
        self.below(n) == 0
    }

    /// Get the internal state (for hashing/serialization).
    pub fn state(&self) -> u64 {
        self.state
    }
}
