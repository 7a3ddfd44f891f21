//! RNG module - deterministic randomness for headless drivers
//!
//! The placement rules themselves are fully deterministic; only the
//! autopilot needs noise. A seeded LCG keeps every run reproducible.

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Uniform value in `[0, 1)` from the high 24 bits.
    pub fn next_unit(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform value in `[-bound, bound)`.
    pub fn next_signed(&mut self, bound: f32) -> f32 {
        (self.next_unit() * 2.0 - 1.0) * bound
    }

    /// Current state, usable as a seed to replay from here.
    pub fn state(&self) -> u32 {
        self.state
    }
}
