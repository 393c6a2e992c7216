// Tiny xorshift RNG. Drives random pool overwrites, seed-line picks and highlight placement.

/// Deterministic xorshift32 RNG for lightweight randomness.
#[derive(Clone, Debug)]
pub struct Rng32 { state: u32 }

impl Rng32 {
    pub fn from_seed(seed: u32) -> Self { Self { state: seed | 1 } }

    #[inline] pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform [0,1)
    #[inline] pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / ((1u32 << 24) as f32)
    }

    #[inline] pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform index in `0..n`. `n` must be non-zero.
    #[inline] pub fn index(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        (self.next_u32() as usize) % n
    }
}
