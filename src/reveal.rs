// Reveal gate: a cell shows a glyph when the noise field at its position
// is at or below the reveal fraction.

use crate::noise::ValueNoise;

#[derive(Clone, Debug)]
pub struct RevealGate {
    noise: ValueNoise,
    scale: f32,
    salt: f32,
}

impl RevealGate {
    pub fn new(seed: u32, scale: f32, salt: f32) -> Self {
        Self { noise: ValueNoise::new(seed), scale, salt }
    }

    #[inline]
    pub fn field(&self, x: f32, y: f32) -> f32 {
        self.noise.sample(x * self.scale, y * self.scale, self.salt)
    }

    #[inline]
    pub fn should_reveal(&self, x: f32, y: f32, fraction: f32) -> bool {
        self.field(x, y) <= fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gate() -> RevealGate {
        RevealGate::new(0, 0.03, 7.77)
    }

    fn revealed(g: &RevealGate, fraction: f32) -> usize {
        let mut n = 0;
        for y in (0..200).step_by(8) {
            for x in (0..320).step_by(8) {
                if g.should_reveal(x as f32, y as f32, fraction) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn extremes() {
        let g = gate();
        assert_eq!(revealed(&g, 1.0), 40 * 25);
        assert!(revealed(&g, -0.01) == 0);
    }

    #[test]
    fn repeated_calls_agree() {
        let g = gate();
        for (x, y) in [(0.0, 0.0), (123.0, 48.0), (999.0, 699.0)] {
            assert_eq!(g.should_reveal(x, y, 0.5), g.should_reveal(x, y, 0.5));
        }
    }

    proptest! {
        #[test]
        fn more_fraction_never_reveals_fewer(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let g = gate();
            prop_assert!(revealed(&g, lo) <= revealed(&g, hi));
        }
    }
}
