// Speeds up gamma-correct blending by replacing powf with table lookups.
// The mix composite blends glyph color over the background in linear light.

pub struct GammaLut {
    // sRGB(0..255) -> linear (0..1) as f32
    srgb_to_linear: [f32; 256],
    // linear(0..1) -> sRGB(0..255) via 4096-step quantization
    // (index = (linear * 4095).round())
    linear_to_srgb: [u8; 4096],
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new()
    }
}

impl GammaLut {
    /// Build both tables once at startup.
    pub fn new() -> Self {
        let mut s2l = [0.0f32; 256];
        for (v, slot) in s2l.iter_mut().enumerate() {
            let c = v as f32 / 255.0;
            *slot = if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) };
        }

        let mut l2s = [0u8; 4096];
        for (i, slot) in l2s.iter_mut().enumerate() {
            let l = (i as f32) / 4095.0;
            let s = if l <= 0.003_130_8 { 12.92 * l } else { 1.055 * l.powf(1.0 / 2.4) - 0.055 };
            *slot = (s * 255.0).round().clamp(0.0, 255.0) as u8;
        }

        Self { srgb_to_linear: s2l, linear_to_srgb: l2s }
    }

    #[inline]
    pub fn srgb_u8_to_linear(&self, v: u8) -> f32 {
        self.srgb_to_linear[v as usize]
    }

    #[inline]
    pub fn linear_to_srgb_u8(&self, l: f32) -> u8 {
        let idx = (l.clamp(0.0, 1.0) * 4095.0).round() as usize;
        self.linear_to_srgb[idx]
    }

    /// Blend `src` over `dst` by `a` in linear light, per channel.
    #[inline]
    pub fn mix_u8(&self, dst: u8, src: u8, a: f32) -> u8 {
        let d = self.srgb_u8_to_linear(dst);
        let s = self.srgb_u8_to_linear(src);
        self.linear_to_srgb_u8(a * s + (1.0 - a) * d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_round_trip() {
        let lut = GammaLut::new();
        for v in [0u8, 1, 58, 128, 240, 255] {
            assert_eq!(lut.linear_to_srgb_u8(lut.srgb_u8_to_linear(v)), v);
        }
    }

    #[test]
    fn mix_extremes_pick_one_side() {
        let lut = GammaLut::new();
        assert_eq!(lut.mix_u8(20, 240, 0.0), 20);
        assert_eq!(lut.mix_u8(20, 240, 1.0), 240);
        let mid = lut.mix_u8(20, 240, 0.5);
        assert!(mid > 20 && mid < 240);
    }
}
