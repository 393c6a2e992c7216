// Coherent value noise in 3-D. Lattice values come from an integer hash,
// so the field is fully deterministic for a given seed.

const OCTAVES: u32 = 4;
const FALLOFF: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct ValueNoise {
    seed: u32,
}

#[inline]
fn fade(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl ValueNoise {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    /// Pseudo-random lattice value in [0,1).
    fn lattice(&self, x: i32, y: i32, z: i32) -> f32 {
        let mut h = self.seed
            ^ (x as u32).wrapping_mul(0x8DA6_B343)
            ^ (y as u32).wrapping_mul(0xD816_3841)
            ^ (z as u32).wrapping_mul(0xCB1A_B31F);
        h ^= h >> 16;
        h = h.wrapping_mul(0x7FEB_352D);
        h ^= h >> 15;
        h = h.wrapping_mul(0x846C_A68B);
        h ^= h >> 16;
        (h >> 8) as f32 / ((1u32 << 24) as f32)
    }

    /// One octave: trilinear blend of the eight surrounding lattice values.
    fn octave(&self, x: f32, y: f32, z: f32) -> f32 {
        let (x0, y0, z0) = (x.floor(), y.floor(), z.floor());
        let (ix, iy, iz) = (x0 as i32, y0 as i32, z0 as i32);
        let (sx, sy, sz) = (fade(x - x0), fade(y - y0), fade(z - z0));

        let c = |dx: i32, dy: i32, dz: i32| self.lattice(ix + dx, iy + dy, iz + dz);

        let x00 = lerp(c(0, 0, 0), c(1, 0, 0), sx);
        let x10 = lerp(c(0, 1, 0), c(1, 1, 0), sx);
        let x01 = lerp(c(0, 0, 1), c(1, 0, 1), sx);
        let x11 = lerp(c(0, 1, 1), c(1, 1, 1), sx);

        lerp(lerp(x00, x10, sy), lerp(x01, x11, sy), sz)
    }

    /// Sum of octaves, normalised back into [0,1).
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let mut amp = 1.0;
        let mut freq = 1.0;
        let mut total = 0.0;
        let mut norm = 0.0;
        for _ in 0..OCTAVES {
            total += amp * self.octave(x * freq, y * freq, z * freq);
            norm += amp;
            amp *= FALLOFF;
            freq *= 2.0;
        }
        total / norm
    }
}
