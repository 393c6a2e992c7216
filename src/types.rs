// Core raster types shared by the compositor, overlay and window.

/// A packed RGB color, drawn as 0x00RRGGBB.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    #[inline]
    pub fn pack(self) -> u32 {
        ((self.0 as u32) << 16) | ((self.1 as u32) << 8) | self.2 as u32
    }

    #[inline]
    pub fn unpack(px: u32) -> Self {
        Rgb(((px >> 16) & 0xFF) as u8, ((px >> 8) & 0xFF) as u8, (px & 0xFF) as u8)
    }

    /// Straight lerp per channel, `t` in [0,1].
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb(c[0], c[1], c[2])
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrameBuffer {
    pub width: usize,      // how wide the frame is on screen (pixels)
    pub height: usize,     // how tall the frame is on screen (pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Vertical gradient from `top` (row 0) to `bottom` (last row).
    pub fn vertical_gradient(width: usize, height: usize, top: Rgb, bottom: Rgb) -> Self {
        let mut fb = Self::new(width, height);
        for y in 0..height {
            let t = if height > 1 { y as f32 / height as f32 } else { 0.0 };
            let px = top.lerp(bottom, t).pack();
            fb.pixels[y * width..(y + 1) * width].fill(px);
        }
        fb
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x])
    }
}

/// Glyph coverage in [0,1] per pixel; 1 = a glyph pixel, 0 = background shows through.
/// The mosaic rasterises into this and then composites it at the mix opacity.
#[derive(Clone, Debug)]
pub struct Coverage {
    pub width: usize,
    pub height: usize,
    pub alpha: Vec<f32>,   // length = width * height, values clamped to [0.0, 1.0]
}

impl Coverage {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0.0; width * height] }
    }

    pub fn clear(&mut self) {
        self.alpha.fill(0.0);
    }

    #[inline]
    pub fn mark(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return;
        }
        self.alpha[y * self.width + x] = 1.0;
    }

    pub fn covered(&self) -> usize {
        self.alpha.iter().filter(|a| **a > 0.0).count()
    }
}
