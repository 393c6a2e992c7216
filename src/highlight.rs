// Highlight overlay: the most recently submitted line flashes up in its bucket's
// band with a soft additive halo and a drop-shadowed label, then decays away.

use crate::classify::Bucket;
use crate::draw::{draw_additive_disc, draw_text_centered};
use crate::rng::Rng32;
use crate::types::{FrameBuffer, Rgb};

/// Label color per bucket.
pub fn bucket_color(bucket: Bucket) -> Rgb {
    match bucket {
        Bucket::Positive => Rgb(0, 255, 0),       // green
        Bucket::Neutral => Rgb(255, 240, 220),    // warm white
        Bucket::Negative => Rgb(250, 128, 114),   // salmon
    }
}

/// Vertical band (as fractions of height) the label is placed in.
pub fn bucket_band(bucket: Bucket) -> (f32, f32) {
    match bucket {
        Bucket::Positive => (0.20, 0.38),
        Bucket::Neutral => (0.50, 0.68),
        Bucket::Negative => (0.78, 0.92),
    }
}

const HALO_ALPHA: f32 = 32.0 / 255.0;

#[derive(Clone, Debug)]
pub struct Highlight {
    pub text: String,
    pub bucket: Bucket,
    pub x: f32,
    pub y: f32,
    pub alpha: f32,  // 0..=255
    pub ttl: i32,    // frames left
    ttl_frames: i32,
    decay: f32,
}

impl Highlight {
    pub fn new(ttl_frames: u32, decay: f32) -> Self {
        Self {
            text: String::new(),
            bucket: Bucket::Neutral,
            x: 0.0,
            y: 0.0,
            alpha: 0.0,
            ttl: 0,
            ttl_frames: ttl_frames as i32,
            decay,
        }
    }

    pub fn is_active(&self) -> bool {
        self.ttl > 0 && !self.text.is_empty()
    }

    /// Restart on a new line at a random spot inside its bucket's band.
    pub fn show(&mut self, text: &str, bucket: Bucket, width: usize, height: usize, rng: &mut Rng32) {
        let (lo, hi) = bucket_band(bucket);
        let (w, h) = (width as f32, height as f32);
        self.text = text.to_string();
        self.bucket = bucket;
        self.x = rng.range(w * 0.15, w * 0.85);
        self.y = rng.range(h * lo, h * hi);
        self.alpha = 255.0;
        self.ttl = self.ttl_frames;
    }

    pub fn clear(&mut self) {
        self.ttl = 0;
    }

    /// Draw this frame's halo and label, then decay. Inert once `ttl` runs out.
    pub fn render(&mut self, fb: &mut FrameBuffer, size: f32) {
        if !self.is_active() {
            return;
        }
        let col = bucket_color(self.bucket);
        let a = self.alpha / 255.0;

        draw_additive_disc(fb, self.x as i32, self.y as i32, (size * 1.3) as i32, col, HALO_ALPHA);
        draw_text_centered(fb, self.x + 2.0, self.y + 2.0, &self.text, size, Rgb(0, 0, 0), a);
        draw_text_centered(fb, self.x, self.y, &self.text, size, col, a);

        self.alpha *= self.decay;
        self.ttl -= 1;
    }
}
