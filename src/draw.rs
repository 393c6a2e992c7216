// Window + software drawing utilities.
// Provided here:
// 1) A window that shows the composed mosaic and reports keys.
// 2) Pixel helpers: alpha blend, additive (saturating) add, glow disc.
// 3) Scaled 8x8 bitmap glyphs for mosaic cells, the highlight label and the HUD.

use font8x8::legacy::BASIC_LEGACY;
use font8x8::{LATIN_FONTS, UnicodeFonts};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::Error;
use crate::types::{Coverage, FrameBuffer, Rgb};

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a window sized to the render surface, paced at `fps`.
    pub fn new(title: &str, width: usize, height: usize, fps: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(fps);
        Ok(Self { window })
    }

    /// Push the pixels for this frame to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))?;
        Ok(())
    }

    /// Returns false when the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Keys that went down since the last frame, with key repeat for held keys.
    pub fn keys_pressed(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::Yes)
    }

    pub fn shift_down(&self) -> bool {
        self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift)
    }
}

/* ---------- Software drawing: pixels, blends, glyphs ---------- */

#[inline]
fn index(fb: &FrameBuffer, x: i32, y: i32) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return None;
    }
    Some(y * fb.width + x)
}

/// Straight alpha blend of `color` over the existing pixel, `alpha` in [0,1].
#[inline]
pub fn blend_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: Rgb, alpha: f32) {
    let Some(idx) = index(fb, x, y) else { return };
    let old = Rgb::unpack(fb.pixels[idx]);
    fb.pixels[idx] = old.lerp(color, alpha.clamp(0.0, 1.0)).pack();
}

/// Additive blend one RGB triplet at (x,y) with saturation to 255.
#[inline]
pub fn add_rgb_saturating(fb: &mut FrameBuffer, x: i32, y: i32, r: u8, g: u8, b: u8) {
    let Some(idx) = index(fb, x, y) else { return };
    let old = Rgb::unpack(fb.pixels[idx]);
    fb.pixels[idx] = Rgb(old.0.saturating_add(r), old.1.saturating_add(g), old.2.saturating_add(b)).pack();
}

/// Draw a soft round glow disc centered at (cx,cy) with additive blending.
/// `strength` in [0,1] scales brightness of `base`.
pub fn draw_additive_disc(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, base: Rgb, strength: f32) {
    if radius <= 0 {
        return;
    }
    let r2 = (radius * radius) as f32;
    let sigma = radius as f32 * 0.5;
    let denom = 2.0 * sigma * sigma;

    for y in (cy - radius)..=(cy + radius) {
        for x in (cx - radius)..=(cx + radius) {
            let dx = (x - cx) as f32;
            let dy = (y - cy) as f32;
            let d2 = dx * dx + dy * dy;
            if d2 > r2 {
                continue;
            }
            // Gaussian falloff: 1.0 at center → ~0 at edge
            let w = (-d2 / denom).exp() * strength;
            let scale = |c: u8| (c as f32 * w).round().clamp(0.0, 255.0) as u8;
            add_rgb_saturating(fb, x, y, scale(base.0), scale(base.1), scale(base.2));
        }
    }
}

/* ---------- 8x8 bitmap glyphs ---------- */

/// 8 rows, bit 0 = leftmost pixel. ASCII and Latin-1 have glyphs; anything else renders as '?'.
fn glyph8x8(ch: char) -> [u8; 8] {
    let idx = ch as usize;
    if idx < BASIC_LEGACY.len() {
        return BASIC_LEGACY[idx];
    }
    LATIN_FONTS.get(ch).unwrap_or(BASIC_LEGACY[b'?' as usize])
}

/// Visit every set pixel of `ch` scaled to a `size`x`size` box with top-left (x0,y0).
fn for_each_glyph_pixel(ch: char, x0: f32, y0: f32, size: f32, mut f: impl FnMut(i32, i32)) {
    if size <= 0.0 || ch == ' ' {
        return;
    }
    let rows = glyph8x8(ch);
    let s = size / 8.0;
    for (ry, bits) in rows.iter().enumerate() {
        if *bits == 0 {
            continue;
        }
        let py0 = (y0 + ry as f32 * s).floor() as i32;
        let py1 = ((y0 + (ry + 1) as f32 * s).floor() as i32).max(py0 + 1);
        for rx in 0..8 {
            if bits & (1u8 << rx) == 0 {
                continue;
            }
            let px0 = (x0 + rx as f32 * s).floor() as i32;
            let px1 = ((x0 + (rx + 1) as f32 * s).floor() as i32).max(px0 + 1);
            for py in py0..py1 {
                for px in px0..px1 {
                    f(px, py);
                }
            }
        }
    }
}

/// Rasterise one glyph centered at (cx,cy) into a coverage layer.
pub fn glyph_coverage(layer: &mut Coverage, ch: char, cx: f32, cy: f32, size: f32) {
    let half = size * 0.5;
    for_each_glyph_pixel(ch, cx - half, cy - half, size, |x, y| layer.mark(x, y));
}

/// Width in pixels of `text` drawn at glyph `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size
}

/// Draw `text` with top-left (x,y), blending `color` at `alpha`.
pub fn draw_text(fb: &mut FrameBuffer, x: f32, y: f32, text: &str, size: f32, color: Rgb, alpha: f32) {
    let mut pen = x;
    for ch in text.chars() {
        for_each_glyph_pixel(ch, pen, y, size, |px, py| blend_pixel(fb, px, py, color, alpha));
        pen += size;
    }
}

/// Draw `text` centered on (cx,cy).
pub fn draw_text_centered(fb: &mut FrameBuffer, cx: f32, cy: f32, text: &str, size: f32, color: Rgb, alpha: f32) {
    let x = cx - text_width(text, size) * 0.5;
    draw_text(fb, x, cy - size * 0.5, text, size, color, alpha);
}

/// Unscaled HUD line with a 1-pixel black shadow for contrast.
pub fn draw_hud_line(fb: &mut FrameBuffer, x: i32, y: i32, text: &str, color: Rgb) {
    draw_text(fb, x as f32 + 1.0, y as f32 + 1.0, text, 8.0, Rgb(0, 0, 0), 1.0);
    draw_text(fb, x as f32, y as f32, text, 8.0, color, 1.0);
}
