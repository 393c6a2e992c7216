// The mosaic compositor and the state it owns.
//
// `Mosaic` is the one context object every input lands on: submitted lines,
// mask advances, control overrides and sensor readings all go through its
// methods between frames. `Mosaic::render` then composes one frame:
//
// 1. resolve reveal fraction and zoom (a sensor reading overrides manual values),
// 2. walk the cell grid; skip cells whose blended mask brightness is at or below
//    the cutoff, then cells the reveal gate rejects, and only then pull the next
//    character from the bucket picked by the cell's height on screen,
// 3. composite the glyph layer over the background at the mix opacity,
// 4. draw the highlight on top, then advance the fade and scroll counters.
//
// Cells are rejected before a character is pulled so the cursors advance with
// the number of glyphs on screen rather than the number of cells.

use log::{debug, info};

use crate::classify::{Bucket, Classification, Classifier, Source};
use crate::config::{Config, ControlsConfig, MosaicConfig, SensorConfig};
use crate::draw::glyph_coverage;
use crate::fade::FadeController;
use crate::gamma::GammaLut;
use crate::highlight::Highlight;
use crate::input::Command;
use crate::mask::MaskSet;
use crate::pool::TextPools;
use crate::reveal::RevealGate;
use crate::rng::Rng32;
use crate::types::{Coverage, FrameBuffer, Rgb};

/// Positive rows sit above this fraction of the height.
pub const POSITIVE_BELOW: f32 = 0.40;
/// Negative rows sit below this fraction of the height.
pub const NEGATIVE_ABOVE: f32 = 0.70;
/// Scroll jump given to a band when a keyword-classified line lands in it.
pub const SUBMIT_JUMP: u32 = 25;

/// p5-style `map` with the result clamped to the output range.
pub fn map_range(v: f32, in_lo: f32, in_hi: f32, out_lo: f32, out_hi: f32) -> f32 {
    if in_hi == in_lo {
        return out_lo;
    }
    let t = ((v - in_lo) / (in_hi - in_lo)).clamp(0.0, 1.0);
    out_lo + (out_hi - out_lo) * t
}

/// Band a cell belongs to by its normalised height, ignoring pool contents.
pub fn band_for(y_norm: f32) -> Bucket {
    if y_norm < POSITIVE_BELOW {
        Bucket::Positive
    } else if y_norm > NEGATIVE_ABOVE {
        Bucket::Negative
    } else {
        Bucket::Neutral
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Controls {
    pub reveal: f32,
    pub zoom: f32,
    pub mix: f32,
}

/// Per-bucket scroll counters; they shift where the reveal gate samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollOffsets([u32; 3]);

impl ScrollOffsets {
    pub fn get(&self, bucket: Bucket) -> u32 {
        self.0[bucket.slot()]
    }

    fn bump(&mut self) {
        for o in &mut self.0 {
            *o = o.wrapping_add(1);
        }
    }

    fn nudge(&mut self, bucket: Bucket, by: u32) {
        let o = &mut self.0[bucket.slot()];
        *o = o.wrapping_add(by);
    }

    fn reset(&mut self) {
        self.0 = [0; 3];
    }
}

/// What one rendered frame did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub cells: usize,
    pub glyphs: usize,
}

pub struct Mosaic {
    width: usize,
    height: usize,
    cfg: MosaicConfig,
    sensor_cfg: SensorConfig,
    limits: ControlsConfig,

    masks: MaskSet,
    fade: FadeController,
    gate: RevealGate,
    pools: TextPools,
    classifier: Classifier,
    highlight: Highlight,

    controls: Controls,
    sensor: Option<f32>,
    offsets: ScrollOffsets,
    paused: bool,
    frame: u64,
    draft: String,
    seed_lines: Vec<String>,
    status: String,
    rng: Rng32,

    background: FrameBuffer,
    layer: Coverage,
    lut: GammaLut,
}

impl Mosaic {
    /// Build from config with the classifier model the config names.
    pub fn from_config(config: &Config, masks: MaskSet) -> Self {
        let c = &config.classifier;
        let classifier = Classifier::new(c.model.build(), c.positive_above, c.negative_below);
        Self::new(config, masks, classifier)
    }

    pub fn new(config: &Config, masks: MaskSet, classifier: Classifier) -> Self {
        let (width, height) = (config.window.width, config.window.height);
        let cfg = config.mosaic.clone();
        let background =
            FrameBuffer::vertical_gradient(width, height, cfg.background_top.into(), cfg.background_bottom.into());

        let mut pools = TextPools::new(config.pools.max_lines, Rng32::from_seed(config.seed));
        for line in &config.pools.seed_lines {
            pools.submit(Bucket::Neutral, line);
        }

        let gate = &config.reveal_gate;
        let controls = &config.controls;
        Self {
            width,
            height,
            cfg,
            sensor_cfg: config.sensor.clone(),
            limits: controls.clone(),
            masks,
            fade: FadeController::new(config.fade.frames),
            gate: RevealGate::new(gate.seed, gate.scale, gate.salt),
            pools,
            classifier,
            highlight: Highlight::new(config.highlight.ttl_frames, config.highlight.decay),
            controls: Controls { reveal: controls.reveal, zoom: controls.zoom, mix: controls.mix },
            sensor: None,
            offsets: ScrollOffsets::default(),
            paused: false,
            frame: 0,
            draft: String::new(),
            seed_lines: config.pools.seed_lines.clone(),
            status: "classifier: waiting for first line".to_string(),
            rng: Rng32::from_seed(config.seed ^ 0x9E37_79B9),
            background,
            layer: Coverage::new(width, height),
            lut: GammaLut::new(),
        }
    }

    /* ---------- inputs ---------- */

    /// Classify a line, file it in its pool and flash it as the highlight.
    /// Blank input changes nothing.
    pub fn submit_line(&mut self, text: &str) -> Option<Classification> {
        let line = text.trim();
        if line.is_empty() {
            debug!("ignoring empty submission");
            return None;
        }
        let class = self.classifier.classify(line);
        let inserted = self.pools.submit(class.bucket, line);
        if class.source == Source::Fallback {
            self.offsets.nudge(class.bucket, SUBMIT_JUMP);
        }
        self.highlight.show(line, class.bucket, self.width, self.height, &mut self.rng);
        self.status = class.status();
        info!("submitted {line:?}: {} ({inserted:?})", self.status);
        Some(class)
    }

    /// Submit the draft, or a random seed line when the draft is blank.
    pub fn plant(&mut self) -> Option<Classification> {
        let draft = std::mem::take(&mut self.draft);
        let draft = draft.trim();
        if !draft.is_empty() {
            return self.submit_line(draft);
        }
        if self.seed_lines.is_empty() {
            return None;
        }
        let line = self.seed_lines[self.rng.index(self.seed_lines.len())].clone();
        self.submit_line(&line)
    }

    pub fn push_draft(&mut self, ch: char) {
        self.draft.push(ch);
    }

    pub fn pop_draft(&mut self) {
        self.draft.pop();
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Start a cross-fade to the next mask; clears scroll offsets and the highlight.
    pub fn advance_mask(&mut self) -> bool {
        if !self.fade.advance(self.masks.len()) {
            debug!("mask advance ignored (fading={}, masks={})", self.fade.is_fading(), self.masks.len());
            return false;
        }
        self.offsets.reset();
        self.highlight.clear();
        info!("fading to mask {}", self.fade.active_index());
        true
    }

    pub fn set_reveal_fraction(&mut self, v: f32) {
        if v.is_finite() {
            self.controls.reveal = v.clamp(0.0, 1.0);
        }
    }

    /// Clamped to the configured zoom limits, in whichever order the config gives them.
    pub fn set_zoom(&mut self, v: f32) {
        if v.is_finite() {
            let (lo, hi) = (self.limits.zoom_min, self.limits.zoom_max);
            self.controls.zoom = v.max(lo.min(hi)).min(lo.max(hi));
        }
    }

    pub fn set_mix_opacity(&mut self, v: f32) {
        if v.is_finite() {
            self.controls.mix = v.clamp(0.0, 1.0);
        }
    }

    /// Once a reading arrives it drives reveal and zoom instead of the manual values.
    pub fn set_sensor_reading(&mut self, raw: f32) {
        if raw.is_finite() {
            self.sensor = Some(raw);
        } else {
            debug!("ignoring non-finite sensor reading");
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        info!("{}", if self.paused { "paused" } else { "resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::Sensor(n) => self.set_sensor_reading(n),
            Command::NextMask => {
                self.advance_mask();
            }
            Command::Plant => {
                self.plant();
            }
            Command::Text(t) => {
                self.submit_line(&t);
            }
            Command::TogglePause => self.toggle_pause(),
        }
    }

    /* ---------- read-only views ---------- */

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn control_step(&self) -> f32 {
        self.limits.step
    }

    /// Reveal fraction and zoom in effect this frame.
    pub fn resolved(&self) -> (f32, f32) {
        match self.sensor {
            Some(raw) => {
                let s = &self.sensor_cfg;
                (
                    map_range(raw, s.raw_min, s.raw_max, s.reveal_min, s.reveal_max),
                    map_range(raw, s.raw_min, s.raw_max, s.zoom_min, s.zoom_max),
                )
            }
            None => (self.controls.reveal, self.controls.zoom),
        }
    }

    /// Last classification decision, for the debug readout.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn pools(&self) -> &TextPools {
        &self.pools
    }

    pub fn highlight(&self) -> &Highlight {
        &self.highlight
    }

    pub fn fade(&self) -> &FadeController {
        &self.fade
    }

    pub fn offsets(&self) -> ScrollOffsets {
        self.offsets
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// A black frame buffer matching the surface.
    pub fn new_frame_buffer(&self) -> FrameBuffer {
        FrameBuffer::new(self.width, self.height)
    }

    /// Pool a cell draws from: its band, or neutral when that band's pool is empty.
    pub fn bucket_for(&self, y_norm: f32) -> Bucket {
        match band_for(y_norm) {
            b @ (Bucket::Positive | Bucket::Negative) if !self.pools.is_empty(b) => b,
            _ => Bucket::Neutral,
        }
    }

    /* ---------- frame ---------- */

    /// Compose one frame into `screen`. Returns `None` without touching any state when paused.
    pub fn render(&mut self, screen: &mut FrameBuffer) -> Option<FrameStats> {
        if self.paused {
            return None;
        }
        let (reveal, zoom) = self.resolved();

        if screen.width == self.width && screen.height == self.height {
            screen.pixels.copy_from_slice(&self.background.pixels);
        } else {
            *screen = self.background.clone();
        }

        let stats = self.draw_cells(reveal, zoom);
        self.composite(screen);

        let label_size = self.cfg.cell_size as f32 * 2.4 * zoom.max(1.0);
        self.highlight.render(screen, label_size);

        self.fade.tick();
        self.frame += 1;
        if self.cfg.scroll_every_frames > 0 && self.frame % self.cfg.scroll_every_frames == 0 {
            self.offsets.bump();
        }
        Some(stats)
    }

    fn draw_cells(&mut self, reveal: f32, zoom: f32) -> FrameStats {
        self.layer.clear();
        let mut stats = FrameStats::default();
        let step = self.cfg.cell_size.max(1);
        let glyph_size = step as f32 * self.cfg.glyph_scale * zoom;

        for y in (0..self.height).step_by(step) {
            let y_norm = y as f32 / self.height as f32;
            let band = band_for(y_norm);
            let shift = self.offsets.get(band) as f32 * step as f32;

            for x in (0..self.width).step_by(step) {
                stats.cells += 1;
                // Missing masks read as black: nothing revealed.
                let b = self.fade.sample_blended(&self.masks, x as u32, y as u32).unwrap_or(0.0);
                if b <= self.cfg.mask_cutoff {
                    continue;
                }
                if !self.gate.should_reveal(x as f32 + shift, y as f32, reveal) {
                    continue;
                }
                let bucket = self.bucket_for(y_norm);
                let ch = self.pools.next_char(bucket);
                glyph_coverage(&mut self.layer, ch, x as f32, y as f32, glyph_size);
                stats.glyphs += 1;
            }
        }
        stats
    }

    /// Blend the glyph layer over `screen` at mix × coverage, in linear light.
    fn composite(&self, screen: &mut FrameBuffer) {
        let mix = self.controls.mix;
        if mix <= 0.0 {
            return;
        }
        let glyph = Rgb::from(self.cfg.glyph_color);
        for (px, a) in screen.pixels.iter_mut().zip(&self.layer.alpha) {
            if *a <= 0.0 {
                continue;
            }
            let alpha = (a * mix).min(1.0);
            let bg = Rgb::unpack(*px);
            *px = Rgb(
                self.lut.mix_u8(bg.0, glyph.0, alpha),
                self.lut.mix_u8(bg.1, glyph.1, alpha),
                self.lut.mix_u8(bg.2, glyph.2, alpha),
            )
            .pack();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::NoModel;
    use image::{DynamicImage, GrayImage, Luma};

    fn config(w: usize, h: usize) -> Config {
        let mut c = Config::default();
        c.window.width = w;
        c.window.height = h;
        c.controls.reveal = 1.0;
        c
    }

    fn flat_masks(values: &[u8], w: usize, h: usize) -> MaskSet {
        let imgs = values
            .iter()
            .map(|v| DynamicImage::ImageLuma8(GrayImage::from_pixel(w as u32, h as u32, Luma([*v]))))
            .collect();
        MaskSet::load(imgs, w as u32, h as u32)
    }

    fn mosaic(values: &[u8], w: usize, h: usize) -> Mosaic {
        let cfg = config(w, h);
        Mosaic::new(&cfg, flat_masks(values, w, h), Classifier::new(Box::new(NoModel), 0.70, 0.40))
    }

    #[test]
    fn map_range_clamps() {
        assert_eq!(map_range(0.0, 0.0, 4095.0, 0.25, 1.0), 0.25);
        assert_eq!(map_range(4095.0, 0.0, 4095.0, 0.25, 1.0), 1.0);
        assert_eq!(map_range(9000.0, 0.0, 4095.0, 0.8, 2.0), 2.0);
        assert_eq!(map_range(-5.0, 0.0, 4095.0, 0.8, 2.0), 0.8);
    }

    #[test]
    fn band_edges() {
        assert_eq!(band_for(0.0), Bucket::Positive);
        assert_eq!(band_for(0.40), Bucket::Neutral);
        assert_eq!(band_for(0.70), Bucket::Neutral);
        assert_eq!(band_for(0.71), Bucket::Negative);
    }

    #[test]
    fn empty_band_pool_falls_back_to_neutral() {
        let mut m = mosaic(&[255], 80, 80);
        assert_eq!(m.bucket_for(0.1), Bucket::Neutral);
        assert_eq!(m.bucket_for(0.9), Bucket::Neutral);
        m.submit_line("I love it");
        assert_eq!(m.bucket_for(0.1), Bucket::Positive);
        m.submit_line("so sad");
        assert_eq!(m.bucket_for(0.9), Bucket::Negative);
    }

    #[test]
    fn dark_mask_draws_nothing_and_keeps_cursors() {
        let mut m = mosaic(&[0], 64, 64);
        let mut fb = m.new_frame_buffer();
        let stats = m.render(&mut fb).unwrap();
        assert_eq!(stats.glyphs, 0);
        assert_eq!(stats.cells, 64);
        assert_eq!(m.pools().pool(Bucket::Neutral).cursor(), crate::pool::Cursor::default());
    }

    #[test]
    fn bright_mask_with_full_reveal_fills_every_cell() {
        let mut m = mosaic(&[255], 64, 64);
        let mut fb = m.new_frame_buffer();
        let stats = m.render(&mut fb).unwrap();
        assert_eq!(stats.glyphs, stats.cells);
    }

    #[test]
    fn zero_reveal_draws_nothing() {
        let mut m = mosaic(&[255], 64, 64);
        m.set_reveal_fraction(0.0);
        let mut fb = m.new_frame_buffer();
        assert_eq!(m.render(&mut fb).unwrap().glyphs, 0);
    }

    #[test]
    fn sensor_overrides_manual_controls() {
        let mut m = mosaic(&[255], 16, 16);
        assert_eq!(m.resolved(), (1.0, 1.0));
        m.set_sensor_reading(4095.0);
        assert_eq!(m.resolved(), (1.0, 2.0));
        m.set_sensor_reading(f32::NAN);
        assert_eq!(m.resolved(), (1.0, 2.0));
        m.set_sensor_reading(0.0);
        assert_eq!(m.resolved(), (0.25, 0.8));
    }

    #[test]
    fn control_setters_clamp() {
        let mut m = mosaic(&[255], 16, 16);
        m.set_zoom(10.0);
        m.set_mix_opacity(-1.0);
        m.set_reveal_fraction(f32::INFINITY);
        let c = m.controls();
        assert_eq!(c.zoom, 2.2);
        assert_eq!(c.mix, 0.0);
        assert_eq!(c.reveal, 1.0);
    }

    #[test]
    fn inverted_zoom_limits_still_clamp() {
        let cfg = Config::from_json(r#"{"controls": {"zoom_min": 3.0, "zoom_max": 1.0}}"#).unwrap();
        let mut m = Mosaic::new(&cfg, flat_masks(&[255], 16, 16), Classifier::new(Box::new(NoModel), 0.70, 0.40));
        m.set_zoom(1.5);
        assert_eq!(m.controls().zoom, 1.5);
        m.set_zoom(10.0);
        assert_eq!(m.controls().zoom, 3.0);
        m.set_zoom(0.2);
        assert_eq!(m.controls().zoom, 1.0);
    }

    #[test]
    fn keyword_classified_line_jumps_its_band() {
        let mut m = mosaic(&[255], 16, 16);
        m.submit_line("so tired today");
        assert_eq!(m.offsets().get(Bucket::Negative), SUBMIT_JUMP);
        assert_eq!(m.offsets().get(Bucket::Positive), 0);
        assert_eq!(m.offsets().get(Bucket::Neutral), 0);
        m.submit_line("tired again");
        assert_eq!(m.offsets().get(Bucket::Negative), 2 * SUBMIT_JUMP);
    }

    #[test]
    fn model_scored_line_does_not_jump() {
        let cfg = config(16, 16);
        let mut m = Mosaic::from_config(&cfg, flat_masks(&[255], 16, 16));
        let class = m.submit_line("what a lovely wonderful day").unwrap();
        assert!(matches!(class.source, Source::Model { .. }));
        assert_eq!(m.offsets(), ScrollOffsets::default());
    }

    #[test]
    fn advance_resets_offsets_and_highlight() {
        let mut m = mosaic(&[255, 0], 16, 16);
        let mut fb = m.new_frame_buffer();
        for _ in 0..30 {
            m.render(&mut fb);
        }
        assert_eq!(m.offsets().get(Bucket::Neutral), 1);
        m.submit_line("hello");
        assert!(m.highlight().is_active());

        assert!(m.advance_mask());
        assert_eq!(m.offsets(), ScrollOffsets::default());
        assert!(!m.highlight().is_active());
        assert!(!m.advance_mask());
    }

    #[test]
    fn plant_uses_draft_then_seed_lines() {
        let mut m = mosaic(&[255], 16, 16);
        for ch in "I love it".chars() {
            m.push_draft(ch);
        }
        m.pop_draft();
        m.push_draft('t');
        let c = m.plant().unwrap();
        assert_eq!(c.bucket, Bucket::Positive);
        assert_eq!(m.draft(), "");
        assert_eq!(m.highlight().text, "I love it");

        let neutral_before = m.pools().len(Bucket::Neutral);
        m.plant();
        assert_eq!(m.pools().len(Bucket::Neutral), neutral_before + 1);
    }

    #[test]
    fn mix_zero_leaves_background() {
        let mut m = mosaic(&[255], 32, 32);
        m.set_mix_opacity(0.0);
        let mut fb = m.new_frame_buffer();
        m.render(&mut fb);
        assert_eq!(fb, m.background);
    }
}
