// Configuration for the mosaic.
//
// Every section deserializes from JSON with per-field defaults, so a config file
// only needs the values it changes. With no file at all, `Config::default`
// gives the stock 1000x700 garden installation.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

use crate::classify::ModelKind;
use crate::error::Error;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub mosaic: MosaicConfig,
    pub controls: ControlsConfig,
    pub sensor: SensorConfig,
    pub fade: FadeConfig,
    pub pools: PoolsConfig,
    pub highlight: HighlightConfig,
    pub classifier: ClassifierConfig,
    pub reveal_gate: RevealGateConfig,
    /// Mask images, in display order.
    pub masks: MaskList,
    /// Seed for pool overwrites, seed-line picks and highlight placement.
    pub seed: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct MaskList(pub Vec<PathBuf>);

impl Default for MaskList {
    fn default() -> Self {
        MaskList((1..=4).map(|i| PathBuf::from(format!("GardenMask_{i}.png"))).collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub fps: usize,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 1000, height: 700, fps: 30, title: "Text Mosaic".to_string() }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Grid pitch in pixels.
    pub cell_size: usize,
    /// Cells whose blended brightness is at or below this stay empty (0..=255).
    pub mask_cutoff: f32,
    /// Glyph size as a fraction of the cell, before zoom.
    pub glyph_scale: f32,
    pub glyph_color: [u8; 3],
    pub background_top: [u8; 3],
    pub background_bottom: [u8; 3],
    /// Frames between scroll offset steps.
    pub scroll_every_frames: u64,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        MosaicConfig {
            cell_size: 8,
            mask_cutoff: 148.0,
            glyph_scale: 0.92,
            glyph_color: [240, 240, 240],
            background_top: [9, 28, 32],
            background_bottom: [22, 60, 66],
            scroll_every_frames: 30,
        }
    }
}

/// Manual control values and their limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub mix: f32,
    pub zoom: f32,
    pub reveal: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    /// Increment for keyboard nudges.
    pub step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        ControlsConfig { mix: 0.8, zoom: 1.0, reveal: 0.75, zoom_min: 0.6, zoom_max: 2.2, step: 0.05 }
    }
}

/// How a raw sensor reading maps onto zoom and reveal.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    pub raw_min: f32,
    pub raw_max: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
    pub reveal_min: f32,
    pub reveal_max: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        SensorConfig { raw_min: 0.0, raw_max: 4095.0, zoom_min: 0.8, zoom_max: 2.0, reveal_min: 0.25, reveal_max: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    /// Frames for a full cross-fade.
    pub frames: u32,
}

impl Default for FadeConfig {
    fn default() -> Self {
        FadeConfig { frames: 25 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PoolsConfig {
    pub max_lines: usize,
    /// Lines the neutral pool starts with; also what `PLANT` picks from when the draft is empty.
    pub seed_lines: Vec<String>,
}

impl Default for PoolsConfig {
    fn default() -> Self {
        PoolsConfig {
            max_lines: 80,
            seed_lines: ["plant a garden", "What do you want to say?", "Type a thought", "Watch it Grow"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub ttl_frames: u32,
    pub decay: f32,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        HighlightConfig { ttl_frames: 120, decay: 0.93 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub model: ModelKind,
    pub positive_above: f32,
    pub negative_below: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig { model: ModelKind::Lexicon, positive_above: 0.70, negative_below: 0.40 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RevealGateConfig {
    pub scale: f32,
    pub salt: f32,
    pub seed: u32,
}

impl Default for RevealGateConfig {
    fn default() -> Self {
        RevealGateConfig { scale: 0.03, salt: 7.77, seed: 0 }
    }
}

impl Config {
    pub fn from_json(text: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let Some(path) = path else {
            info!("no config file given, using defaults");
            return Ok(Config::default());
        };
        let text = fs::read_to_string(path).map_err(|source| Error::Config { path: path.to_path_buf(), source })?;
        let config = Self::from_json(&text)?;
        info!("configuration loaded from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let c = Config::from_json("{}").unwrap();
        assert_eq!(c.window.width, 1000);
        assert_eq!(c.window.height, 700);
        assert_eq!(c.pools.max_lines, 80);
        assert_eq!(c.pools.seed_lines.len(), 4);
        assert_eq!(c.masks.0.len(), 4);
        assert_eq!(c.fade.frames, 25);
        assert_eq!(c.classifier.model, ModelKind::Lexicon);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = Config::from_json(r#"{"mosaic": {"cell_size": 12}, "classifier": {"model": "none"}, "masks": ["a.png"]}"#)
            .unwrap();
        assert_eq!(c.mosaic.cell_size, 12);
        assert_eq!(c.mosaic.mask_cutoff, 148.0);
        assert_eq!(c.classifier.model, ModelKind::None);
        assert_eq!(c.classifier.positive_above, 0.70);
        assert_eq!(c.masks.0, vec![PathBuf::from("a.png")]);
    }

    #[test]
    fn bad_json_is_an_error() {
        assert!(matches!(Config::from_json("{ nope"), Err(Error::ConfigParse(_))));
    }

    #[test_log::test]
    fn missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/mosaic.json"))).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
