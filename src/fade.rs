// Cross-fade between consecutive masks.
//
// The controller is either idle on one mask or fading from one mask to the next.
// While fading, brightness samples from both masks are blended with a smoothstep
// curve, and `progress` advances by a fixed step once per frame.

use crate::mask::MaskSet;

/// Smoothstep easing: `t²(3-2t)`, clamped to [0,1].
#[inline]
pub fn ease(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Blend two brightness samples at fade `progress`.
#[inline]
pub fn blend(from: f32, to: f32, progress: f32) -> f32 {
    from + (to - from) * ease(progress)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FadeState {
    Idle { active: usize },
    Fading { from: usize, to: usize, progress: f32 },
}

#[derive(Clone, Debug)]
pub struct FadeController {
    state: FadeState,
    step: f32,
}

impl FadeController {
    /// A controller idle on mask 0 that completes a fade in `frames` ticks.
    pub fn new(frames: u32) -> Self {
        Self { state: FadeState::Idle { active: 0 }, step: 1.0 / frames.max(1) as f32 }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.state, FadeState::Fading { .. })
    }

    /// The mask that is (or is becoming) current.
    pub fn active_index(&self) -> usize {
        match self.state {
            FadeState::Idle { active } => active,
            FadeState::Fading { to, .. } => to,
        }
    }

    /// Start fading to the next mask. Ignored while a fade is running or with no masks.
    /// Returns whether a fade started.
    pub fn advance(&mut self, mask_count: usize) -> bool {
        match self.state {
            FadeState::Idle { active } if mask_count > 0 => {
                self.state = FadeState::Fading { from: active, to: (active + 1) % mask_count, progress: 0.0 };
                true
            }
            _ => false,
        }
    }

    /// One frame of progress. Resolves to idle on the target once progress reaches 1.
    pub fn tick(&mut self) {
        if let FadeState::Fading { from, to, progress } = self.state {
            let progress = (progress + self.step).min(1.0);
            self.state = if progress >= 1.0 {
                FadeState::Idle { active: to }
            } else {
                FadeState::Fading { from, to, progress }
            };
        }
    }

    /// Blended brightness at (x,y). `None` when no mask has a sample there.
    pub fn sample_blended(&self, masks: &MaskSet, x: u32, y: u32) -> Option<f32> {
        match self.state {
            FadeState::Idle { active } => masks.sample_brightness(active, x, y).map(f32::from),
            FadeState::Fading { from, to, progress } => {
                let a = masks.sample_brightness(from, x, y);
                let b = masks.sample_brightness(to, x, y);
                match (a, b) {
                    (Some(a), Some(b)) => Some(blend(a as f32, b as f32, progress)),
                    (a, b) => a.or(b).map(f32::from),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};
    use proptest::prelude::*;

    fn masks(values: &[u8]) -> MaskSet {
        let imgs = values
            .iter()
            .map(|v| DynamicImage::ImageLuma8(GrayImage::from_pixel(2, 2, Luma([*v]))))
            .collect();
        MaskSet::load(imgs, 2, 2)
    }

    #[test]
    fn ease_fixed_points() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert_eq!(ease(0.5), 0.5);
    }

    #[test]
    fn blend_endpoints_are_exact() {
        assert_eq!(blend(40.0, 220.0, 0.0), 40.0);
        assert_eq!(blend(40.0, 220.0, 1.0), 220.0);
    }

    #[test_log::test]
    fn advance_runs_to_next_mask() {
        let set = masks(&[10, 250]);
        let mut fade = FadeController::new(25);
        assert!(fade.advance(set.len()));
        assert_eq!(fade.state(), FadeState::Fading { from: 0, to: 1, progress: 0.0 });
        assert_eq!(fade.sample_blended(&set, 0, 0), Some(10.0));

        let mut ticks = 0;
        while fade.is_fading() {
            fade.tick();
            ticks += 1;
            assert!(ticks <= 26);
        }
        assert_eq!(fade.state(), FadeState::Idle { active: 1 });
        assert_eq!(fade.sample_blended(&set, 1, 1), Some(250.0));
    }

    #[test]
    fn advance_is_not_reentrant() {
        let mut fade = FadeController::new(4);
        assert!(fade.advance(3));
        fade.tick();
        assert!(!fade.advance(3));
        assert_eq!(fade.state(), FadeState::Fading { from: 0, to: 1, progress: 0.25 });
    }

    #[test]
    fn wraps_to_first_mask() {
        let mut fade = FadeController::new(1);
        fade.advance(2);
        fade.tick();
        fade.advance(2);
        fade.tick();
        assert_eq!(fade.state(), FadeState::Idle { active: 0 });
    }

    #[test]
    fn no_masks_means_no_fade_and_no_sample() {
        let set = masks(&[]);
        let mut fade = FadeController::new(25);
        assert!(!fade.advance(set.len()));
        assert_eq!(fade.sample_blended(&set, 0, 0), None);
    }

    #[test]
    fn mid_fade_sits_between() {
        let set = masks(&[0, 200]);
        let mut fade = FadeController::new(2);
        fade.advance(2);
        fade.tick();
        assert_eq!(fade.sample_blended(&set, 0, 0), Some(100.0));
    }

    proptest! {
        #[test]
        fn ease_is_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease(lo) <= ease(hi) + 1e-6);
        }
    }
}
