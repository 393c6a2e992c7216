// Grayscale mask set. Each mask is resized to the render surface and converted
// to one channel at load time; after that it is only read.

use std::path::Path;

use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use log::{info, warn};

use crate::error::Error;

pub struct MaskSet {
    width: u32,
    height: u32,
    masks: Vec<GrayImage>,
}

/// Resize to `width`x`height` (skipped when already that size) and drop to grayscale.
pub fn conform(img: DynamicImage, width: u32, height: u32) -> GrayImage {
    let img = if img.width() != width || img.height() != height {
        img.resize_exact(width, height, FilterType::Triangle)
    } else {
        img
    };
    match img {
        DynamicImage::ImageLuma8(gray) => gray,
        other => other.to_luma8(),
    }
}

impl MaskSet {
    /// Preprocess already-decoded images for a `width`x`height` surface.
    pub fn load(images: Vec<DynamicImage>, width: u32, height: u32) -> Self {
        let masks = images.into_iter().map(|img| conform(img, width, height)).collect();
        Self { width, height, masks }
    }

    /// Decode and preprocess mask files. Files that fail are logged and skipped,
    /// so the set can come back empty.
    pub fn open<P: AsRef<Path>>(paths: &[P], width: u32, height: u32) -> Self {
        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            match open_image(path.as_ref()) {
                Ok(img) => images.push(img),
                Err(e) => warn!("{e}; skipping"),
            }
        }
        info!("loaded {} of {} masks at {}x{}", images.len(), paths.len(), width, height);
        Self::load(images, width, height)
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    pub fn mask(&self, index: usize) -> Option<&GrayImage> {
        self.masks.get(index)
    }

    /// Brightness 0..=255 at (x,y) in mask `index`; `None` if the index or point is out of range.
    #[inline]
    pub fn sample_brightness(&self, index: usize, x: u32, y: u32) -> Option<u8> {
        let mask = self.masks.get(index)?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(mask.get_pixel(x, y).0[0])
    }
}

fn open_image(path: &Path) -> Result<DynamicImage, Error> {
    image::open(path).map_err(|source| Error::MaskLoad { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn flat_rgb(w: u32, h: u32, c: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb(c)))
    }

    #[test]
    fn load_resizes_and_grays() {
        let set = MaskSet::load(vec![flat_rgb(3, 2, [200, 200, 200])], 10, 8);
        let m = set.mask(0).unwrap();
        assert_eq!(m.dimensions(), (10, 8));
        assert_eq!(set.sample_brightness(0, 9, 7), Some(200));
    }

    #[test]
    fn conforming_image_passes_through() {
        let mut gray = GrayImage::new(4, 4);
        gray.put_pixel(1, 2, Luma([77]));
        let out = conform(DynamicImage::ImageLuma8(gray.clone()), 4, 4);
        assert_eq!(out, gray);
        let again = conform(DynamicImage::ImageLuma8(out.clone()), 4, 4);
        assert_eq!(again, out);
    }

    #[test]
    fn out_of_range_is_unavailable() {
        let set = MaskSet::load(vec![flat_rgb(4, 4, [255, 255, 255])], 4, 4);
        assert_eq!(set.sample_brightness(1, 0, 0), None);
        assert_eq!(set.sample_brightness(0, 4, 0), None);
        assert_eq!(set.sample_brightness(0, 3, 3), Some(255));
    }

    #[test_log::test]
    fn missing_files_leave_empty_set() {
        let set = MaskSet::open(&["/nonexistent/mask_a.png", "/nonexistent/mask_b.png"], 8, 8);
        assert!(set.is_empty());
        assert_eq!(set.sample_brightness(0, 0, 0), None);
    }
}
