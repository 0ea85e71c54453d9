//! Grid mask extraction from a grayscale photo.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::primitives::{adaptive_threshold_mean, dilate_plus, invert};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Parameters of [`preprocess_grid_mask`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Median filter radius; `1` is a 3×3 window.
    pub median_radius: u32,
    /// Side of the adaptive threshold window.
    pub block_size: u32,
    /// Offset subtracted from the local mean.
    pub c: i32,
    /// Plus-element dilations applied to the inverted mask.
    pub dilate_iterations: u8,
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            median_radius: 1,
            block_size: 5,
            c: 2,
            dilate_iterations: 1,
        }
    }
}

/// Turn dark ink on a light background into a white-on-black mask.
///
/// Median blur, adaptive mean threshold, invert, then dilate so thin or
/// broken grid strokes join up.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(gray, params), fields(w = gray.width(), h = gray.height())))]
pub fn preprocess_grid_mask(gray: &GrayImage, params: &PreprocessParams) -> GrayImage {
    let blurred = if params.median_radius > 0 {
        imageproc::filter::median_filter(gray, params.median_radius, params.median_radius)
    } else {
        gray.clone()
    };
    let binary = adaptive_threshold_mean(&blurred, params.block_size, params.c);
    dilate_plus(&invert(&binary), params.dilate_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn dark_stroke_becomes_a_white_band() {
        let mut gray = GrayImage::from_pixel(40, 40, Luma([230]));
        for y in 0..40 {
            for x in 18..22 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        let mask = preprocess_grid_mask(&gray, &PreprocessParams::default());
        // 4 px stroke plus one dilation on each side.
        for x in 17..23 {
            assert_eq!(mask.get_pixel(x, 20).0[0], 255, "x={x}");
        }
        assert_eq!(mask.get_pixel(15, 20).0[0], 0);
        assert_eq!(mask.get_pixel(5, 5).0[0], 0);
    }

    #[test]
    fn black_image_gives_empty_mask() {
        let gray = GrayImage::new(32, 32);
        let mask = preprocess_grid_mask(&gray, &PreprocessParams::default());
        assert!(mask.pixels().all(|p| p.0[0] == 0));
    }
}
