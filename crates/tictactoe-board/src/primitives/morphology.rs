//! Binary morphology with the 3×3 plus-shaped structuring element.
//!
//! `n` applications of the plus element equal a single pass with an L1 ball
//! of radius `n`, which is what `imageproc` computes.

use image::GrayImage;
use imageproc::distance_transform::Norm;

/// Erode `iterations` times; zero iterations returns a copy.
pub fn erode_plus(img: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return img.clone();
    }
    imageproc::morphology::erode(img, Norm::L1, iterations)
}

/// Dilate `iterations` times; zero iterations returns a copy.
pub fn dilate_plus(img: &GrayImage, iterations: u8) -> GrayImage {
    if iterations == 0 {
        return img.clone();
    }
    imageproc::morphology::dilate(img, Norm::L1, iterations)
}
