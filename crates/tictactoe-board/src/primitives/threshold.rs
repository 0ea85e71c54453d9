//! Global and adaptive thresholding.
//!
//! All functions return a new 0/255 image; `v > t` maps to white.

use image::{GrayImage, Luma};

/// Otsu threshold level of an 8-bit image.
///
/// A uniform image yields a level just below its single value, so
/// thresholding keeps it unchanged. Images with at most two distinct
/// intensities split at the midpoint.
pub fn otsu_level(img: &GrayImage) -> u8 {
    let samples = img.as_raw();
    if samples.is_empty() {
        return 127;
    }

    let mut min_v = 255u8;
    let mut max_v = 0u8;
    for &v in samples {
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v == max_v {
        return min_v.saturating_sub(1);
    }

    let mut hist = [0u32; 256];
    for &v in samples {
        hist[v as usize] += 1;
    }
    let nonzero_bins = hist.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return ((min_v as u16 + max_v as u16) / 2) as u8;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = hist
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_b = 0f64;
    let mut w_b = 0f64;
    let mut best_var = -1f64;
    let mut best_t = 127u8;

    for (t, &h) in hist.iter().enumerate() {
        w_b += h as f64;
        if w_b < 1.0 {
            continue;
        }
        let w_f = total - w_b;
        if w_f < 1.0 {
            break;
        }

        sum_b += t as f64 * h as f64;
        let m_b = sum_b / w_b;
        let m_f = (sum_total - sum_b) / w_f;

        let var_between = w_b * w_f * (m_b - m_f) * (m_b - m_f);
        if var_between > best_var {
            best_var = var_between;
            best_t = t as u8;
        }
    }

    best_t
}

/// Pixels strictly above `level` become 255, the rest 0.
pub fn threshold_binary(img: &GrayImage, level: u8) -> GrayImage {
    let mut out = img.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] > level { 255 } else { 0 };
    }
    out
}

/// Binarize with the image's own Otsu level.
pub fn threshold_otsu(img: &GrayImage) -> GrayImage {
    threshold_binary(img, otsu_level(img))
}

/// Adaptive mean threshold.
///
/// Each pixel is compared against the mean of the `block_size × block_size`
/// window centred on it (clamped to the image) minus `c`; pixels strictly
/// above that local level become 255. `block_size` is rounded up to the next
/// odd value.
pub fn adaptive_threshold_mean(img: &GrayImage, block_size: u32, c: i32) -> GrayImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return img.clone();
    }
    let radius = (block_size.max(1) | 1) / 2;

    // Summed-area table with a zero row and column in front.
    let stride = w as usize + 1;
    let mut integral = vec![0u64; stride * (h as usize + 1)];
    for y in 0..h as usize {
        let mut row_sum = 0u64;
        for x in 0..w as usize {
            row_sum += img.get_pixel(x as u32, y as u32).0[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    GrayImage::from_fn(w, h, |x, y| {
        let x0 = x.saturating_sub(radius) as usize;
        let y0 = y.saturating_sub(radius) as usize;
        let x1 = (x + radius).min(w - 1) as usize + 1;
        let y1 = (y + radius).min(h - 1) as usize + 1;
        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        let level = (sum as f64 / count).round() as i32 - c;
        let v = img.get_pixel(x, y).0[0] as i32;
        Luma([if v > level { 255 } else { 0 }])
    })
}

/// Photometric negative.
pub fn invert(img: &GrayImage) -> GrayImage {
    let mut out = img.clone();
    image::imageops::invert(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otsu_separates_two_clusters() {
        let mut img = GrayImage::new(20, 1);
        for (i, p) in img.pixels_mut().enumerate() {
            p.0[0] = if i < 10 { 20 + i as u8 } else { 200 + i as u8 };
        }
        let t = otsu_level(&img);
        assert!((29..210).contains(&t), "level {t}");
        let bin = threshold_otsu(&img);
        assert_eq!(bin.get_pixel(0, 0).0[0], 0);
        assert_eq!(bin.get_pixel(19, 0).0[0], 255);
    }

    #[test]
    fn uniform_image_survives_otsu() {
        let white = GrayImage::from_pixel(8, 8, Luma([255]));
        assert_eq!(threshold_otsu(&white), white);
        let black = GrayImage::new(8, 8);
        assert_eq!(threshold_otsu(&black), black);
    }

    #[test]
    fn adaptive_threshold_marks_thin_dark_lines() {
        let mut img = GrayImage::from_pixel(30, 30, Luma([255]));
        for y in 0..30 {
            for x in 12..16 {
                img.put_pixel(x, y, Luma([0]));
            }
        }
        let bin = adaptive_threshold_mean(&img, 5, 2);
        assert_eq!(bin.get_pixel(13, 10).0[0], 0);
        assert_eq!(bin.get_pixel(11, 10).0[0], 255);
        assert_eq!(bin.get_pixel(2, 10).0[0], 255);
    }

    #[test]
    fn flat_black_image_is_white_after_adaptive_threshold() {
        let img = GrayImage::new(10, 10);
        let bin = adaptive_threshold_mean(&img, 5, 2);
        assert!(bin.pixels().all(|p| p.0[0] == 255));
        assert!(invert(&bin).pixels().all(|p| p.0[0] == 0));
    }
}
