//! Hough gradient circle detector.
//!
//! Edge pixels (Canny) vote along their gradient direction, both ways, for
//! every radius in range. Votes are deposited bilinearly and summed over a
//! 3×3 neighbourhood, so a centre collects the votes of its whole boundary
//! even when the gradient directions are slightly off. Each accepted centre
//! gets the radius whose band of edge pixels is densest relative to its
//! circumference, and is kept only if that band covers enough of it.

use std::f32::consts::TAU;

use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::gradients::{horizontal_scharr, vertical_scharr};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Parameters of the circle detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughCircleParams {
    /// Minimum distance between circle centres; `None` uses `rows / 16`.
    pub min_dist: Option<f32>,
    /// Upper Canny threshold; the lower one is half of it.
    pub canny_high: f32,
    /// Minimum centre votes and minimum edge support of the radius.
    pub acc_threshold: u32,
    pub min_radius: u32,
    /// `0` means unbounded (the larger image dimension).
    pub max_radius: u32,
    /// Gaussian smoothing applied before computing gradient directions.
    pub gradient_sigma: f32,
    /// Minimum edge support of the radius band relative to `2πr`.
    pub min_coverage: f32,
}

impl Default for HoughCircleParams {
    fn default() -> Self {
        Self {
            min_dist: None,
            canny_high: 120.0,
            acc_threshold: 55,
            min_radius: 0,
            max_radius: 0,
            gradient_sigma: 1.5,
            min_coverage: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point2<f32>,
    pub radius: f32,
    /// Centre votes in the 3×3 summed accumulator.
    pub votes: f32,
}

#[inline]
fn bilinear_add(accum: &mut [f32], stride: usize, x: f32, y: f32) {
    let x0 = x as usize;
    let y0 = y as usize;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;
    let base = y0 * stride + x0;
    accum[base] += (1.0 - fx) * (1.0 - fy);
    accum[base + 1] += fx * (1.0 - fy);
    accum[base + stride] += (1.0 - fx) * fy;
    accum[base + stride + 1] += fx * fy;
}

fn box_sum_3x3(accum: &[f32], w: usize, h: usize) -> Vec<f32> {
    let mut out = vec![0.0f32; w * h];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let mut s = 0.0;
            for yy in y - 1..=y + 1 {
                let row = yy * w;
                s += accum[row + x - 1] + accum[row + x] + accum[row + x + 1];
            }
            out[y * w + x] = s;
        }
    }
    out
}

/// Radius whose ±1 px band is densest in edge pixels per unit of
/// circumference, and the number of edge pixels in that band.
fn best_radius(
    edge_points: &[(f32, f32)],
    center: (f32, f32),
    min_r: u32,
    max_r: u32,
) -> (u32, u32) {
    let mut hist = vec![0u32; max_r as usize + 2];
    for &(x, y) in edge_points {
        let d = ((x - center.0).powi(2) + (y - center.1).powi(2)).sqrt().round() as u32;
        if d >= min_r && d <= max_r {
            hist[d as usize] += 1;
        }
    }

    let mut best = (min_r, 0u32, 0.0f32);
    for d in min_r..=max_r {
        let i = d as usize;
        let support = hist[i - 1] + hist[i] + hist[i + 1];
        let density = support as f32 / (TAU * d as f32);
        if density > best.2 {
            best = (d, support, density);
        }
    }
    (best.0, best.1)
}

/// Detect circles in `img`. Results are sorted by centre votes, strongest
/// first.
pub fn detect_circles(img: &GrayImage, params: &HoughCircleParams) -> Vec<Circle> {
    let (w, h) = img.dimensions();
    if w < 3 || h < 3 {
        return Vec::new();
    }
    let min_r = params.min_radius.max(1);
    let max_r = if params.max_radius == 0 {
        w.max(h)
    } else {
        params.max_radius
    };
    if min_r > max_r {
        return Vec::new();
    }

    let edges = canny(img, params.canny_high * 0.5, params.canny_high);
    let smoothed = if params.gradient_sigma > 0.0 {
        gaussian_blur_f32(img, params.gradient_sigma)
    } else {
        img.clone()
    };
    let gx = horizontal_scharr(&smoothed);
    let gy = vertical_scharr(&smoothed);

    let stride = w as usize;
    let x_limit = (w - 1) as f32;
    let y_limit = (h - 1) as f32;
    let mut accum = vec![0.0f32; stride * h as usize];
    let mut edge_points = Vec::new();

    for (x, y, p) in edges.enumerate_pixels() {
        if p.0[0] == 0 {
            continue;
        }
        let (xf, yf) = (x as f32, y as f32);
        edge_points.push((xf, yf));

        let gxv = gx.get_pixel(x, y).0[0] as f32;
        let gyv = gy.get_pixel(x, y).0[0] as f32;
        let mag = (gxv * gxv + gyv * gyv).sqrt();
        if mag < 1e-3 {
            continue;
        }
        let (dx, dy) = (gxv / mag, gyv / mag);

        for sign in [1.0f32, -1.0] {
            for r in min_r..=max_r {
                let vx = xf + sign * dx * r as f32;
                let vy = yf + sign * dy * r as f32;
                // The ray only moves further out from here.
                if vx < 0.0 || vx >= x_limit || vy < 0.0 || vy >= y_limit {
                    break;
                }
                bilinear_add(&mut accum, stride, vx, vy);
            }
        }
    }

    let support = box_sum_3x3(&accum, stride, h as usize);
    let threshold = params.acc_threshold as f32;

    let mut centers = Vec::new();
    for y in 1..h as usize - 1 {
        for x in 1..stride - 1 {
            let idx = y * stride + x;
            let v = support[idx];
            if v >= threshold
                && v > support[idx - 1]
                && v > support[idx - stride]
                && v >= support[idx + 1]
                && v >= support[idx + stride]
            {
                centers.push((x as f32, y as f32, v));
            }
        }
    }
    centers.sort_by(|a, b| b.2.total_cmp(&a.2));

    let min_dist = params.min_dist.unwrap_or(h as f32 / 16.0).max(1.0);
    let min_dist_sq = min_dist * min_dist;
    let mut circles: Vec<Circle> = Vec::new();

    for (cx, cy, votes) in centers {
        let too_close = circles.iter().any(|c| {
            let dx = c.center.x - cx;
            let dy = c.center.y - cy;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }

        let (radius, edge_support) = best_radius(&edge_points, (cx, cy), min_r, max_r);
        let min_support = params.min_coverage * TAU * radius as f32;
        if edge_support < params.acc_threshold || (edge_support as f32) < min_support {
            continue;
        }
        circles.push(Circle {
            center: Point2::new(cx, cy),
            radius: radius as f32,
            votes,
        });
    }

    log::trace!(
        "hough circles: {} edge pixels, {} circles",
        edge_points.len(),
        circles.len()
    );
    circles
}
