//! Standard Hough transform for straight lines on a binary mask.
//!
//! Resolution is fixed at 1 px in `rho` and 1° in `theta`, `theta ∈ [0°, 180°)`.
//! Peaks are local maxima of the accumulator inside a `rho × theta` window;
//! the window wraps across `theta = 180°`, where `(rho, θ)` continues as
//! `(-rho, θ - 180°)`. A thick stroke votes equally for a small plateau of
//! bins, so each peak is reported at the centroid of its plateau.

use std::collections::HashSet;
use std::f64::consts::PI;

use image::GrayImage;
use serde::{Deserialize, Serialize};
use tictactoe_core::PolarLine;

const THETA_BINS: usize = 180;

/// Parameters of the line detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughLineParams {
    /// Minimum accumulator votes for a line.
    pub vote_threshold: u32,
    /// Half-width of the suppression window along `rho`, in pixels.
    pub nms_rho: usize,
    /// Half-width of the suppression window along `theta`, in degrees.
    pub nms_theta_deg: usize,
    /// Keep at most this many lines (strongest first).
    pub max_lines: Option<usize>,
}

impl Default for HoughLineParams {
    fn default() -> Self {
        Self {
            vote_threshold: 200,
            nms_rho: 10,
            nms_theta_deg: 5,
            max_lines: None,
        }
    }
}

/// A detected line and its accumulator support.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoughLine {
    pub line: PolarLine,
    pub votes: u32,
}

struct Accumulator {
    data: Vec<u32>,
    rho_bins: usize,
    max_rho: isize,
}

impl Accumulator {
    fn new(width: u32, height: u32) -> Self {
        let diag = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
        let max_rho = diag.ceil() as isize;
        let rho_bins = 2 * max_rho as usize + 1;
        Self {
            data: vec![0; rho_bins * THETA_BINS],
            rho_bins,
            max_rho,
        }
    }

    #[inline]
    fn index(&self, theta: usize, rho_idx: usize) -> usize {
        theta * self.rho_bins + rho_idx
    }

    /// Votes at `(theta + dt, rho_idx + dr)`, continuing across the 180° seam.
    fn wrapped(&self, theta: usize, rho_idx: usize, dt: isize, dr: isize) -> Option<(usize, u32)> {
        let mut t = theta as isize + dt;
        let mut r = rho_idx as isize + dr;
        if t < 0 || t >= THETA_BINS as isize {
            t = t.rem_euclid(THETA_BINS as isize);
            // rho index of -rho
            r = 2 * self.max_rho - r;
        }
        if r < 0 || r >= self.rho_bins as isize {
            return None;
        }
        let idx = self.index(t as usize, r as usize);
        Some((idx, self.data[idx]))
    }

    /// Mean `(dt, dr)` offset of the 8-connected bins around `(theta, rho_idx)`
    /// holding exactly `votes`, searched within `±reach_t × ±reach_r`.
    fn plateau_centroid(
        &self,
        theta: usize,
        rho_idx: usize,
        votes: u32,
        reach_t: isize,
        reach_r: isize,
    ) -> (f64, f64) {
        let mut seen = HashSet::from([(0isize, 0isize)]);
        let mut stack = vec![(0isize, 0isize)];
        let (mut sum_t, mut sum_r) = (0isize, 0isize);

        while let Some((dt, dr)) = stack.pop() {
            sum_t += dt;
            sum_r += dr;
            for (nt, nr) in (-1..=1).flat_map(|a| (-1..=1).map(move |b| (dt + a, dr + b))) {
                if nt.abs() > reach_t || nr.abs() > reach_r || seen.contains(&(nt, nr)) {
                    continue;
                }
                if self
                    .wrapped(theta, rho_idx, nt, nr)
                    .is_some_and(|(_, v)| v == votes)
                {
                    seen.insert((nt, nr));
                    stack.push((nt, nr));
                }
            }
        }

        let n = seen.len() as f64;
        (sum_t as f64 / n, sum_r as f64 / n)
    }
}

/// Line at fractional bin position `(theta_deg, rho)`, folded back into
/// `theta ∈ [0°, 180°)`.
fn folded_line(theta_deg: f64, rho: f64) -> PolarLine {
    let (theta_deg, rho) = if theta_deg < 0.0 {
        (theta_deg + 180.0, -rho)
    } else if theta_deg >= THETA_BINS as f64 {
        (theta_deg - 180.0, -rho)
    } else {
        (theta_deg, rho)
    };
    PolarLine::new(rho as f32, (theta_deg * PI / 180.0) as f32)
}

/// Detect straight lines on the white pixels (≥ 128) of `mask`.
///
/// Returned lines are sorted by votes, strongest first; equal votes keep the
/// accumulator scan order (`theta`, then `rho`).
pub fn detect_lines(mask: &GrayImage, params: &HoughLineParams) -> Vec<HoughLine> {
    let (w, h) = mask.dimensions();
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let mut acc = Accumulator::new(w, h);
    let trig: Vec<(f64, f64)> = (0..THETA_BINS)
        .map(|t| (t as f64 * PI / 180.0).sin_cos())
        .collect();

    for (x, y, p) in mask.enumerate_pixels() {
        if p.0[0] < 128 {
            continue;
        }
        for (t, &(sin_t, cos_t)) in trig.iter().enumerate() {
            let rho = x as f64 * cos_t + y as f64 * sin_t;
            let r = rho.round() as isize + acc.max_rho;
            let idx = acc.index(t, r as usize);
            acc.data[idx] += 1;
        }
    }

    let nms_t = params.nms_theta_deg as isize;
    let nms_r = params.nms_rho as isize;
    let threshold = params.vote_threshold.max(1);
    let mut peaks = Vec::new();

    for t in 0..THETA_BINS {
        for r in 0..acc.rho_bins {
            let idx = acc.index(t, r);
            let votes = acc.data[idx];
            if votes < threshold {
                continue;
            }

            // Strict total order on (votes, earlier index) keeps exactly one
            // peak per plateau; its position is then moved to the centroid.
            let mut is_max = true;
            'window: for dt in -nms_t..=nms_t {
                for dr in -nms_r..=nms_r {
                    if dt == 0 && dr == 0 {
                        continue;
                    }
                    if let Some((other_idx, other)) = acc.wrapped(t, r, dt, dr) {
                        if other > votes || (other == votes && other_idx < idx) {
                            is_max = false;
                            break 'window;
                        }
                    }
                }
            }

            if is_max {
                let (dt, dr) = acc.plateau_centroid(t, r, votes, nms_t, nms_r);
                let rho = (r as isize - acc.max_rho) as f64 + dr;
                peaks.push(HoughLine {
                    line: folded_line(t as f64 + dt, rho),
                    votes,
                });
            }
        }
    }

    peaks.sort_by(|a, b| b.votes.cmp(&a.votes));
    if let Some(max_lines) = params.max_lines {
        peaks.truncate(max_lines);
    }
    peaks
}
