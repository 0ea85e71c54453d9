//! Merging of near-duplicate Hough lines.
//!
//! A thick stroke usually produces several detections a few pixels and
//! degrees apart. Two lines are merged when their parameters are close and
//! the points where they leave the image are close as well; the survivor
//! takes the mean of both and the other slot becomes [`LineSlot::Removed`].

use serde::{Deserialize, Serialize};
use tictactoe_core::{LineSlot, PolarLine};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closeness thresholds for merging two lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupParams {
    /// Maximum `|Δrho|`, exclusive, in pixels.
    pub max_rho_diff: f32,
    /// Maximum `|Δtheta|`, exclusive, in degrees.
    pub max_theta_diff_deg: f32,
    /// Maximum distance, exclusive, between corresponding border points.
    pub max_point_dist: f64,
}

impl Default for DedupParams {
    fn default() -> Self {
        Self {
            max_rho_diff: 20.0,
            max_theta_diff_deg: 10.0,
            max_point_dist: 64.0,
        }
    }
}

/// Line half-way between `a` and `b`. Symmetric in its arguments.
#[inline]
pub fn merge_pair(a: PolarLine, b: PolarLine) -> PolarLine {
    PolarLine::new((a.rho + b.rho) * 0.5, (a.theta + b.theta) * 0.5)
}

fn is_near(a: &PolarLine, b: &PolarLine, params: &DedupParams) -> bool {
    (a.rho - b.rho).abs() < params.max_rho_diff
        && (a.theta - b.theta).abs() < params.max_theta_diff_deg.to_radians()
}

/// Merge near-duplicate lines in place; returns the number of merges.
///
/// Single pass over ordered pairs `(a, b)` of distinct active slots. On a
/// match `a` is replaced by the merged line and `b` is removed; later
/// comparisons against `a` use its merged value. `width` and `height` are the
/// image size the lines were detected in.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(slots, params), fields(lines = slots.len())))]
pub fn dedup_lines(
    slots: &mut [LineSlot],
    width: f64,
    height: f64,
    params: &DedupParams,
) -> usize {
    let max_dist_sq = params.max_point_dist * params.max_point_dist;
    let mut merges = 0;

    for a in 0..slots.len() {
        for b in 0..slots.len() {
            if a == b {
                continue;
            }
            let (Some(la), Some(lb)) = (slots[a].active(), slots[b].active()) else {
                continue;
            };
            if !is_near(&la, &lb, params) {
                continue;
            }

            let [pa1, pa2] = la.border_points(width, height);
            let [pb1, pb2] = lb.border_points(width, height);
            if (pa1 - pb1).norm_squared() < max_dist_sq
                && (pa2 - pb2).norm_squared() < max_dist_sq
            {
                slots[a] = LineSlot::Active(merge_pair(la, lb));
                slots[b] = LineSlot::Removed;
                merges += 1;
            }
        }
    }

    log::debug!(
        "line dedup: {} merges, {} lines left",
        merges,
        slots.iter().filter(|s| s.is_active()).count()
    );
    merges
}
