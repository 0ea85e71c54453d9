//! Polar lines as returned by a Hough detector, and the two-point / general
//! forms used to intersect them.

use std::f64::consts::PI;
use std::fmt;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Line `x·cos(theta) + y·sin(theta) = rho`, `theta` in radians in `[0, π)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolarLine {
    pub rho: f32,
    pub theta: f32,
}

impl PolarLine {
    pub fn new(rho: f32, theta: f32) -> Self {
        Self { rho, theta }
    }

    #[inline]
    pub fn theta_deg(&self) -> f64 {
        (self.theta as f64).to_degrees()
    }

    /// True when the normal lies in the `(45°, 135°)` band, i.e. the line runs
    /// left-to-right and is best sampled where it meets `x = 0` and `x = width`.
    #[inline]
    pub fn crosses_side_borders(&self) -> bool {
        let t = self.theta as f64;
        t > PI * 45.0 / 180.0 && t < PI * 135.0 / 180.0
    }

    /// Two points on the line, taken on the image border pair it crosses.
    ///
    /// Lines that run left-to-right are sampled at `x = 0` and `x = width`,
    /// all others at `y = 0` and `y = height`.
    pub fn border_points(&self, width: f64, height: f64) -> [Point2<f64>; 2] {
        let rho = self.rho as f64;
        let (sin_t, cos_t) = (self.theta as f64).sin_cos();
        if self.crosses_side_borders() {
            [
                Point2::new(0.0, rho / sin_t),
                Point2::new(width, (rho - width * cos_t) / sin_t),
            ]
        } else {
            [
                Point2::new(rho / cos_t, 0.0),
                Point2::new((rho - height * sin_t) / cos_t, height),
            ]
        }
    }

    /// X coordinate where the line meets `y = 0`.
    #[inline]
    pub fn x_intercept(&self) -> f64 {
        self.rho as f64 / (self.theta as f64).cos()
    }
}

/// A detected line, or the hole left behind after it was merged into another.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineSlot {
    Active(PolarLine),
    Removed,
}

impl LineSlot {
    #[inline]
    pub fn active(&self) -> Option<PolarLine> {
        match self {
            LineSlot::Active(line) => Some(*line),
            LineSlot::Removed => None,
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, LineSlot::Active(_))
    }
}

impl From<PolarLine> for LineSlot {
    fn from(line: PolarLine) -> Self {
        LineSlot::Active(line)
    }
}

/// Line in general form `a·x + b·y = c`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl LineEquation {
    /// General form of the line through `p1` and `p2`.
    pub fn through(p1: Point2<f64>, p2: Point2<f64>) -> Self {
        let a = p2.y - p1.y;
        let b = p1.x - p2.x;
        let c = a * p1.x + b * p1.y;
        Self { a, b, c }
    }

    /// Intersection by Cramer's rule.
    ///
    /// Returns `None` when `|det| <= det_eps` (parallel or coincident lines) or
    /// when the result is not finite.
    pub fn intersect(&self, other: &LineEquation, det_eps: f64) -> Option<Point2<f64>> {
        let det = self.a * other.b - self.b * other.a;
        if !det.is_finite() || det.abs() <= det_eps {
            return None;
        }
        let x = (other.b * self.c - self.b * other.c) / det;
        let y = (self.a * other.c - other.a * self.c) / det;
        (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
    }
}

/// The four sides of the board outline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeRole {
    Top,
    Bottom,
    Left,
    Right,
}

impl EdgeRole {
    pub const ALL: [EdgeRole; 4] = [
        EdgeRole::Top,
        EdgeRole::Bottom,
        EdgeRole::Left,
        EdgeRole::Right,
    ];
}

impl fmt::Display for EdgeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeRole::Top => "top",
            EdgeRole::Bottom => "bottom",
            EdgeRole::Left => "left",
            EdgeRole::Right => "right",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn horizontal_line_is_sampled_on_side_borders() {
        let line = PolarLine::new(40.0, FRAC_PI_2);
        assert!(line.crosses_side_borders());
        let [p1, p2] = line.border_points(300.0, 200.0);
        assert_abs_diff_eq!(p1.x, 0.0);
        assert_abs_diff_eq!(p1.y, 40.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p2.x, 300.0);
        assert_abs_diff_eq!(p2.y, 40.0, epsilon = 1e-4);
    }

    #[test]
    fn vertical_line_is_sampled_on_top_and_bottom() {
        let line = PolarLine::new(25.0, 0.0);
        assert!(!line.crosses_side_borders());
        let [p1, p2] = line.border_points(300.0, 200.0);
        assert_abs_diff_eq!(p1.x, 25.0);
        assert_abs_diff_eq!(p1.y, 0.0);
        assert_abs_diff_eq!(p2.x, 25.0);
        assert_abs_diff_eq!(p2.y, 200.0);
        assert_abs_diff_eq!(line.x_intercept(), 25.0);
    }

    #[test]
    fn tilted_line_points_satisfy_the_polar_equation() {
        let line = PolarLine::new(-30.0, 2.9);
        for p in line.border_points(640.0, 480.0) {
            let lhs = p.x * (line.theta as f64).cos() + p.y * (line.theta as f64).sin();
            assert_abs_diff_eq!(lhs, line.rho as f64, epsilon = 1e-3);
        }
    }

    #[test]
    fn perpendicular_lines_intersect() {
        let vertical = LineEquation::through(Point2::new(10.0, 0.0), Point2::new(10.0, 100.0));
        let horizontal = LineEquation::through(Point2::new(0.0, 20.0), Point2::new(100.0, 20.0));
        let p = vertical.intersect(&horizontal, 1e-9).expect("intersection");
        assert_abs_diff_eq!(p.x, 10.0);
        assert_abs_diff_eq!(p.y, 20.0);
    }

    #[test]
    fn parallel_lines_do_not_intersect() {
        let a = LineEquation::through(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
        let b = LineEquation::through(Point2::new(0.0, 5.0), Point2::new(10.0, 15.0));
        assert!(a.intersect(&b, 1e-9).is_none());
        assert!(a.intersect(&a, 1e-9).is_none());
    }

    #[test]
    fn removed_slot_has_no_line() {
        let slot = LineSlot::from(PolarLine::new(1.0, 0.5));
        assert!(slot.is_active());
        assert_eq!(LineSlot::Removed.active(), None);
    }
}
