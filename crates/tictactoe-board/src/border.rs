//! Outer border selection and corner derivation.
//!
//! Near-horizontal lines (normal close to 90°) compete for the top and
//! bottom edges by `rho`; near-vertical lines (normal close to 0° or 180°)
//! compete for left and right by their x-intercept. Everything in between is
//! interior grid or noise and is ignored.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use tictactoe_core::{BoardCorners, EdgeRole, LineEquation, LineSlot, PolarLine};

use crate::detector::BoardNotFound;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How a near-vertical line is offered to the left and right slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// A line that raises the running right maximum is not considered for
    /// the left slot. The result depends on line order: with lines sorted
    /// left to right the left slot is never filled.
    #[default]
    Chained,
    /// Every line is tested against both slots.
    Independent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderParams {
    /// Half-width in degrees of the band around 90° holding top/bottom lines.
    pub horizontal_band_deg: f64,
    /// Half-width in degrees of the bands at 0° and 180° holding left/right
    /// lines.
    pub vertical_band_deg: f64,
    pub policy: SelectionPolicy,
    /// Edges whose intersection determinant is at most this are parallel.
    pub parallel_det_eps: f64,
}

impl Default for BorderParams {
    fn default() -> Self {
        Self {
            horizontal_band_deg: 10.0,
            vertical_band_deg: 10.0,
            policy: SelectionPolicy::Chained,
            parallel_det_eps: 1e-9,
        }
    }
}

/// The four lines bounding the board.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BorderLines {
    pub top: PolarLine,
    pub bottom: PolarLine,
    pub left: PolarLine,
    pub right: PolarLine,
}

impl BorderLines {
    pub fn get(&self, role: EdgeRole) -> PolarLine {
        match role {
            EdgeRole::Top => self.top,
            EdgeRole::Bottom => self.bottom,
            EdgeRole::Left => self.left,
            EdgeRole::Right => self.right,
        }
    }

    /// Intersect adjacent edges.
    ///
    /// Each edge is turned into general form through its two image-border
    /// points, so `width` and `height` must be those of the image the lines
    /// come from.
    pub fn corners(
        &self,
        width: f64,
        height: f64,
        det_eps: f64,
    ) -> Result<BoardCorners, BoardNotFound> {
        let equation = |role: EdgeRole| {
            let [p1, p2] = self.get(role).border_points(width, height);
            LineEquation::through(p1, p2)
        };
        let meet = |first: EdgeRole, second: EdgeRole| -> Result<Point2<f32>, BoardNotFound> {
            equation(first)
                .intersect(&equation(second), det_eps)
                .map(|p| Point2::new(p.x as f32, p.y as f32))
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .ok_or(BoardNotFound::ParallelEdges { first, second })
        };

        Ok(BoardCorners {
            top_left: meet(EdgeRole::Left, EdgeRole::Top)?,
            top_right: meet(EdgeRole::Right, EdgeRole::Top)?,
            bottom_right: meet(EdgeRole::Right, EdgeRole::Bottom)?,
            bottom_left: meet(EdgeRole::Left, EdgeRole::Bottom)?,
        })
    }
}

/// Running extremes while scanning the candidate lines.
#[derive(Default)]
struct EdgeCandidates {
    top: Option<PolarLine>,
    bottom: Option<PolarLine>,
    left: Option<(f64, PolarLine)>,
    right: Option<(f64, PolarLine)>,
}

impl EdgeCandidates {
    fn offer(mut self, line: PolarLine, params: &BorderParams) -> Self {
        let deg = line.theta_deg();
        if (deg - 90.0).abs() < params.horizontal_band_deg {
            if self.top.map_or(true, |top| line.rho < top.rho) {
                self.top = Some(line);
            }
            if self.bottom.map_or(true, |bottom| line.rho > bottom.rho) {
                self.bottom = Some(line);
            }
        } else if deg < params.vertical_band_deg || deg > 180.0 - params.vertical_band_deg {
            let x = line.x_intercept();
            let becomes_right = self.right.map_or(true, |(max_x, _)| x > max_x);
            if becomes_right {
                self.right = Some((x, line));
            }
            let left_allowed = params.policy == SelectionPolicy::Independent || !becomes_right;
            if left_allowed && self.left.map_or(true, |(min_x, _)| x <= min_x) {
                self.left = Some((x, line));
            }
        }
        self
    }

    fn finish(self) -> Result<BorderLines, BoardNotFound> {
        Ok(BorderLines {
            top: self.top.ok_or(BoardNotFound::MissingEdge(EdgeRole::Top))?,
            bottom: self
                .bottom
                .ok_or(BoardNotFound::MissingEdge(EdgeRole::Bottom))?,
            left: self
                .left
                .map(|(_, l)| l)
                .ok_or(BoardNotFound::MissingEdge(EdgeRole::Left))?,
            right: self
                .right
                .map(|(_, l)| l)
                .ok_or(BoardNotFound::MissingEdge(EdgeRole::Right))?,
        })
    }
}

/// Pick the outermost line for each edge role among the active slots.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(slots, params), fields(lines = slots.len())))]
pub fn select_border(
    slots: &[LineSlot],
    params: &BorderParams,
) -> Result<BorderLines, BoardNotFound> {
    let border = slots
        .iter()
        .filter_map(LineSlot::active)
        .fold(EdgeCandidates::default(), |acc, line| acc.offer(line, params))
        .finish()?;
    log::debug!("border lines: {border:?}");
    Ok(border)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    fn h(rho: f32) -> LineSlot {
        PolarLine::new(rho, FRAC_PI_2).into()
    }

    fn v(rho: f32) -> LineSlot {
        PolarLine::new(rho, 0.0).into()
    }

    #[test]
    fn picks_extreme_lines_of_a_grid() {
        let slots = vec![
            h(196.0),
            v(356.0),
            h(36.0),
            v(36.0),
            h(516.0),
            v(196.0),
            v(516.0),
            h(356.0),
        ];
        let border = select_border(&slots, &BorderParams::default()).expect("border");
        assert_eq!(border.top.rho, 36.0);
        assert_eq!(border.bottom.rho, 516.0);
        assert_eq!(border.left.rho, 36.0);
        assert_eq!(border.right.rho, 516.0);

        let c = border.corners(560.0, 560.0, 1e-9).expect("corners");
        for (p, (x, y)) in c
            .to_array()
            .into_iter()
            .zip([(36.0, 36.0), (516.0, 36.0), (516.0, 516.0), (36.0, 516.0)])
        {
            assert_abs_diff_eq!(p.x, x, epsilon = 1e-3);
            assert_abs_diff_eq!(p.y, y, epsilon = 1e-3);
        }
    }

    #[test]
    fn removed_and_diagonal_lines_are_ignored() {
        let slots = vec![
            LineSlot::Removed,
            h(10.0),
            h(90.0),
            PolarLine::new(5.0, 45f32.to_radians()).into(),
            v(80.0),
            v(20.0),
            LineSlot::Removed,
        ];
        let border = select_border(&slots, &BorderParams::default()).expect("border");
        assert_eq!(border.top.rho, 10.0);
        assert_eq!(border.left.rho, 20.0);
        assert_eq!(border.right.rho, 80.0);
    }

    #[test]
    fn lines_past_170_degrees_count_as_vertical() {
        // rho < 0 with theta near 180° still has a positive x-intercept.
        let slots = vec![
            h(10.0),
            h(90.0),
            v(80.0),
            PolarLine::new(-20.0, 178f32.to_radians()).into(),
        ];
        let border = select_border(&slots, &BorderParams::default()).expect("border");
        assert_abs_diff_eq!(border.left.x_intercept(), 20.0, epsilon = 0.1);
        assert_eq!(border.right.rho, 80.0);
    }

    #[test]
    fn missing_vertical_lines_are_reported() {
        let slots = vec![h(10.0), h(90.0)];
        assert_eq!(
            select_border(&slots, &BorderParams::default()),
            Err(BoardNotFound::MissingEdge(EdgeRole::Left))
        );
    }

    #[test]
    fn line_raising_the_right_edge_is_not_a_left_candidate() {
        // 20 becomes right, 80 replaces it; 50 is the first line that does
        // not raise the maximum.
        let slots = vec![h(10.0), h(90.0), v(20.0), v(80.0), v(50.0)];
        let border = select_border(&slots, &BorderParams::default()).expect("border");
        assert_eq!(border.left.rho, 50.0);
        assert_eq!(border.right.rho, 80.0);
    }

    #[test]
    fn default_policy_starves_left_on_sorted_input() {
        let slots = vec![h(10.0), h(90.0), v(20.0), v(50.0), v(80.0)];
        assert_eq!(BorderParams::default().policy, SelectionPolicy::Chained);
        assert_eq!(
            select_border(&slots, &BorderParams::default()),
            Err(BoardNotFound::MissingEdge(EdgeRole::Left))
        );

        let reversed = vec![h(10.0), h(90.0), v(80.0), v(50.0), v(20.0)];
        let border = select_border(&reversed, &BorderParams::default()).expect("border");
        assert_eq!(border.left.rho, 20.0);
        assert_eq!(border.right.rho, 80.0);
    }

    #[test]
    fn equal_intercepts_go_left_after_the_first() {
        let slots = vec![h(10.0), h(90.0), v(60.0), v(60.0)];
        let border = select_border(&slots, &BorderParams::default()).expect("border");
        assert_eq!(border.left.rho, 60.0);
        assert_eq!(border.right.rho, 60.0);
    }

    #[test]
    fn independent_policy_ignores_line_order() {
        let params = BorderParams {
            policy: SelectionPolicy::Independent,
            ..BorderParams::default()
        };
        let slots = vec![h(10.0), h(90.0), v(20.0), v(50.0), v(80.0)];
        let border = select_border(&slots, &params).expect("border");
        assert_eq!(border.left.rho, 20.0);
        assert_eq!(border.right.rho, 80.0);
    }

    #[test]
    fn tilted_corners_lie_on_both_lines() {
        let border = BorderLines {
            top: PolarLine::new(30.0, 92f32.to_radians()),
            bottom: PolarLine::new(400.0, 88f32.to_radians()),
            left: PolarLine::new(25.0, 3f32.to_radians()),
            right: PolarLine::new(-380.0, 176f32.to_radians()),
        };
        let c = border.corners(500.0, 500.0, 1e-9).expect("corners");
        let on = |p: Point2<f32>, l: PolarLine| {
            let (s, co) = (l.theta as f64).sin_cos();
            (p.x as f64 * co + p.y as f64 * s - l.rho as f64).abs()
        };
        assert!(on(c.top_left, border.left) < 1e-2);
        assert!(on(c.top_left, border.top) < 1e-2);
        assert!(on(c.bottom_right, border.right) < 1e-2);
        assert!(on(c.bottom_right, border.bottom) < 1e-2);
    }

    #[test]
    fn parallel_edges_are_rejected() {
        let line = PolarLine::new(30.0, FRAC_PI_2);
        let border = BorderLines {
            top: line,
            bottom: line,
            left: line,
            right: line,
        };
        assert_eq!(
            border.corners(100.0, 100.0, 1e-9),
            Err(BoardNotFound::ParallelEdges {
                first: EdgeRole::Left,
                second: EdgeRole::Top
            })
        );
    }
}
