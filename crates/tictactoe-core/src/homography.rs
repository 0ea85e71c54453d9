//! Planar homographies between a quadrilateral and a square, and the
//! perspective warp built on them.
//!
//! Four-point transforms are composed from two closed-form unit-square maps,
//! `H = Q_dst · Q_src⁻¹`, where `Q` sends `(0,0), (1,0), (1,1), (0,1)` to the
//! four quad corners in order.

use nalgebra::{Matrix3, Point2, Vector3};
use serde::{Deserialize, Serialize};

use crate::{sample_bilinear_u8, GrayImage, GrayImageView};

/// Determinants at or below this (after scaling `h33` to 1) are singular.
const SINGULAR_DET: f64 = 1e-12;

/// Planar projective transform, `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Row-major matrix entries.
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        std::array::from_fn(|r| std::array::from_fn(|c| self.h[(r, c)]))
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let q = self.apply_f64(p.x as f64, p.y as f64);
        Point2::new(q.x as f32, q.y as f32)
    }

    #[inline]
    fn apply_f64(&self, x: f64, y: f64) -> Point2<f64> {
        let v = self.h * Vector3::new(x, y, 1.0);
        Point2::new(v.x / v.z, v.y / v.z)
    }

    pub fn inverse(&self) -> Option<Self> {
        if is_singular(&self.h) {
            return None;
        }
        self.h.try_inverse().and_then(normalized)
    }

    /// Map sending the unit square corners `(0,0), (1,0), (1,1), (0,1)` to
    /// `quad` in the same order.
    ///
    /// `None` when three or more corners are collinear.
    pub fn square_to_quad(quad: &[Point2<f32>; 4]) -> Option<Self> {
        let [(x0, y0), (x1, y1), (x2, y2), (x3, y3)] =
            quad.map(|p| (p.x as f64, p.y as f64));

        let sx = x0 - x1 + x2 - x3;
        let sy = y0 - y1 + y2 - y3;
        let (g, h) = if sx == 0.0 && sy == 0.0 {
            // parallelogram
            (0.0, 0.0)
        } else {
            let (dx1, dy1) = (x1 - x2, y1 - y2);
            let (dx2, dy2) = (x3 - x2, y3 - y2);
            let den = dx1 * dy2 - dx2 * dy1;
            if !den.is_finite() || den.abs() <= SINGULAR_DET {
                return None;
            }
            ((sx * dy2 - dx2 * sy) / den, (dx1 * sy - sx * dy1) / den)
        };

        let m = Matrix3::new(
            x1 - x0 + g * x1, x3 - x0 + h * x3, x0, //
            y1 - y0 + g * y1, y3 - y0 + h * y3, y0, //
            g, h, 1.0,
        );
        (!is_singular(&m)).then_some(Self::new(m))
    }
}

fn is_singular(m: &Matrix3<f64>) -> bool {
    let det = m.determinant();
    !det.is_finite() || det.abs() <= SINGULAR_DET
}

fn normalized(m: Matrix3<f64>) -> Option<Homography> {
    let s = m[(2, 2)];
    if !s.is_finite() || s.abs() <= SINGULAR_DET {
        return Some(Homography::new(m));
    }
    let m = m / s;
    m.iter().all(|v| v.is_finite()).then_some(Homography::new(m))
}

/// Compute H such that `dst ~ H * src` from exactly 4 point correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Returns `None`
/// when either quad is degenerate (three collinear corners, repeated corners).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let src_from_square = Homography::square_to_quad(src)?;
    let dst_from_square = Homography::square_to_quad(dst)?;
    let square_from_src = src_from_square.inverse()?;
    normalized(dst_from_square.h * square_from_src.h)
}

/// Resample `src` into an `out_w × out_h` image.
///
/// Each output pixel `(x, y)` is mapped to the source with `h_src_from_dst`
/// and bilinearly sampled; samples falling outside `src` are black.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: &Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let data = (0..out_h)
        .flat_map(|y| (0..out_w).map(move |x| (x, y)))
        .map(|(x, y)| {
            let p = h_src_from_dst.apply_f64(x as f64, y as f64);
            if p.x.is_finite() && p.y.is_finite() {
                sample_bilinear_u8(src, p.x as f32, p.y as f32)
            } else {
                0
            }
        })
        .collect();

    GrayImage {
        width: out_w,
        height: out_h,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn assert_close(a: Point2<f32>, b: Point2<f32>, tol: f32) {
        assert!(
            (a - b).norm() < tol,
            "expected ({:.4}, {:.4}) ~ ({:.4}, {:.4})",
            a.x,
            a.y,
            b.x,
            b.y
        );
    }

    #[test]
    fn unit_square_lands_on_the_quad() {
        let quad = [
            Point2::new(12.0_f32, 8.0),
            Point2::new(110.0, 20.0),
            Point2::new(95.0, 130.0),
            Point2::new(4.0, 100.0),
        ];
        let h = Homography::square_to_quad(&quad).expect("convex quad");
        let unit = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for (q, (u, v)) in quad.iter().zip(unit) {
            assert_close(h.apply(Point2::new(u, v)), *q, 1e-4);
        }
    }

    #[test]
    fn parallelogram_is_affine() {
        let quad = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(13.0, 5.0),
            Point2::new(3.0, 5.0),
        ];
        let h = Homography::square_to_quad(&quad).expect("parallelogram");
        assert_eq!(h.h[(2, 0)], 0.0);
        assert_eq!(h.h[(2, 1)], 0.0);
        assert_close(h.apply(Point2::new(0.5, 0.5)), Point2::new(6.5, 2.5), 1e-5);
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.2, 0.1, 5.0, //
            -0.05, 0.9, 3.0, //
            0.001, 0.0005, 1.0,
        ));
        let inv = h.inverse().expect("invertible");
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(50.0, -20.0),
            Point2::new(320.0, 200.0),
        ] {
            assert_close(inv.apply(h.apply(p)), p, 1e-3);
        }
        assert!(Homography::new(Matrix3::zeros()).inverse().is_none());
    }

    #[test]
    fn four_point_solution_recovers_known_h() {
        let truth = Homography::new(Matrix3::new(
            0.8, 0.05, 120.0, //
            -0.02, 1.1, 80.0, //
            0.0009, -0.0004, 1.0,
        ));
        let square = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(180.0, 0.0),
            Point2::new(180.0, 180.0),
            Point2::new(0.0, 180.0),
        ];
        let dst = square.map(|p| truth.apply(p));

        let recovered = homography_from_4pt(&square, &dst).expect("recoverable");
        assert_abs_diff_eq!(recovered.h[(2, 2)], 1.0, epsilon = 1e-12);
        for p in [
            Point2::new(0.0_f32, 0.0),
            Point2::new(60.0, 40.0),
            Point2::new(150.0, 120.0),
        ] {
            assert_close(recovered.apply(p), truth.apply(p), 1e-2);
        }
    }

    #[test]
    fn collinear_points_have_no_solution() {
        let line = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(20.0, 0.0),
            Point2::new(30.0, 0.0),
        ];
        let square = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(Homography::square_to_quad(&line).is_none());
        assert!(homography_from_4pt(&line, &square).is_none());
        assert!(homography_from_4pt(&square, &line).is_none());
    }

    #[test]
    fn warp_with_identity_copies_pixels() {
        let src = GrayImage {
            width: 3,
            height: 2,
            data: vec![10, 20, 30, 40, 50, 60],
        };
        let id = Homography::new(Matrix3::identity());
        let out = warp_perspective_gray(&src.view(), &id, 3, 2);
        assert_eq!(out, src);
    }

    #[test]
    fn warp_outside_the_source_is_black() {
        let src = GrayImage::filled(4, 4, 200);
        let shift = Homography::new(Matrix3::new(
            1.0, 0.0, 10.0, //
            0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0,
        ));
        let out = warp_perspective_gray(&src.view(), &shift, 4, 4);
        assert!(out.data.iter().all(|&v| v == 0));
    }
}
