//! Perspective rectification of the board into a square image.

use image::GrayImage;
use nalgebra::Point2;
use tictactoe_core::{
    homography_from_4pt, warp_perspective_gray, BoardCorners, GrayImageView, Homography,
};

use crate::detector::{BoardDetectError, BoardNotFound};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest side that still splits into 3×3 non-empty cells.
pub const MIN_SQUARE_SIDE: u32 = 3;

/// Top-down view of the board.
#[derive(Clone, Debug)]
pub struct RectifiedBoard {
    /// `side × side` grayscale image; board corners map to the image corners.
    pub image: GrayImage,
    pub side: u32,
    pub corners: BoardCorners,
    pub h_rect_from_img: Homography,
    pub h_img_from_rect: Homography,
}

/// Side of the rectified square: the longest board side, floored.
pub fn square_side(corners: &BoardCorners) -> u32 {
    let len = corners.max_side_length();
    if len.is_finite() {
        len.floor() as u32
    } else {
        0
    }
}

/// Warp the board bounded by `corners` into an `S × S` image.
///
/// `TL, TR, BR, BL` map to `(0,0), (S-1,0), (S-1,S-1), (0,S-1)`. The source
/// pixels are sampled in place and the warped buffer is moved into the
/// result without copying.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(gray, corners)))]
pub fn rectify_board(
    gray: &GrayImage,
    corners: &BoardCorners,
) -> Result<RectifiedBoard, BoardDetectError> {
    let side = square_side(corners);
    if side < MIN_SQUARE_SIDE {
        return Err(BoardNotFound::DegenerateSquare { side }.into());
    }

    let s = (side - 1) as f32;
    let square = [
        Point2::new(0.0, 0.0),
        Point2::new(s, 0.0),
        Point2::new(s, s),
        Point2::new(0.0, s),
    ];
    let h_rect_from_img = homography_from_4pt(&corners.to_array(), &square)
        .ok_or(BoardNotFound::SingularTransform)?;
    let h_img_from_rect = h_rect_from_img
        .inverse()
        .ok_or(BoardNotFound::SingularTransform)?;

    let src = GrayImageView {
        width: gray.width() as usize,
        height: gray.height() as usize,
        data: gray.as_raw(),
    };
    let warped = warp_perspective_gray(&src, &h_img_from_rect, side as usize, side as usize);
    let image = GrayImage::from_raw(side, side, warped.data).ok_or(BoardDetectError::ImageBuffer {
        width: side,
        height: side,
    })?;
    log::debug!("rectified board: {side}x{side}");

    Ok(RectifiedBoard {
        image,
        side,
        corners: *corners,
        h_rect_from_img,
        h_img_from_rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use image::Luma;

    fn skewed() -> BoardCorners {
        BoardCorners {
            top_left: Point2::new(10.0, 10.0),
            top_right: Point2::new(200.0, 5.0),
            bottom_right: Point2::new(210.0, 195.0),
            bottom_left: Point2::new(5.0, 190.0),
        }
    }

    #[test]
    fn side_is_the_floored_longest_edge() {
        assert_eq!(square_side(&skewed()), 205);
    }

    #[test]
    fn corners_map_onto_the_square() {
        let gray = GrayImage::from_pixel(220, 220, Luma([128]));
        let board = rectify_board(&gray, &skewed()).expect("rectified");
        assert_eq!(board.side, 205);
        assert_eq!(board.image.dimensions(), (205, 205));

        let s = 204.0;
        let targets = [(0.0, 0.0), (s, 0.0), (s, s), (0.0, s)];
        for (p, (x, y)) in skewed().to_array().into_iter().zip(targets) {
            let q = board.h_rect_from_img.apply(p);
            assert_abs_diff_eq!(q.x, x, epsilon = 1e-2);
            assert_abs_diff_eq!(q.y, y, epsilon = 1e-2);
        }
        // Interior of the warp samples the uniform source.
        assert_eq!(board.image.get_pixel(100, 100).0[0], 128);
    }

    #[test]
    fn tiny_quad_is_degenerate() {
        let p = Point2::new(4.0, 4.0);
        let corners = BoardCorners {
            top_left: p,
            top_right: Point2::new(5.0, 4.0),
            bottom_right: Point2::new(5.0, 5.0),
            bottom_left: p,
        };
        let gray = GrayImage::new(10, 10);
        assert!(matches!(
            rectify_board(&gray, &corners),
            Err(BoardDetectError::BoardNotFound(BoardNotFound::DegenerateSquare { side: 1 }))
        ));
    }

    #[test]
    fn collinear_corners_have_no_transform() {
        let corners = BoardCorners {
            top_left: Point2::new(0.0, 0.0),
            top_right: Point2::new(10.0, 0.0),
            bottom_right: Point2::new(20.0, 0.0),
            bottom_left: Point2::new(30.0, 0.0),
        };
        let gray = GrayImage::new(40, 40);
        assert!(matches!(
            rectify_board(&gray, &corners),
            Err(BoardDetectError::BoardNotFound(BoardNotFound::SingularTransform))
        ));
    }
}
