//! Synthetic board images for integration tests.

#![allow(dead_code)]

use image::{GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

pub const WHITE: Luma<u8> = Luma([255]);
pub const BLACK: Luma<u8> = Luma([0]);

/// Axis-aligned 3×3 grid drawn as 4 + 4 dark lines on white paper.
///
/// The two inner lines of each direction cross past the frame by
/// `overshoot` pixels, as a hand-drawn grid would, so they collect more
/// Hough votes than the frame lines.
pub struct SyntheticGrid {
    pub size: u32,
    /// Offset of the first line.
    pub first: u32,
    /// Distance between consecutive lines.
    pub pitch: u32,
    pub thickness: u32,
    pub overshoot: u32,
}

impl Default for SyntheticGrid {
    fn default() -> Self {
        Self {
            size: 560,
            first: 38,
            pitch: 160,
            thickness: 4,
            overshoot: 12,
        }
    }
}

impl SyntheticGrid {
    pub fn line_offsets(&self) -> [u32; 4] {
        std::array::from_fn(|k| self.first + k as u32 * self.pitch)
    }

    /// Centre of the outermost lines, i.e. where the board corners are.
    pub fn border_centres(&self) -> (f32, f32) {
        let half = (self.thickness as f32 - 1.0) * 0.5;
        let [first, .., last] = self.line_offsets();
        (first as f32 + half, last as f32 + half)
    }

    /// Centre of cell `(row, col)` in image pixels.
    pub fn cell_centre(&self, row: u32, col: u32) -> (i32, i32) {
        let c = |k: u32| {
            let start = self.first + k * self.pitch + self.thickness;
            let end = self.first + (k + 1) * self.pitch;
            (start + end) / 2
        };
        (c(col) as i32, c(row) as i32)
    }

    pub fn render(&self) -> GrayImage {
        let mut img = GrayImage::from_pixel(self.size, self.size, WHITE);
        let frame_span = 3 * self.pitch + self.thickness;
        for (k, offset) in self.line_offsets().into_iter().enumerate() {
            let over = if k == 1 || k == 2 { self.overshoot } else { 0 };
            let start = self.first as i32 - over as i32;
            let span = frame_span + 2 * over;
            let horizontal = Rect::at(start, offset as i32).of_size(span, self.thickness);
            let vertical = Rect::at(offset as i32, start).of_size(self.thickness, span);
            draw_filled_rect_mut(&mut img, horizontal, BLACK);
            draw_filled_rect_mut(&mut img, vertical, BLACK);
        }
        img
    }
}

/// Filled dark disc, an "O" after binarization.
pub fn draw_o(img: &mut GrayImage, centre: (i32, i32), radius: i32) {
    draw_filled_circle_mut(img, centre, radius, BLACK);
}

/// Filled dark square, enough ink to read as an "X".
pub fn draw_ink_square(img: &mut GrayImage, centre: (i32, i32), side: u32) {
    let half = side as i32 / 2;
    draw_filled_rect_mut(
        img,
        Rect::at(centre.0 - half, centre.1 - half).of_size(side, side),
        BLACK,
    );
}
