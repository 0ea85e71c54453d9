//! Per-cell symbol classification on the rectified board.
//!
//! A cell holds an `O` when a large circle is found on its edge map, an `X`
//! when enough of it is covered by ink, and is empty otherwise.

use std::fmt;

use image::GrayImage;
use imageproc::edges::canny;
use serde::{Deserialize, Deserializer, Serialize};

use crate::primitives::{
    detect_circles, erode_plus, invert, threshold_otsu, HoughCircleParams,
};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    X,
    O,
    Empty,
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            CellState::X => "X",
            CellState::O => "O",
            CellState::Empty => "-",
        };
        f.write_str(token)
    }
}

/// Row-major 3×3 board contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub cells: [[CellState; 3]; 3],
}

impl BoardState {
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<CellState> {
        self.cells.get(row)?.get(col).copied()
    }
}

impl Default for BoardState {
    fn default() -> Self {
        Self {
            cells: [[CellState::Empty; 3]; 3],
        }
    }
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            write!(f, "{} {} {}", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

/// Pixel rectangle of one cell in the rectified board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRect {
    pub row: usize,
    pub col: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Split a `side × side` board into 9 cells of `side / 3` pixels, row-major.
///
/// When `side` is not a multiple of 3 the last rows and columns are left out.
pub fn cell_rects(side: u32) -> [CellRect; 9] {
    let cell = side / 3;
    std::array::from_fn(|i| {
        let (row, col) = (i / 3, i % 3);
        CellRect {
            row,
            col,
            x: col as u32 * cell,
            y: row as u32 * cell,
            width: cell,
            height: cell,
        }
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellClassifierParams {
    /// Median radius applied to the binarized cell before edge detection.
    pub median_radius: u32,
    /// Plus-element erosions of the inverted cell.
    pub erode_iterations: u8,
    pub canny_low: f32,
    pub canny_high: f32,
    pub circles: HoughCircleParams,
    /// A circle must be strictly larger than this, in pixels, to count as `O`.
    pub circle_min_radius: f32,
    /// Black-to-white pixel ratio above which a cell counts as `X`.
    pub ink_ratio_threshold: f64,
}

impl Default for CellClassifierParams {
    fn default() -> Self {
        Self {
            median_radius: 2,
            erode_iterations: 2,
            canny_low: 10.0,
            canny_high: 30.0,
            circles: HoughCircleParams::default(),
            circle_min_radius: 50.0,
            ink_ratio_threshold: 0.15,
        }
    }
}

fn ratio_or_infinite<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::INFINITY))
}

/// Decision for one cell and the measurements behind it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellClassification {
    pub rect: CellRect,
    pub state: CellState,
    /// Radius of the largest circle found, if any.
    pub circle_radius: Option<f32>,
    /// Black / white pixel ratio of the binarized cell; infinite (`null` in
    /// JSON) when the cell has no white pixel.
    #[serde(deserialize_with = "ratio_or_infinite")]
    pub ink_ratio: f64,
}

/// Classification of all nine cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardClassification {
    pub cells: Vec<CellClassification>,
    pub state: BoardState,
}

fn ink_ratio(binary: &GrayImage) -> f64 {
    let white = binary.pixels().filter(|p| p.0[0] == 255).count();
    let black = binary.pixels().filter(|p| p.0[0] == 0).count();
    if white == 0 {
        f64::INFINITY
    } else {
        black as f64 / white as f64
    }
}

#[derive(Clone, Debug, Default)]
pub struct CellClassifier {
    params: CellClassifierParams,
}

impl CellClassifier {
    pub fn new(params: CellClassifierParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &CellClassifierParams {
        &self.params
    }

    /// Classify one cell image.
    ///
    /// Returns the state, the radius of the largest circle and the ink ratio.
    /// A cell without pixels is empty.
    pub fn classify_cell(&self, cell: &GrayImage) -> (CellState, Option<f32>, f64) {
        if cell.width() == 0 || cell.height() == 0 {
            return (CellState::Empty, None, 0.0);
        }
        let p = &self.params;
        let binarized = threshold_otsu(cell);

        let smoothed = if p.median_radius > 0 {
            imageproc::filter::median_filter(&binarized, p.median_radius, p.median_radius)
        } else {
            binarized.clone()
        };
        let processed = erode_plus(&invert(&threshold_otsu(&smoothed)), p.erode_iterations);
        let edges = canny(&processed, p.canny_low, p.canny_high);

        let circle_radius = detect_circles(&edges, &p.circles)
            .iter()
            .map(|c| c.radius)
            .max_by(f32::total_cmp);
        let ratio = ink_ratio(&binarized);

        let state = if circle_radius.is_some_and(|r| r > p.circle_min_radius) {
            CellState::O
        } else if ratio > p.ink_ratio_threshold {
            CellState::X
        } else {
            CellState::Empty
        };
        (state, circle_radius, ratio)
    }

    fn classify_rect(&self, board: &GrayImage, rect: CellRect) -> CellClassification {
        let cell = image::imageops::crop_imm(board, rect.x, rect.y, rect.width, rect.height)
            .to_image();
        let (state, circle_radius, ink_ratio) = self.classify_cell(&cell);
        log::debug!(
            "cell ({}, {}): {state} circle={circle_radius:?} ink={ink_ratio:.3}",
            rect.row,
            rect.col
        );
        CellClassification {
            rect,
            state,
            circle_radius,
            ink_ratio,
        }
    }

    /// Classify the nine cells of a square rectified board.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, board), fields(side = board.width())))]
    pub fn classify_board(&self, board: &GrayImage) -> BoardClassification {
        let side = board.width().min(board.height());
        let rects = cell_rects(side);

        #[cfg(feature = "rayon")]
        let cells: Vec<CellClassification> = rects
            .par_iter()
            .map(|&rect| self.classify_rect(board, rect))
            .collect();
        #[cfg(not(feature = "rayon"))]
        let cells: Vec<CellClassification> = rects
            .iter()
            .map(|&rect| self.classify_rect(board, rect))
            .collect();

        let mut state = BoardState::default();
        for c in &cells {
            state.cells[c.rect.row][c.rect.col] = c.state;
        }
        BoardClassification { cells, state }
    }
}
