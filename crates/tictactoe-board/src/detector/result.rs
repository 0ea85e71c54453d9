use image::GrayImage;
use tictactoe_core::{BoardCorners, LineSlot, PolarLine};

use crate::blob::BlobStats;
use crate::border::BorderLines;
use crate::cells::{BoardState, CellClassification};
use crate::primitives::HoughLine;
use crate::rectify::RectifiedBoard;

/// Output of a successful detection run, including the intermediates.
#[derive(Clone, Debug)]
pub struct BoardDetection {
    /// Cleaned mask of the largest blob; the input of line detection.
    pub grid_mask: GrayImage,
    pub blob: BlobStats,
    /// Hough lines, strongest first.
    pub raw_lines: Vec<HoughLine>,
    /// `raw_lines` after deduplication, in the same order.
    pub lines: Vec<LineSlot>,
    pub merges: usize,
    pub border: BorderLines,
    pub corners: BoardCorners,
    pub rectified: RectifiedBoard,
    /// Row-major, one entry per cell.
    pub cells: Vec<CellClassification>,
    pub state: BoardState,
}

impl BoardDetection {
    /// Lines that survived deduplication.
    pub fn active_lines(&self) -> impl Iterator<Item = PolarLine> + '_ {
        self.lines.iter().filter_map(LineSlot::active)
    }
}
