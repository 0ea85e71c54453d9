use image::GrayImage;
use tictactoe_core::LineSlot;

use super::{BoardDetectError, BoardDetection, BoardDetectorParams, BoardNotFound};
use crate::blob::{clean_grid_mask, isolate_largest_blob};
use crate::border::select_border;
use crate::cells::CellClassifier;
use crate::dedup::dedup_lines;
use crate::preprocess::preprocess_grid_mask;
use crate::primitives::detect_lines;
use crate::rectify::rectify_board;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Finds a tic-tac-toe board in a grayscale photo and reads its cells.
#[derive(Clone, Debug, Default)]
pub struct BoardDetector {
    params: BoardDetectorParams,
    classifier: CellClassifier,
}

impl BoardDetector {
    pub fn new(params: BoardDetectorParams) -> Self {
        let classifier = CellClassifier::new(params.cells.clone());
        Self { params, classifier }
    }

    /// Detector parameters.
    #[inline]
    pub fn params(&self) -> &BoardDetectorParams {
        &self.params
    }

    /// Run the full pipeline on `gray`.
    ///
    /// The input is never modified; every stage works on its own buffer.
    #[cfg_attr(feature = "tracing", instrument(level = "info", skip(self, gray), fields(w = gray.width(), h = gray.height())))]
    pub fn detect(&self, gray: &GrayImage) -> Result<BoardDetection, BoardDetectError> {
        let p = &self.params;
        let (width, height) = gray.dimensions();

        let mask = preprocess_grid_mask(gray, &p.preprocess);
        let isolated = isolate_largest_blob(&mask);
        let blob = isolated.largest.ok_or(BoardNotFound::NoBlob)?;
        let grid_mask = clean_grid_mask(&isolated.mask, &p.cleanup);

        let raw_lines = detect_lines(&grid_mask, &p.lines);
        if raw_lines.is_empty() {
            return Err(BoardNotFound::NoLines.into());
        }
        log::info!("{} lines detected", raw_lines.len());

        let mut lines: Vec<LineSlot> = raw_lines.iter().map(|l| l.line.into()).collect();
        let merges = dedup_lines(&mut lines, width as f64, height as f64, &p.dedup);

        let border = select_border(&lines, &p.border)?;
        let corners = border.corners(width as f64, height as f64, p.border.parallel_det_eps)?;
        log::info!("board corners: {:?}", corners.to_array());

        let rectified = rectify_board(gray, &corners)?;
        let classification = self.classifier.classify_board(&rectified.image);
        log::info!("board state:\n{}", classification.state);

        Ok(BoardDetection {
            grid_mask,
            blob,
            raw_lines,
            lines,
            merges,
            border,
            corners,
            rectified,
            cells: classification.cells,
            state: classification.state,
        })
    }
}
