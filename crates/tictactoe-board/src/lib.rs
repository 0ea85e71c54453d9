//! Tic-tac-toe board detection.
//!
//! Pipeline:
//! - extract a white-on-black grid mask and keep its largest blob,
//! - detect straight lines with a Hough transform and merge near-duplicates,
//! - select the four outermost lines and intersect them into board corners,
//! - warp the board into a square and classify each of its 9 cells.
//!
//! Geometry types live in `tictactoe-core`; image file I/O lives in the
//! `tictactoe` facade crate.

mod blob;
mod border;
mod cells;
mod dedup;
mod detector;
mod io;
mod preprocess;
pub mod primitives;
mod rectify;

pub use blob::{clean_grid_mask, isolate_largest_blob, BlobStats, IsolatedBlob, MaskCleanupParams};
pub use border::{select_border, BorderLines, BorderParams, SelectionPolicy};
pub use cells::{
    cell_rects, BoardClassification, BoardState, CellClassification, CellClassifier,
    CellClassifierParams, CellRect, CellState,
};
pub use dedup::{dedup_lines, merge_pair, DedupParams};
pub use detector::{
    BoardDetectError, BoardDetection, BoardDetector, BoardDetectorParams, BoardNotFound,
    PipelineStage,
};
pub use io::{ConfigIoError, DetectConfig, DetectReport};
pub use preprocess::{preprocess_grid_mask, PreprocessParams};
pub use primitives::{detect_lines, HoughLine, HoughLineParams};
pub use rectify::{rectify_board, square_side, RectifiedBoard, MIN_SQUARE_SIDE};

pub use tictactoe_core::{BoardCorners, EdgeRole, LineSlot, PolarLine};
