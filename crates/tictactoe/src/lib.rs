//! High-level facade crate for the `tictactoe-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core geometry crate and the board detector
//! - (feature-gated) helpers that load an image file, run the detector on it
//!   and dump debug images of the intermediate stages.
//!
//! ## Quickstart
//!
//! ```no_run
//! use tictactoe::detect;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = detect::load_gray("board.jpg")?;
//! let detector = tictactoe::board::BoardDetector::default();
//! let detection = detector.detect(&img)?;
//! println!("{}", detection.state);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `tictactoe::core`: polar lines, board corners, homographies, grayscale views.
//! - `tictactoe::board`: the detection pipeline and its stages.
//! - `tictactoe::detect` (feature `image`): end-to-end helpers from image files.
//! - `tictactoe::debug` (feature `image`): PNG dumps of the pipeline stages.

pub use tictactoe_board as board;
pub use tictactoe_core as core;

pub use tictactoe_board::{
    BoardDetectError, BoardDetection, BoardDetector, BoardDetectorParams, BoardNotFound,
    BoardState, CellState, DetectConfig, DetectReport,
};
pub use tictactoe_core::{BoardCorners, EdgeRole, PolarLine};

#[cfg(feature = "image")]
pub mod debug;
#[cfg(feature = "image")]
pub mod detect;
