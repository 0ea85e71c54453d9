//! Board detection pipeline.
//!
//! This module wires together grid mask extraction, largest-blob isolation,
//! Hough line detection and deduplication, border selection, perspective
//! rectification and per-cell classification.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{BoardDetectError, BoardNotFound, PipelineStage};
pub use params::BoardDetectorParams;
pub use pipeline::BoardDetector;
pub use result::BoardDetection;
