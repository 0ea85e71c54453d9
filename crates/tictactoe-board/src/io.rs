//! JSON configuration and report helpers for board detection.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tictactoe_core::{BoardCorners, PolarLine};

use crate::border::BorderLines;
use crate::cells::{BoardState, CellClassification};
use crate::detector::{
    BoardDetectError, BoardDetection, BoardDetector, BoardDetectorParams, PipelineStage,
};
use crate::primitives::HoughLine;

#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Configuration file for a detection run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectConfig {
    /// Input image; a command-line argument takes precedence.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Where to write the JSON report.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Directory for debug images.
    #[serde(default)]
    pub debug_dir: Option<String>,
    #[serde(default)]
    pub params: BoardDetectorParams,
}

impl DetectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn output_path(&self) -> Option<PathBuf> {
        self.output_path.as_ref().map(PathBuf::from)
    }

    pub fn debug_dir(&self) -> Option<PathBuf> {
        self.debug_dir.as_ref().map(PathBuf::from)
    }

    pub fn build_detector(&self) -> BoardDetector {
        BoardDetector::new(self.params.clone())
    }
}

/// Summary of one detection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectReport {
    pub image_path: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub image_width: u32,
    pub image_height: u32,
    #[serde(default)]
    pub raw_lines: Vec<HoughLine>,
    /// Lines left after deduplication.
    #[serde(default)]
    pub lines: Vec<PolarLine>,
    #[serde(default)]
    pub border: Option<BorderLines>,
    #[serde(default)]
    pub corners: Option<BoardCorners>,
    #[serde(default)]
    pub rectified_side: Option<u32>,
    #[serde(default)]
    pub h_img_from_rect: Option<[[f64; 3]; 3]>,
    #[serde(default)]
    pub cells: Option<Vec<CellClassification>>,
    #[serde(default)]
    pub state: Option<BoardState>,
    /// Rows of `X`/`O`/`-` tokens, as printed on stdout.
    #[serde(default)]
    pub board: Option<Vec<String>>,
    #[serde(default)]
    pub failed_stage: Option<PipelineStage>,
    #[serde(default)]
    pub error: Option<String>,
}

impl DetectReport {
    /// Empty report for an input image.
    pub fn new(
        image_path: impl Into<String>,
        config_path: Option<&Path>,
        image_width: u32,
        image_height: u32,
    ) -> Self {
        Self {
            image_path: image_path.into(),
            config_path: config_path.map(|p| p.to_string_lossy().into_owned()),
            image_width,
            image_height,
            raw_lines: Vec::new(),
            lines: Vec::new(),
            border: None,
            corners: None,
            rectified_side: None,
            h_img_from_rect: None,
            cells: None,
            state: None,
            board: None,
            failed_stage: None,
            error: None,
        }
    }

    /// Populate report fields from a successful detection.
    pub fn set_detection(&mut self, det: &BoardDetection) {
        self.raw_lines = det.raw_lines.clone();
        self.lines = det.active_lines().collect();
        self.border = Some(det.border);
        self.corners = Some(det.corners);
        self.rectified_side = Some(det.rectified.side);
        self.h_img_from_rect = Some(det.rectified.h_img_from_rect.to_array());
        self.cells = Some(det.cells.clone());
        self.state = Some(det.state);
        self.board = Some(det.state.to_string().lines().map(str::to_owned).collect());
        self.failed_stage = None;
        self.error = None;
    }

    /// Record a detection error.
    pub fn set_error(&mut self, err: &BoardDetectError) {
        self.failed_stage = match err {
            BoardDetectError::BoardNotFound(reason) => Some(reason.stage()),
            BoardDetectError::ImageBuffer { .. } => None,
        };
        self.error = Some(err.to_string());
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
