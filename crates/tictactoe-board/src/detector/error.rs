use std::fmt;

use serde::{Deserialize, Serialize};
use tictactoe_core::EdgeRole;

/// Pipeline stage at which a detection gave up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    BlobIsolation,
    LineDetection,
    BorderSelection,
    Rectification,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::BlobIsolation => "blob isolation",
            PipelineStage::LineDetection => "line detection",
            PipelineStage::BorderSelection => "border selection",
            PipelineStage::Rectification => "rectification",
        };
        f.write_str(name)
    }
}

/// Geometric reasons for not finding a board.
#[derive(thiserror::Error, Clone, Debug, PartialEq)]
pub enum BoardNotFound {
    #[error("no foreground blob in the grid mask")]
    NoBlob,
    #[error("no lines detected on the grid mask")]
    NoLines,
    #[error("no candidate for the {0} edge")]
    MissingEdge(EdgeRole),
    #[error("{first} and {second} edges do not intersect")]
    ParallelEdges { first: EdgeRole, second: EdgeRole },
    #[error("rectified side of {side} px is too small")]
    DegenerateSquare { side: u32 },
    #[error("board corners do not define a perspective transform")]
    SingularTransform,
}

impl BoardNotFound {
    pub fn stage(&self) -> PipelineStage {
        match self {
            BoardNotFound::NoBlob => PipelineStage::BlobIsolation,
            BoardNotFound::NoLines => PipelineStage::LineDetection,
            BoardNotFound::MissingEdge(_) | BoardNotFound::ParallelEdges { .. } => {
                PipelineStage::BorderSelection
            }
            BoardNotFound::DegenerateSquare { .. } | BoardNotFound::SingularTransform => {
                PipelineStage::Rectification
            }
        }
    }
}

/// Errors returned by the board detector.
#[derive(thiserror::Error, Debug)]
pub enum BoardDetectError {
    #[error("board not found during {}: {}", .0.stage(), .0)]
    BoardNotFound(#[from] BoardNotFound),
    #[error("failed to build a {width}x{height} image buffer")]
    ImageBuffer { width: u32, height: u32 },
}
