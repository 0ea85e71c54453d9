use serde::{Deserialize, Serialize};

use crate::blob::MaskCleanupParams;
use crate::border::BorderParams;
use crate::cells::CellClassifierParams;
use crate::dedup::DedupParams;
use crate::preprocess::PreprocessParams;
use crate::primitives::HoughLineParams;

/// Configuration for the board detector, one section per stage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardDetectorParams {
    /// Grid mask extraction.
    pub preprocess: PreprocessParams,
    /// Morphology applied after keeping the largest blob.
    pub cleanup: MaskCleanupParams,
    /// Hough line detection on the cleaned mask.
    pub lines: HoughLineParams,
    /// Near-duplicate line merging.
    pub dedup: DedupParams,
    /// Border line selection and corner intersection.
    pub border: BorderParams,
    /// Per-cell classification of the rectified board.
    pub cells: CellClassifierParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r#"{ "lines": { "vote_threshold": 150 }, "border": { "policy": "independent" } }"#;
        let params: BoardDetectorParams = serde_json::from_str(raw).expect("parse");
        assert_eq!(params.lines.vote_threshold, 150);
        assert_eq!(params.lines.nms_rho, 10);
        assert_eq!(params.border.policy, crate::SelectionPolicy::Independent);
        assert_eq!(params.cells, CellClassifierParams::default());
        assert_eq!(params.dedup.max_point_dist, 64.0);
    }
}
