use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Outer corners of the board in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardCorners {
    pub top_left: Point2<f32>,
    pub top_right: Point2<f32>,
    pub bottom_right: Point2<f32>,
    pub bottom_left: Point2<f32>,
}

impl BoardCorners {
    /// Corners in TL, TR, BR, BL order.
    pub fn to_array(&self) -> [Point2<f32>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// Squared lengths of the sides TL-TR, TR-BR, BR-BL, BL-TL.
    pub fn side_lengths_sq(&self) -> [f64; 4] {
        let pts = self.to_array();
        std::array::from_fn(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % 4];
            let dx = (b.x - a.x) as f64;
            let dy = (b.y - a.y) as f64;
            dx * dx + dy * dy
        })
    }

    /// Length of the longest side.
    pub fn max_side_length(&self) -> f64 {
        self.side_lengths_sq()
            .into_iter()
            .fold(0.0_f64, f64::max)
            .sqrt()
    }
}
