//! Pixel-level building blocks that `imageproc` does not provide in the form
//! the pipeline needs.

mod flood_fill;
mod hough_circles;
mod hough_lines;
mod morphology;
mod threshold;

pub use flood_fill::flood_fill;
pub use hough_circles::{detect_circles, Circle, HoughCircleParams};
pub use hough_lines::{detect_lines, HoughLine, HoughLineParams};
pub use morphology::{dilate_plus, erode_plus};
pub use threshold::{adaptive_threshold_mean, invert, otsu_level, threshold_binary, threshold_otsu};
