//! Core types for tic-tac-toe board reconstruction.
//!
//! This crate is intentionally small and purely geometric: polar lines and
//! their intersections, board corners, a 4-point homography and a perspective
//! warp over a plain grayscale buffer. It does *not* depend on any concrete
//! image crate.

mod corners;
mod homography;
mod image;
mod line;
mod logger;

pub use corners::BoardCorners;
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView};
pub use line::{EdgeRole, LineEquation, LineSlot, PolarLine};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
