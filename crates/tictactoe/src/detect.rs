use std::path::{Path, PathBuf};

use crate::board::{BoardDetectError, BoardDetection, BoardDetector, ConfigIoError};
use crate::core;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("cannot read image {}: {source}", path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("cannot write image {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("invalid grayscale image buffer length (expected {expected} bytes, got {got})")]
    InvalidGrayBuffer { expected: usize, got: usize },

    #[error("invalid grayscale image dimensions (width={width}, height={height})")]
    InvalidGrayDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Board(#[from] BoardDetectError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigIoError),
}

/// Decode an image file and convert it to 8-bit grayscale.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path)))]
pub fn load_gray(path: impl AsRef<Path>) -> Result<::image::GrayImage, DetectError> {
    let path = path.as_ref();
    let input = |source| DetectError::Input {
        path: path.to_path_buf(),
        source,
    };
    let img = ::image::ImageReader::open(path)
        .map_err(|e| input(::image::ImageError::IoError(e)))?
        .with_guessed_format()
        .map_err(|e| input(::image::ImageError::IoError(e)))?
        .decode()
        .map_err(input)?;
    Ok(img.to_luma8())
}

/// Convert an `image::GrayImage` into the lightweight `tictactoe-core` view type.
pub fn gray_view(img: &::image::GrayImage) -> core::GrayImageView<'_> {
    core::GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Build an `image::GrayImage` from a raw grayscale buffer.
pub fn gray_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::GrayImage, DetectError> {
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some((w, h)) = w.zip(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    let Some(expected) = w.checked_mul(h) else {
        return Err(DetectError::InvalidGrayDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidGrayBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::GrayImage::from_raw(width, height, pixels.to_vec())
        .ok_or(DetectError::InvalidGrayDimensions { width, height })
}

/// Run the detector on an image file.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(path, detector)))]
pub fn detect_board_from_path(
    path: impl AsRef<Path>,
    detector: &BoardDetector,
) -> Result<BoardDetection, DetectError> {
    let img = load_gray(path)?;
    Ok(detector.detect(&img)?)
}

/// Run the detector with default parameters on a raw grayscale buffer.
pub fn detect_board_from_gray_u8(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<BoardDetection, DetectError> {
    let img = gray_image_from_slice(width, height, pixels)?;
    Ok(BoardDetector::default().detect(&img)?)
}
