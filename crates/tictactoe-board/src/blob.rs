//! Largest-blob isolation and mask cleanup.
//!
//! The board grid is assumed to be the largest connected white structure in
//! the mask; everything else (text, symbols, clutter) is dropped.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

use crate::primitives::{dilate_plus, erode_plus, flood_fill};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Temporary label of blobs that were measured but not yet resolved.
const VISITED: u8 = 64;

/// Seed pixel and area of a 4-connected blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobStats {
    pub seed: (u32, u32),
    pub area: usize,
}

/// Output of [`isolate_largest_blob`].
#[derive(Clone, Debug)]
pub struct IsolatedBlob {
    /// 0/255 mask holding only the largest blob.
    pub mask: GrayImage,
    /// `None` when the input had no foreground at all.
    pub largest: Option<BlobStats>,
    pub blob_count: usize,
}

/// Keep only the largest 4-connected foreground (≥ 128) region of `mask`.
///
/// Blobs are visited in raster order and the first one wins ties.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip(mask), fields(w = mask.width(), h = mask.height())))]
pub fn isolate_largest_blob(mask: &GrayImage) -> IsolatedBlob {
    let mut work = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get_pixel(x, y).0[0] >= 128 { 255 } else { 0 }])
    });

    let mut blobs: Vec<BlobStats> = Vec::new();
    let mut largest: Option<BlobStats> = None;
    for y in 0..work.height() {
        for x in 0..work.width() {
            if work.get_pixel(x, y).0[0] != 255 {
                continue;
            }
            let area = flood_fill(&mut work, (x, y), VISITED);
            let blob = BlobStats { seed: (x, y), area };
            if largest.map_or(true, |best| area > best.area) {
                largest = Some(blob);
            }
            blobs.push(blob);
        }
    }

    if let Some(best) = largest {
        for blob in &blobs {
            let fill = if blob.seed == best.seed { 255 } else { 0 };
            flood_fill(&mut work, blob.seed, fill);
        }
    }

    log::debug!(
        "blob isolation: {} blobs, largest {:?}",
        blobs.len(),
        largest.map(|b| b.area)
    );

    IsolatedBlob {
        mask: work,
        largest,
        blob_count: blobs.len(),
    }
}

/// Morphological cleanup applied to the isolated grid before line detection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaskCleanupParams {
    pub erode_iterations: u8,
    pub dilate_iterations: u8,
}

impl Default for MaskCleanupParams {
    fn default() -> Self {
        Self {
            erode_iterations: 1,
            dilate_iterations: 2,
        }
    }
}

/// Erode away single-pixel spurs, then thicken the grid strokes.
pub fn clean_grid_mask(mask: &GrayImage, params: &MaskCleanupParams) -> GrayImage {
    dilate_plus(
        &erode_plus(mask, params.erode_iterations),
        params.dilate_iterations,
    )
}
