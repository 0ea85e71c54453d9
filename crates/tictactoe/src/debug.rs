//! PNG dumps of the intermediate pipeline stages.

use std::fs;
use std::path::{Path, PathBuf};

use ::image::{DynamicImage, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_line_segment_mut;
use nalgebra::Point2;

use crate::board::BoardDetection;
use crate::core::{EdgeRole, PolarLine};
use crate::detect::DetectError;

const LINE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

fn endpoints(line: PolarLine, width: u32, height: u32) -> ((f32, f32), (f32, f32)) {
    let [a, b]: [Point2<f64>; 2] = line.border_points(width as f64, height as f64);
    ((a.x as f32, a.y as f32), (b.x as f32, b.y as f32))
}

fn save_png(img: DynamicImage, dir: &Path, name: &str) -> Result<PathBuf, DetectError> {
    let path = dir.join(name);
    match img.save(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(DetectError::Output { path, source }),
    }
}

/// Grayscale input with the deduplicated lines in blue and the chosen border
/// in black.
pub fn render_lines(gray: &GrayImage, det: &BoardDetection) -> RgbImage {
    let (w, h) = gray.dimensions();
    let mut canvas = RgbImage::from_fn(w, h, |x, y| {
        let v = gray.get_pixel(x, y).0[0];
        Rgb([v, v, v])
    });
    for line in det.active_lines() {
        let (a, b) = endpoints(line, w, h);
        draw_line_segment_mut(&mut canvas, a, b, LINE_COLOR);
    }
    for role in EdgeRole::ALL {
        let (a, b) = endpoints(det.border.get(role), w, h);
        draw_line_segment_mut(&mut canvas, a, b, BORDER_COLOR);
    }
    canvas
}

/// Write `blob_mask.png`, `lines.png` and `rectified.png` into `dir`.
///
/// Returns the paths written, in that order.
pub fn write_debug_images(
    dir: impl AsRef<Path>,
    gray: &GrayImage,
    det: &BoardDetection,
) -> Result<Vec<PathBuf>, DetectError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mask = save_png(DynamicImage::ImageLuma8(det.grid_mask.clone()), dir, "blob_mask.png")?;
    let lines = save_png(
        DynamicImage::ImageRgb8(render_lines(gray, det)),
        dir,
        "lines.png",
    )?;

    let rect = save_png(
        DynamicImage::ImageLuma8(det.rectified.image.clone()),
        dir,
        "rectified.png",
    )?;

    log::info!("debug images written to {}", dir.display());
    Ok(vec![mask, lines, rect])
}
