use std::collections::VecDeque;

use image::GrayImage;

/// Fill the 4-connected region of pixels equal to the seed value with
/// `fill`, in place. Returns the number of pixels in the region.
///
/// A seed outside the image fills nothing.
pub fn flood_fill(img: &mut GrayImage, seed: (u32, u32), fill: u8) -> usize {
    let (w, h) = img.dimensions();
    let (sx, sy) = seed;
    if sx >= w || sy >= h {
        return 0;
    }
    let target = img.get_pixel(sx, sy).0[0];
    let width = w as usize;
    let mut visited = vec![false; width * h as usize];
    let mut queue = VecDeque::new();

    visited[sy as usize * width + sx as usize] = true;
    queue.push_back((sx, sy));
    let mut area = 0usize;

    while let Some((x, y)) = queue.pop_front() {
        img.put_pixel(x, y, image::Luma([fill]));
        area += 1;

        let neighbours = [
            (x.checked_sub(1), Some(y)),
            ((x + 1 < w).then_some(x + 1), Some(y)),
            (Some(x), y.checked_sub(1)),
            (Some(x), (y + 1 < h).then_some(y + 1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            let idx = ny as usize * width + nx as usize;
            if visited[idx] || img.get_pixel(nx, ny).0[0] != target {
                continue;
            }
            visited[idx] = true;
            queue.push_back((nx, ny));
        }
    }

    area
}
