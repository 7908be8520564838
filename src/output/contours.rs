//! Contour overlay rendering.

use image::{Rgb, RgbImage};

use crate::segmentation::LabelMap;

const CONTOUR_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Render the source image with segment boundaries painted over it.
///
/// A pixel is a boundary pixel when its right or lower neighbor carries
/// a different label, giving a one-pixel contour between adjacent
/// segments. The label map must have the image's dimensions.
pub fn draw_contours(image: &RgbImage, labels: &LabelMap) -> RgbImage {
    let (width, height) = image.dimensions();
    debug_assert_eq!(labels.dim(), (height as usize, width as usize));

    let mut out = image.clone();
    for y in 0..height as usize {
        for x in 0..width as usize {
            let here = labels[[y, x]];
            let right_differs = x + 1 < width as usize && labels[[y, x + 1]] != here;
            let lower_differs = y + 1 < height as usize && labels[[y + 1, x]] != here;
            if right_differs || lower_differs {
                out.put_pixel(x as u32, y as u32, CONTOUR_COLOR);
            }
        }
    }
    out
}
