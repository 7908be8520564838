//! Color channel planes.
//!
//! The histogram splitter works on flat per-channel planes rather than on
//! packed pixels: each enabled channel family (RGB, HSV, LAB) contributes
//! three planes of one `f32` per pixel, row-major, scaled to a common
//! 0..=255 range so split scores are comparable across families.

use crate::config::ChannelSet;
use image::RgbImage;

/// Build the channel planes for `image` according to `channels`,
/// optionally box-blurring each plane.
///
/// Plane order is fixed: R, G, B, then H, S, V, then L, a, b, restricted
/// to the enabled families. An empty channel set yields no planes.
pub(crate) fn channel_planes(
    image: &RgbImage,
    channels: ChannelSet,
    blur: bool,
) -> Vec<Vec<f32>> {
    let (width, height) = image.dimensions();
    let n = (width as usize) * (height as usize);
    let mut planes: Vec<Vec<f32>> = (0..channels.plane_count())
        .map(|_| Vec::with_capacity(n))
        .collect();

    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let mut slot = 0;
        if channels.rgb {
            planes[slot].push(r as f32);
            planes[slot + 1].push(g as f32);
            planes[slot + 2].push(b as f32);
            slot += 3;
        }
        if channels.hsv {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            planes[slot].push(h / 360.0 * 255.0);
            planes[slot + 1].push(s * 255.0);
            planes[slot + 2].push(v * 255.0);
            slot += 3;
        }
        if channels.lab {
            let (l, a, bb) = rgb_to_lab(r, g, b);
            planes[slot].push(l * 2.55);
            planes[slot + 1].push(a + 128.0);
            planes[slot + 2].push(bb + 128.0);
        }
    }

    if blur {
        for plane in &mut planes {
            *plane = box_blur(plane, width as usize, height as usize);
        }
    }

    planes
}

/// Convert RGB to HSV: hue in degrees 0..360, saturation and value 0..=1.
pub(crate) fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (((g - b) / delta).rem_euclid(6.0))
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Convert sRGB to CIELAB under D65: L in 0..=100, a and b roughly
/// -128..=127.
pub(crate) fn rgb_to_lab(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    fn linearize(c: u8) -> f32 {
        let c = c as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    let rl = linearize(r);
    let gl = linearize(g);
    let bl = linearize(b);

    // sRGB -> XYZ (D65), normalized against the reference white.
    let x = (0.4124 * rl + 0.3576 * gl + 0.1805 * bl) / 0.95047;
    let y = 0.2126 * rl + 0.7152 * gl + 0.0722 * bl;
    let z = (0.0193 * rl + 0.1192 * gl + 0.9505 * bl) / 1.08883;

    fn f(t: f32) -> f32 {
        if t > 0.008856 {
            t.powf(1.0 / 3.0)
        } else {
            7.787 * t + 16.0 / 116.0
        }
    }

    let fx = f(x);
    let fy = f(y);
    let fz = f(z);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    (l, a, b)
}

/// 3x3 box blur with edge clamping.
pub(crate) fn box_blur(plane: &[f32], width: usize, height: usize) -> Vec<f32> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(plane.len());
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0f32;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let ny = (y as i64 + dy).clamp(0, height as i64 - 1) as usize;
                    let nx = (x as i64 + dx).clamp(0, width as i64 - 1) as usize;
                    sum += plane[ny * width + nx];
                }
            }
            out.push(sum / 9.0);
        }
    }
    out
}
