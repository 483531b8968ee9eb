//! Per-pixel color adjustments.
//!
//! Every adjustment is a pure function of one pixel, run over the image by
//! the partitioner. [`histogram`] reads the image the same way and reduces
//! per-chunk counts. The 8-bit curves (gamma, contrast, brightness) are
//! tabulated once into a 256-entry lookup table and applied to R, G and B;
//! alpha is never modified.
//!
//! # Example
//!
//! ```rust
//! use rimg_core::PixelBuffer;
//! use rimg_ops::adjust::{adjust_brightness, invert};
//!
//! let img = PixelBuffer::filled(2, 2, [100, 100, 100, 128]);
//! assert_eq!(invert(&img).pixel(0, 0), [155, 155, 155, 128]);
//! assert_eq!(adjust_brightness(&img, 100.0).pixel(1, 1), [255, 255, 255, 128]);
//! ```

use std::sync::{Mutex, PoisonError};

use rimg_core::color::{clamp_u8, hsl_to_rgb, rgb_to_hsl};
use rimg_core::{
    for_each_row, parallel, to_nrgba, Parallelism, PixelBuffer, Scanner, SourceImage,
    BYTES_PER_PIXEL,
};
use tracing::trace;

/// Applies `f` to every pixel, producing a new canonical image.
///
/// # Example
///
/// ```rust
/// use rimg_core::PixelBuffer;
/// use rimg_ops::adjust::map_pixels;
///
/// let img = PixelBuffer::filled(3, 1, [10, 20, 30, 255]);
/// let swapped = map_pixels(&img, |[r, g, b, a]| [b, g, r, a]);
/// assert_eq!(swapped.pixel(2, 0), [30, 20, 10, 255]);
/// ```
pub fn map_pixels<F>(img: impl Into<SourceImage>, f: F) -> PixelBuffer
where
    F: Fn([u8; 4]) -> [u8; 4] + Sync,
{
    let src = to_nrgba(img);
    let mut dst = PixelBuffer::new(src.width(), src.height());
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        let src_row = src.row(y);
        for (d, s) in row.chunks_exact_mut(BYTES_PER_PIXEL).zip(src_row.chunks_exact(BYTES_PER_PIXEL)) {
            d.copy_from_slice(&f([s[0], s[1], s[2], s[3]]));
        }
    });
    dst
}

/// Builds a lookup table from a curve over `0..=255`.
fn build_lut(curve: impl Fn(f64) -> f64) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (i, v) in lut.iter_mut().enumerate() {
        *v = clamp_u8(curve(i as f64));
    }
    lut
}

/// Applies `lut` to the color channels.
fn apply_lut(img: impl Into<SourceImage>, lut: &[u8; 256]) -> PixelBuffer {
    map_pixels(img, |[r, g, b, a]| [lut[r as usize], lut[g as usize], lut[b as usize], a])
}

/// Gamma correction: `255 * (i / 255) ^ (1 / gamma)`.
///
/// Gamma 1 leaves the image unchanged; values below 1 darken, above 1
/// brighten. Gamma is floored at 1e-4.
pub fn adjust_gamma(img: impl Into<SourceImage>, gamma: f64) -> PixelBuffer {
    trace!(gamma, "adjust_gamma");
    let e = 1.0 / gamma.max(1e-4);
    let lut = build_lut(|i| (i / 255.0).powf(e) * 255.0);
    apply_lut(img, &lut)
}

/// Contrast adjustment by `percentage` in `[-100, 100]` (clamped).
///
/// 0 leaves the image unchanged, -100 flattens it to mid-gray, 100 turns it
/// into a two-level threshold at 50%.
pub fn adjust_contrast(img: impl Into<SourceImage>, percentage: f64) -> PixelBuffer {
    trace!(percentage, "adjust_contrast");
    let v = (100.0 + percentage.clamp(-100.0, 100.0)) / 100.0;
    let lut = if v < 2.0 {
        let k = if v <= 1.0 { v } else { 1.0 / (2.0 - v) };
        build_lut(|i| (0.5 + (i / 255.0 - 0.5) * k) * 255.0)
    } else {
        build_lut(|i| if i / 255.0 >= 0.5 { 255.0 } else { 0.0 })
    };
    apply_lut(img, &lut)
}

/// Brightness adjustment by `percentage` in `[-100, 100]` (clamped).
///
/// Shifts every color channel by `2.55 * percentage`: -100 gives black,
/// 100 gives white.
pub fn adjust_brightness(img: impl Into<SourceImage>, percentage: f64) -> PixelBuffer {
    trace!(percentage, "adjust_brightness");
    let shift = 255.0 * percentage.clamp(-100.0, 100.0) / 100.0;
    let lut = build_lut(|i| i + shift);
    apply_lut(img, &lut)
}

/// Saturation adjustment by `percentage` in `[-100, 500]` (clamped).
///
/// Scales HSL saturation by `1 + percentage / 100`: -100 gives gray, 0
/// leaves the image unchanged.
pub fn adjust_saturation(img: impl Into<SourceImage>, percentage: f64) -> PixelBuffer {
    trace!(percentage, "adjust_saturation");
    let k = 1.0 + percentage.clamp(-100.0, 500.0) / 100.0;
    map_pixels(img, |[r, g, b, a]| {
        let (h, s, l) = rgb_to_hsl(r, g, b);
        let [r, g, b] = hsl_to_rgb(h, (s * k).clamp(0.0, 1.0), l);
        [r, g, b, a]
    })
}

/// Rec.601 luma rounded to a histogram bin.
#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    clamp_u8(0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64)
}

/// Normalised 256-bin luminance histogram.
///
/// Bin `i` holds the fraction of pixels whose Rec.601 luma rounds to `i`;
/// the bins sum to 1. Alpha is ignored. An empty image gives all zeros.
///
/// # Example
///
/// ```rust
/// use rimg_core::PixelBuffer;
/// use rimg_ops::adjust::histogram;
///
/// let h = histogram(&PixelBuffer::filled(4, 4, [255, 255, 255, 255]));
/// assert_eq!(h[255], 1.0);
/// ```
pub fn histogram(img: impl Into<SourceImage>) -> [f64; 256] {
    let src = img.into();
    let (width, height) = (src.width(), src.height());
    trace!(width, height, "histogram");
    let mut histogram = [0.0; 256];
    if src.is_empty() {
        return histogram;
    }

    let scanner = Scanner::new(&src);
    let counts = Mutex::new([0u64; 256]);
    parallel(height as usize, |rows| {
        let mut local = [0u64; 256];
        let mut line = vec![0; width as usize * BYTES_PER_PIXEL];
        for y in rows {
            let y = y as u32;
            scanner.scan(0, y, width, y + 1, &mut line);
            for p in line.chunks_exact(BYTES_PER_PIXEL) {
                local[luma(p[0], p[1], p[2]) as usize] += 1;
            }
        }
        let mut counts = counts.lock().unwrap_or_else(PoisonError::into_inner);
        for (c, l) in counts.iter_mut().zip(local) {
            *c += l;
        }
    });

    let counts = counts.into_inner().unwrap_or_else(PoisonError::into_inner);
    let total = width as f64 * height as f64;
    for (h, c) in histogram.iter_mut().zip(counts) {
        *h = c as f64 / total;
    }
    histogram
}

/// Converts to gray with Rec.601 luma weights, keeping alpha.
pub fn grayscale(img: impl Into<SourceImage>) -> PixelBuffer {
    trace!("grayscale");
    map_pixels(img, |[r, g, b, a]| {
        let y = luma(r, g, b);
        [y, y, y, a]
    })
}

/// Inverts the color channels, keeping alpha.
pub fn invert(img: impl Into<SourceImage>) -> PixelBuffer {
    trace!("invert");
    map_pixels(img, |[r, g, b, a]| [255 - r, 255 - g, 255 - b, a])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> PixelBuffer {
        let mut img = PixelBuffer::new(256, 1);
        for x in 0..256 {
            img.set_pixel(x, 0, [x as u8, x as u8, x as u8, 200]);
        }
        img
    }

    #[test]
    fn test_identity_adjustments() {
        let img = ramp();
        assert_eq!(adjust_gamma(&img, 1.0), img);
        assert_eq!(adjust_contrast(&img, 0.0), img);
        assert_eq!(adjust_brightness(&img, 0.0), img);
        assert_eq!(invert(invert(&img)), img);
    }

    #[test]
    fn test_gamma_direction() {
        let img = ramp();
        let bright = adjust_gamma(&img, 2.0);
        let dark = adjust_gamma(&img, 0.5);
        assert!(bright.pixel(64, 0)[0] > 64);
        assert!(dark.pixel(64, 0)[0] < 64);
        assert_eq!(bright.pixel(0, 0)[0], 0);
        assert_eq!(bright.pixel(255, 0)[0], 255);
    }

    #[test]
    fn test_contrast_extremes() {
        let img = ramp();
        let flat = adjust_contrast(&img, -100.0);
        assert!(flat.pixels().all(|(_, _, p)| p[0] == 128 && p[3] == 200));
        let threshold = adjust_contrast(&img, 250.0);
        assert_eq!(threshold.pixel(127, 0)[0], 0);
        assert_eq!(threshold.pixel(128, 0)[0], 255);
    }

    #[test]
    fn test_contrast_increase_spreads() {
        let img = ramp();
        let out = adjust_contrast(&img, 50.0);
        assert!(out.pixel(64, 0)[0] < 64);
        assert!(out.pixel(192, 0)[0] > 192);
    }

    #[test]
    fn test_brightness_extremes() {
        let img = ramp();
        assert!(adjust_brightness(&img, -100.0).pixels().all(|(_, _, p)| p[..3] == [0, 0, 0]));
        assert!(adjust_brightness(&img, 150.0).pixels().all(|(_, _, p)| p[..3] == [255, 255, 255]));
    }

    #[test]
    fn test_grayscale_weights() {
        let img = PixelBuffer::filled(1, 1, [255, 0, 0, 7]);
        assert_eq!(grayscale(&img).pixel(0, 0), [76, 76, 76, 7]);
        let img = PixelBuffer::filled(1, 1, [0, 255, 0, 255]);
        assert_eq!(grayscale(&img).pixel(0, 0), [150, 150, 150, 255]);
    }

    #[test]
    fn test_saturation() {
        // hsl(20, 0.6, 0.49)
        let img = PixelBuffer::filled(2, 1, [200, 100, 50, 90]);
        let gray = adjust_saturation(&img, -100.0);
        assert!(gray.pixels().all(|(_, _, p)| p == [125, 125, 125, 90]));
        let same = adjust_saturation(&img, 0.0).pixel(0, 0);
        for (a, b) in same.iter().zip([200u8, 100, 50, 90]) {
            assert!(a.abs_diff(b) <= 1);
        }
        let vivid = adjust_saturation(&img, 300.0).pixel(1, 0);
        assert_eq!(vivid, [250, 83, 0, 90]);
    }

    fn quad(pixels: [[u8; 4]; 4]) -> PixelBuffer {
        let mut img = PixelBuffer::new(2, 2);
        for (i, p) in pixels.into_iter().enumerate() {
            img.set_pixel(i as u32 % 2, i as u32 / 2, p);
        }
        img
    }

    #[test]
    fn test_histogram_grayscale() {
        let img = quad([[0, 0, 0, 255], [255, 255, 255, 255], [255, 255, 255, 255], [128, 128, 128, 255]]);
        let mut want = [0.0; 256];
        want[0x00] = 0.25;
        want[0x80] = 0.25;
        want[0xff] = 0.5;
        assert_eq!(histogram(&img), want);
    }

    #[test]
    fn test_histogram_colorful() {
        let img = quad([
            [0x00, 0x00, 0x00, 0xff],
            [0x33, 0x44, 0x55, 0xff],
            [0x55, 0x44, 0x33, 0xff],
            [0x77, 0x66, 0x55, 0xff],
        ]);
        let mut want = [0.0; 256];
        for bin in [0x00, 0x41, 0x47, 0x69] {
            want[bin] = 0.25;
        }
        assert_eq!(histogram(&img), want);
    }

    #[test]
    fn test_histogram_empty() {
        assert_eq!(histogram(PixelBuffer::empty()), [0.0; 256]);
    }

    #[test]
    fn test_histogram_sums_to_one() {
        let img = ramp();
        let h = histogram(&img);
        assert!((h.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(h.iter().all(|&v| v == 1.0 / 256.0));
    }
}
