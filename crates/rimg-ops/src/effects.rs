//! Image effects: Gaussian blur, sharpening and pixelation.
//!
//! Blur and sharpen reuse the resampler's separable convolution passes at a
//! fixed 1:1 scale, with a Gaussian window of radius `ceil(3σ)` and weights
//! `exp(-x² / 2σ²)`. Near the image edges the window is clamped and the
//! weights renormalised, so a constant image stays constant.
//!
//! # Example
//!
//! ```rust
//! use rimg_core::PixelBuffer;
//! use rimg_ops::{blur, sharpen};
//!
//! let img = PixelBuffer::filled(32, 32, [100, 150, 200, 255]);
//! assert_eq!(blur(&img, 2.0), img);
//! assert_eq!(sharpen(&img, 2.0), img);
//! ```

use crate::resize::{horizontal_pass, vertical_pass, Window};
use rimg_core::{
    clone_image, for_each_row, to_nrgba, Parallelism, PixelBuffer, SourceImage, BYTES_PER_PIXEL,
};
use tracing::{debug, trace};

/// Replaces every `block_size x block_size` block with the color of its
/// centre pixel.
///
/// Blocks are aligned to the top-left corner; the centre of a partial block
/// at the right or bottom edge is clamped into the image. `block_size <= 1`
/// returns an unmodified copy.
pub fn pixelate(img: impl Into<SourceImage>, block_size: u32) -> PixelBuffer {
    let src = img.into();
    trace!(width = src.width(), height = src.height(), block_size, "pixelate");
    if block_size <= 1 || src.is_empty() {
        debug!(block_size, "pixelate: no-op, returning copy");
        return clone_image(&src);
    }

    let src = to_nrgba(src);
    let (w, h) = src.dimensions();
    let half = block_size / 2;
    let centre = |v: u32, len: u32| ((v / block_size) * block_size + half).min(len - 1);
    let mut dst = PixelBuffer::new(w, h);
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        let src_row = src.row(centre(y, h));
        for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let i = centre(x as u32, w) as usize * BYTES_PER_PIXEL;
            px.copy_from_slice(&src_row[i..i + BYTES_PER_PIXEL]);
        }
    });
    dst
}

/// Gaussian convolution window over one axis, destination and source the
/// same length.
///
/// The radius is capped at `len - 1`: past that every tap is clamped away.
pub(crate) struct GaussianWindow {
    len: usize,
    radius: usize,
    sigma: f64,
}

impl GaussianWindow {
    pub(crate) fn new(len: usize, sigma: f64) -> Self {
        let max_radius = len.saturating_sub(1);
        Self {
            len,
            radius: (sigma * 3.0).ceil().clamp(0.0, max_radius as f64) as usize,
            sigma,
        }
    }
}

impl Window for GaussianWindow {
    fn max_len(&self) -> usize {
        2 * self.radius + 1
    }

    fn fill(&self, d: usize, weights: &mut Vec<f64>) -> usize {
        weights.clear();
        let start = d.saturating_sub(self.radius);
        let end = (d + self.radius).min(self.len - 1);
        for k in start..=end {
            let x = k as f64 - d as f64;
            weights.push((-(x / self.sigma).powi(2) / 2.0).exp());
        }
        start
    }
}

/// Returns true when `sigma` describes an actual Gaussian.
#[inline]
fn is_blur_sigma(sigma: f64) -> bool {
    sigma > 0.0 && sigma.is_finite()
}

/// Blurs an image with a Gaussian of standard deviation `sigma`.
///
/// A non-positive, NaN or infinite `sigma` returns an unmodified copy.
pub fn blur(img: impl Into<SourceImage>, sigma: f64) -> PixelBuffer {
    let src = img.into();
    trace!(width = src.width(), height = src.height(), sigma, "blur");
    if !is_blur_sigma(sigma) || src.is_empty() {
        debug!(sigma, "blur: no-op, returning copy");
        return clone_image(&src);
    }
    gaussian(&Parallelism::global(), &to_nrgba(src), sigma)
}

fn gaussian(par: &Parallelism, buf: &PixelBuffer, sigma: f64) -> PixelBuffer {
    let (width, height) = buf.dimensions();
    let tmp = horizontal_pass(par, buf, width, &GaussianWindow::new(width as usize, sigma));
    vertical_pass(par, &tmp, height, &GaussianWindow::new(height as usize, sigma))
}

/// Sharpens an image: `2 * original - blurred`, per channel, clamped.
///
/// A non-positive, NaN or infinite `sigma` returns an unmodified copy.
pub fn sharpen(img: impl Into<SourceImage>, sigma: f64) -> PixelBuffer {
    let src = img.into();
    trace!(width = src.width(), height = src.height(), sigma, "sharpen");
    if !is_blur_sigma(sigma) || src.is_empty() {
        debug!(sigma, "sharpen: no-op, returning copy");
        return clone_image(&src);
    }

    let par = Parallelism::global();
    let orig = to_nrgba(src);
    let blurred = gaussian(&par, &orig, sigma);
    let mut dst = PixelBuffer::new(orig.width(), orig.height());
    for_each_row(&par, &mut dst, |y, row| {
        let o = orig.row(y);
        let b = blurred.row(y);
        for (i, v) in row.iter_mut().enumerate() {
            *v = (2 * o[i] as i32 - b[i] as i32).clamp(0, 255) as u8;
        }
    });
    dst
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gaussian_window_clamped() {
        let w = GaussianWindow::new(10, 1.0);
        assert_eq!(w.max_len(), 7);
        let mut weights = Vec::new();
        assert_eq!(w.fill(0, &mut weights), 0);
        assert_eq!(weights.len(), 4);
        assert_eq!(weights[0], 1.0);
        assert_eq!(w.fill(9, &mut weights), 6);
        assert_eq!(weights.len(), 4);
        assert_eq!(weights[3], 1.0);
        assert_eq!(w.fill(5, &mut weights), 2);
        assert_eq!(weights.len(), 7);
    }

    #[test]
    fn test_gaussian_window_radius_capped() {
        let w = GaussianWindow::new(4, 1e20);
        assert_eq!(w.max_len(), 7);
        let mut weights = Vec::new();
        assert_eq!(w.fill(3, &mut weights), 0);
        assert_eq!(weights, [1.0; 4]);
    }

    #[test]
    fn test_blur_huge_sigma_averages() {
        let mut img = PixelBuffer::new(2, 1);
        img.set_pixel(0, 0, [0, 0, 0, 255]);
        img.set_pixel(1, 0, [255, 255, 255, 255]);
        let out = blur(&img, 1e20);
        assert_eq!(out.pixel(0, 0), [128, 128, 128, 255]);
        assert_eq!(out.pixel(1, 0), [128, 128, 128, 255]);

        let flat = PixelBuffer::filled(4, 4, [100, 150, 200, 255]);
        assert_eq!(blur(&flat, 1e20), flat);
        assert_eq!(sharpen(&flat, 1e12), flat);
    }

    #[test]
    fn test_tiny_sigma_is_identity() {
        let mut img = PixelBuffer::filled(4, 4, [100, 150, 200, 255]);
        img.set_pixel(1, 1, [10, 20, 30, 40]);
        assert_eq!(blur(&img, 1e-200), img);
        assert_eq!(sharpen(&img, 1e-200), img);
    }

    #[test]
    fn test_non_finite_sigma_returns_copy() {
        let img = PixelBuffer::filled(4, 4, [100, 150, 200, 255]);
        for sigma in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let b = blur(&img, sigma);
            let s = sharpen(&img, sigma);
            assert_eq!(b, img);
            assert_eq!(s, img);
            assert!(!b.shares_storage(&img));
        }
    }

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut img = PixelBuffer::filled(9, 9, [0, 0, 0, 255]);
        img.set_pixel(4, 4, [255, 255, 255, 255]);
        let out = blur(&img, 1.0);
        let center = out.pixel(4, 4)[0];
        assert!(center > 0 && center < 255);
        assert!(out.pixel(3, 4)[0] > 0);
        assert!(out.pixel(3, 4)[0] < center);
        assert_eq!(out.pixel(4, 4)[3], 255);
    }

    #[test]
    fn test_sharpen_increases_edge_contrast() {
        let mut img = PixelBuffer::filled(8, 1, [64, 64, 64, 255]);
        for x in 4..8 {
            img.set_pixel(x, 0, [192, 192, 192, 255]);
        }
        let out = sharpen(&img, 1.0);
        assert!(out.pixel(3, 0)[0] < 64);
        assert!(out.pixel(4, 0)[0] > 192);
        assert_eq!(out.pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_pixelate_uses_block_centres() {
        let mut img = PixelBuffer::new(5, 1);
        for x in 0..5 {
            img.set_pixel(x, 0, [x as u8 * 10, 0, 0, 255]);
        }
        let out = pixelate(&img, 2);
        let reds: Vec<u8> = (0..5).map(|x| out.pixel(x, 0)[0]).collect();
        // blocks [0,1], [2,3], [4]; centres 1, 3 and 4 (clamped)
        assert_eq!(reds, [10, 10, 30, 30, 40]);
        assert_eq!(pixelate(&img, 1), img);
    }
}
