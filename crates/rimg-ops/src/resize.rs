//! Separable image resampling.
//!
//! [`resize`] scales an image with any [`Filter`] in two one-dimensional
//! passes: horizontal first, then vertical. A pass is skipped when its
//! dimension does not change.
//!
//! # Sampling
//!
//! Destination coordinate `d` maps to source coordinate
//! `f = (d + 0.5) * scale - 0.5` (pixel centres aligned), with
//! `scale = src / dst`. The kernel is widened by `max(scale, 1)` so that
//! downsampling averages over the whole footprint, and contributes over the
//! inclusive window `[ceil(f - r), floor(f + r)]`, clamped to the source,
//! where `r = ceil(max(scale, 1) * support)`. Weights are normalised by
//! their sum over the clamped window.
//!
//! Color channels are accumulated weighted by alpha, so fully transparent
//! pixels never bleed their (meaningless) color into neighbours.
//!
//! # Example
//!
//! ```rust
//! use rimg_core::PixelBuffer;
//! use rimg_ops::{resize, Filter};
//!
//! let src = PixelBuffer::filled(64, 32, [10, 20, 30, 255]);
//! let dst = resize(&src, 16, 0, Filter::Lanczos);
//! assert_eq!(dst.dimensions(), (16, 8));
//! assert_eq!(dst.pixel(7, 3), [10, 20, 30, 255]);
//! ```

use crate::filter::Filter;
use crate::transform::crop_center;
use rimg_core::color::clamp_u8;
use rimg_core::{
    clone_image, for_each_row, parallel_with, to_nrgba, DisjointSlice, Parallelism, PixelBuffer,
    SourceImage, BYTES_PER_PIXEL,
};
use tracing::{debug, trace};

/// Per-axis source window of a one-dimensional convolution pass.
///
/// For every destination index the window yields the first contributing
/// source index and one weight per contributing index.
pub(crate) trait Window: Sync {
    /// Upper bound on the number of weights [`fill`](Self::fill) produces.
    fn max_len(&self) -> usize;

    /// Replaces `weights` with the window of destination index `d` and
    /// returns the first source index it covers.
    fn fill(&self, d: usize, weights: &mut Vec<f64>) -> usize;
}

/// Resampling window for a filter at a given scale.
pub(crate) struct ResampleWindow {
    filter: Filter,
    src_len: usize,
    scale: f64,
    kernel_scale: f64,
    radius: f64,
}

impl ResampleWindow {
    pub(crate) fn new(filter: Filter, src_len: usize, dst_len: usize) -> Self {
        let scale = src_len as f64 / dst_len as f64;
        let kernel_scale = scale.max(1.0);
        Self {
            filter,
            src_len,
            scale,
            kernel_scale,
            radius: (kernel_scale * filter.support()).ceil(),
        }
    }
}

impl Window for ResampleWindow {
    fn max_len(&self) -> usize {
        (self.radius as usize + 1) * 2
    }

    fn fill(&self, d: usize, weights: &mut Vec<f64>) -> usize {
        weights.clear();
        let f = (d as f64 + 0.5) * self.scale - 0.5;
        let start = (f - self.radius).ceil().max(0.0) as usize;
        let end = (f + self.radius).floor().min((self.src_len - 1) as f64);
        if end < 0.0 {
            return start;
        }
        for k in start..=end as usize {
            weights.push(self.filter.kernel((k as f64 - f) / self.kernel_scale));
        }
        start
    }
}

/// Computes the destination size of a resize, deriving a zero side from the
/// source aspect ratio.
///
/// Returns `None` for negative sizes, for both sides zero, or for an empty
/// source.
///
/// # Example
///
/// ```rust
/// use rimg_ops::resize::resize_dimensions;
///
/// assert_eq!(resize_dimensions(200, 100, 50, 0), Some((50, 25)));
/// assert_eq!(resize_dimensions(200, 100, 0, 1), Some((2, 1)));
/// assert_eq!(resize_dimensions(200, 100, 0, 0), None);
/// assert_eq!(resize_dimensions(200, 100, -5, 10), None);
/// ```
pub fn resize_dimensions(src_w: u32, src_h: u32, width: i32, height: i32) -> Option<(u32, u32)> {
    if width < 0 || height < 0 || (width == 0 && height == 0) || src_w == 0 || src_h == 0 {
        return None;
    }
    let w = if width == 0 { derive_side(height as u32, src_w, src_h) } else { width as u32 };
    let h = if height == 0 { derive_side(width as u32, src_h, src_w) } else { height as u32 };
    Some((w, h))
}

/// `max(1, round(other * num / den))`, the side derived from an aspect ratio.
#[inline]
fn derive_side(other: u32, num: u32, den: u32) -> u32 {
    let v = (other as f64 * num as f64 / den as f64 + 0.5).floor();
    v.clamp(1.0, u32::MAX as f64) as u32
}

/// Resizes an image to `width x height` using `filter`.
///
/// One of `width`, `height` may be 0: it is then derived from the source
/// aspect ratio (at least 1). Negative sizes, both sizes 0, or an empty source
/// yield an empty buffer. Resizing to the source size returns the source
/// unchanged (sharing storage with a canonical input).
///
/// Uses the process-wide [`Parallelism`].
pub fn resize(img: impl Into<SourceImage>, width: i32, height: i32, filter: Filter) -> PixelBuffer {
    resize_with(&Parallelism::global(), img, width, height, filter)
}

/// [`resize`] with an explicit partitioning configuration.
pub fn resize_with(
    par: &Parallelism,
    img: impl Into<SourceImage>,
    width: i32,
    height: i32,
    filter: Filter,
) -> PixelBuffer {
    let src = img.into();
    let (src_w, src_h) = (src.width(), src.height());
    trace!(src_w, src_h, width, height, filter = filter.name(), "resize");

    let Some((dst_w, dst_h)) = resize_dimensions(src_w, src_h, width, height) else {
        debug!(src_w, src_h, width, height, "resize: degenerate size, returning empty buffer");
        return PixelBuffer::empty();
    };

    let buf = to_nrgba(src);
    if (dst_w, dst_h) == (src_w, src_h) {
        debug!(dst_w, dst_h, "resize: size unchanged");
        return buf;
    }

    if filter.is_nearest() {
        return resize_nearest(par, &buf, dst_w, dst_h);
    }

    let buf = if dst_w != src_w {
        horizontal_pass(par, &buf, dst_w, &ResampleWindow::new(filter, src_w as usize, dst_w as usize))
    } else {
        debug!("resize: horizontal pass skipped");
        buf
    };
    if dst_h != src_h {
        vertical_pass(par, &buf, dst_h, &ResampleWindow::new(filter, src_h as usize, dst_h as usize))
    } else {
        debug!("resize: vertical pass skipped");
        buf
    }
}

/// Source index nearest to destination index `d`: `round(f)`, clamped.
#[inline]
fn nearest_index(d: u32, scale: f64, src_len: u32) -> u32 {
    let f = (d as f64 + 0.5) * scale - 0.5;
    ((f + 0.5).floor().max(0.0) as u32).min(src_len - 1)
}

/// Nearest-neighbor resize: a direct copy through precomputed index maps.
fn resize_nearest(par: &Parallelism, src: &PixelBuffer, dst_w: u32, dst_h: u32) -> PixelBuffer {
    let (src_w, src_h) = src.dimensions();
    debug!(src_w, src_h, dst_w, dst_h, "resize: nearest-neighbor path");
    let sx = src_w as f64 / dst_w as f64;
    let sy = src_h as f64 / dst_h as f64;
    let x_map: Vec<usize> = (0..dst_w)
        .map(|x| nearest_index(x, sx, src_w) as usize * BYTES_PER_PIXEL)
        .collect();

    let mut dst = PixelBuffer::new(dst_w, dst_h);
    for_each_row(par, &mut dst, |y, row| {
        let src_row = src.row(nearest_index(y, sy, src_h));
        for (px, &i) in row.chunks_exact_mut(BYTES_PER_PIXEL).zip(&x_map) {
            px.copy_from_slice(&src_row[i..i + BYTES_PER_PIXEL]);
        }
    });
    dst
}

/// Weighted sum of `pixels`, alpha-weighted for color.
#[inline]
fn convolve<'a>(weights: &[f64], pixels: impl Iterator<Item = &'a [u8]>) -> [u8; 4] {
    let (mut r, mut g, mut b, mut a, mut total) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for (&w, p) in weights.iter().zip(pixels) {
        let wa = w * p[3] as f64;
        r += wa * p[0] as f64;
        g += wa * p[1] as f64;
        b += wa * p[2] as f64;
        a += wa;
        total += w;
    }
    if a == 0.0 || total == 0.0 {
        return [0, 0, 0, 0];
    }
    [clamp_u8(r / a), clamp_u8(g / a), clamp_u8(b / a), clamp_u8(a / total)]
}

/// Convolves every row of `src` along X into `dst_w` columns.
///
/// Destination columns are partitioned; each chunk owns its weight scratch.
pub(crate) fn horizontal_pass<W: Window>(
    par: &Parallelism,
    src: &PixelBuffer,
    dst_w: u32,
    window: &W,
) -> PixelBuffer {
    let height = src.height();
    trace!(src_w = src.width(), dst_w, height, "resize::horizontal");

    let mut dst = PixelBuffer::new(dst_w, height);
    let stride = dst.stride();
    let out = DisjointSlice::new(dst.data_mut());
    parallel_with(par, dst_w as usize, |columns| {
        let mut weights = Vec::with_capacity(window.max_len());
        for x in columns {
            let start = window.fill(x, &mut weights) * BYTES_PER_PIXEL;
            for y in 0..height {
                let row = &src.row(y)[start..];
                let px = convolve(&weights, row.chunks_exact(BYTES_PER_PIXEL));
                let i = y as usize * stride + x * BYTES_PER_PIXEL;
                // SAFETY: column x belongs to exactly one chunk, so pixel
                // (x, y) is written once.
                unsafe { out.slice_mut(i..i + BYTES_PER_PIXEL) }.copy_from_slice(&px);
            }
        }
    });
    dst
}

/// Convolves every column of `src` along Y into `dst_h` rows.
///
/// Destination rows are partitioned; each chunk owns its weight scratch.
pub(crate) fn vertical_pass<W: Window>(
    par: &Parallelism,
    src: &PixelBuffer,
    dst_h: u32,
    window: &W,
) -> PixelBuffer {
    let width = src.width();
    trace!(src_h = src.height(), dst_h, width, "resize::vertical");

    let mut dst = PixelBuffer::new(width, dst_h);
    let stride = dst.stride();
    let row_len = width as usize * BYTES_PER_PIXEL;
    let out = DisjointSlice::new(dst.data_mut());
    parallel_with(par, dst_h as usize, |rows| {
        let mut weights = Vec::with_capacity(window.max_len());
        for y in rows {
            let start = window.fill(y, &mut weights);
            // SAFETY: row y belongs to exactly one chunk.
            let row = unsafe { out.slice_mut(y * stride..y * stride + row_len) };
            for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
                let i = x * BYTES_PER_PIXEL;
                let column = (start..start + weights.len()).map(|k| &src.row(k as u32)[i..i + BYTES_PER_PIXEL]);
                px.copy_from_slice(&convolve(&weights, column));
            }
        }
    });
    dst
}

/// Computes the largest size within `max_w x max_h` that keeps the
/// `src_w:src_h` aspect ratio, without enlarging.
///
/// Returns the source size when it already fits. The limiting side takes
/// the box size; the other is truncated (never exceeding the box), with a
/// floor of 1.
///
/// # Example
///
/// ```rust
/// use rimg_ops::fit_dimensions;
///
/// assert_eq!(fit_dimensions(1920, 1080, 800, 800), (800, 450));
/// assert_eq!(fit_dimensions(100, 50, 800, 800), (100, 50));
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w <= max_w && src_h <= max_h {
        return (src_w, src_h);
    }
    let (sw, sh) = (src_w as u64, src_h as u64);
    if sw * max_h as u64 > max_w as u64 * sh {
        let h = (max_w as u64 * sh / sw) as u32;
        (max_w, h.clamp(1, max_h))
    } else {
        let w = (max_h as u64 * sw / sh) as u32;
        (w.clamp(1, max_w), max_h)
    }
}

/// Computes the smallest size covering `width x height` that keeps the
/// `src_w:src_h` aspect ratio.
///
/// The relatively short side takes the target size exactly; the other is
/// derived the way [`resize`] derives a 0 side.
///
/// # Example
///
/// ```rust
/// use rimg_ops::fill_dimensions;
///
/// assert_eq!(fill_dimensions(1920, 1080, 100, 100), (178, 100));
/// assert_eq!(fill_dimensions(1080, 1920, 100, 100), (100, 178));
/// ```
pub fn fill_dimensions(src_w: u32, src_h: u32, width: u32, height: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 {
        return (width, height);
    }
    if src_w as u64 * height as u64 > width as u64 * src_h as u64 {
        (derive_side(height, src_w, src_h), height)
    } else {
        (width, derive_side(width, src_h, src_w))
    }
}

/// Scales an image down to fit within `max_w x max_h`, keeping its aspect
/// ratio.
///
/// An image that already fits is returned as an unmodified copy. A
/// non-positive box or an empty source yields an empty buffer.
pub fn fit(img: impl Into<SourceImage>, max_w: i32, max_h: i32, filter: Filter) -> PixelBuffer {
    let src = img.into();
    trace!(src_w = src.width(), src_h = src.height(), max_w, max_h, filter = filter.name(), "fit");
    if max_w <= 0 || max_h <= 0 || src.is_empty() {
        debug!(max_w, max_h, "fit: degenerate box, returning empty buffer");
        return PixelBuffer::empty();
    }

    let (src_w, src_h) = (src.width(), src.height());
    let (w, h) = fit_dimensions(src_w, src_h, max_w as u32, max_h as u32);
    if (w, h) == (src_w, src_h) {
        return clone_image(&src);
    }
    resize(src, w as i32, h as i32, filter)
}

/// Scales and centre-crops an image to exactly `width x height`.
///
/// The image is first resized to cover the target, then cropped around its
/// centre. A non-positive size or an empty source yields an empty buffer.
pub fn thumbnail(img: impl Into<SourceImage>, width: i32, height: i32, filter: Filter) -> PixelBuffer {
    let src = img.into();
    trace!(src_w = src.width(), src_h = src.height(), width, height, filter = filter.name(), "thumbnail");
    if width <= 0 || height <= 0 || src.is_empty() {
        debug!(width, height, "thumbnail: degenerate size, returning empty buffer");
        return PixelBuffer::empty();
    }

    let (w, h) = fill_dimensions(src.width(), src.height(), width as u32, height as u32);
    let covered = resize(src, w as i32, h as i32, filter);
    crop_center(covered, width as u32, height as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_clamped_at_edges() {
        let w = ResampleWindow::new(Filter::Lanczos, 10, 10);
        let mut weights = Vec::new();
        assert_eq!(w.fill(0, &mut weights), 0);
        assert_eq!(weights.len(), 4);
        assert_eq!(w.fill(9, &mut weights), 6);
        assert_eq!(weights.len(), 4);
        assert_eq!(w.fill(5, &mut weights), 2);
        assert_eq!(weights.len(), 7);
        assert!(weights.len() <= w.max_len());
    }

    #[test]
    fn test_window_widens_when_downsampling() {
        let w = ResampleWindow::new(Filter::Linear, 100, 10);
        let mut weights = Vec::new();
        let start = w.fill(5, &mut weights);
        // f = 54.5, r = 10
        assert_eq!(start, 45);
        assert_eq!(weights.len(), 20);
        assert!(weights.len() <= w.max_len());
    }

    #[test]
    fn test_nearest_index_rounds_centres() {
        // 4 -> 2: f = 0.5 and 2.5, rounded half up
        assert_eq!(nearest_index(0, 2.0, 4), 1);
        assert_eq!(nearest_index(1, 2.0, 4), 3);
        // 2 -> 4: f = -0.25, 0.25, 0.75, 1.25
        let idx: Vec<u32> = (0..4).map(|d| nearest_index(d, 0.5, 2)).collect();
        assert_eq!(idx, [0, 0, 1, 1]);
    }

    #[test]
    fn test_convolve_ignores_transparent_color() {
        let px = [[200, 0, 0, 0], [0, 0, 255, 255]];
        let out = convolve(&[1.0, 1.0], px.iter().map(|p| &p[..]));
        assert_eq!(out, [0, 0, 255, 128]);
    }

    #[test]
    fn test_convolve_all_transparent() {
        let px = [[200, 10, 0, 0], [0, 0, 255, 0]];
        assert_eq!(convolve(&[0.5, 0.5], px.iter().map(|p| &p[..])), [0, 0, 0, 0]);
    }

    #[test]
    fn test_resize_dimensions_floor_of_one() {
        assert_eq!(resize_dimensions(1000, 10, 0, 1), Some((100, 1)));
        assert_eq!(resize_dimensions(10, 1000, 1, 0), Some((1, 100)));
        assert_eq!(resize_dimensions(10, 1000, 0, 1), Some((1, 1)));
        assert_eq!(resize_dimensions(0, 10, 5, 5), None);
    }

    #[test]
    fn test_fit_dimensions_keeps_within_box() {
        assert_eq!(fit_dimensions(300, 100, 100, 100), (100, 33));
        assert_eq!(fit_dimensions(100, 300, 100, 100), (33, 100));
        assert_eq!(fit_dimensions(10000, 1, 100, 100), (100, 1));
    }
}
