//! Geometric transformation operations.
//!
//! Crop, paste, flip and quarter-turn rotations. None of them resample:
//! every output pixel comes from one source pixel (or, for [`overlay`], one
//! pixel of each layer), and outputs always start at (0, 0).
//!
//! # Operations
//!
//! - [`crop`], [`crop_center`] - Extract a region (only that region is scanned)
//! - [`paste`], [`paste_center`] - Copy one image over another
//! - [`overlay`] - Alpha-composite one image over another
//! - [`flip_h`], [`flip_v`] - Mirror
//! - [`rotate90`], [`rotate180`], [`rotate270`] - Counter-clockwise quarter turns
//! - [`transpose`], [`transverse`] - Diagonal mirrors
//!
//! # Example
//!
//! ```rust
//! use rimg_core::{PixelBuffer, Rect};
//! use rimg_ops::transform::{crop, rotate90};
//!
//! let mut img = PixelBuffer::new(4, 2);
//! img.set_pixel(3, 0, [255, 0, 0, 255]);
//!
//! // top-right corner moves to top-left under a counter-clockwise turn
//! let turned = rotate90(&img);
//! assert_eq!(turned.dimensions(), (2, 4));
//! assert_eq!(turned.pixel(0, 0), [255, 0, 0, 255]);
//!
//! let part = crop(&img, Rect::new(2, 0, 10, 10));
//! assert_eq!(part.dimensions(), (2, 2));
//! ```

use rimg_core::color::clamp_u8;
use rimg_core::{
    copy_region, for_each_row, to_nrgba, Parallelism, PixelBuffer, Point, Rect, Scanner,
    SourceImage, BYTES_PER_PIXEL,
};
use tracing::{debug, trace};

/// Crops the region `rect`, given in the source's own (absolute) coordinates.
///
/// The region is intersected with the source bounds; an empty intersection
/// yields an empty buffer.
pub fn crop(img: impl Into<SourceImage>, rect: Rect) -> PixelBuffer {
    let src = img.into();
    let bounds = src.bounds();
    trace!(%bounds, %rect, "crop");
    let Some(r) = bounds.intersect(&rect) else {
        debug!(%bounds, %rect, "crop: no overlap, returning empty buffer");
        return PixelBuffer::empty();
    };
    let x1 = (r.x - bounds.x) as u32;
    let y1 = (r.y - bounds.y) as u32;
    copy_region(&src, x1, y1, x1 + r.width, y1 + r.height)
}

/// Crops a `width x height` region centred on the source.
///
/// The centre is `min + size / 2` (integer division); a region larger than
/// the source is clipped to it.
pub fn crop_center(img: impl Into<SourceImage>, width: u32, height: u32) -> PixelBuffer {
    let src = img.into();
    let b = src.bounds();
    let cx = b.x + (b.width / 2) as i32;
    let cy = b.y + (b.height / 2) as i32;
    let rect = Rect::new(
        cx.saturating_sub((width / 2) as i32),
        cy.saturating_sub((height / 2) as i32),
        width,
        height,
    );
    crop(src, rect)
}

/// Copies `img` over `background` with its top-left corner at `pos`.
///
/// `pos` is in the background's own coordinates. Pixels are replaced, not
/// blended; parts of `img` outside the background are dropped.
pub fn paste(background: impl Into<SourceImage>, img: impl Into<SourceImage>, pos: Point) -> PixelBuffer {
    let background = background.into();
    let img = img.into();
    let bg = background.bounds();
    trace!(%bg, x = pos.x, y = pos.y, "paste");

    let mut dst = to_nrgba(background);
    let placed = Rect::new(pos.x, pos.y, img.width(), img.height());
    let Some(r) = bg.intersect(&placed) else {
        debug!("paste: no overlap");
        return dst;
    };

    let scanner = Scanner::new(&img);
    let sx = (r.x - pos.x) as u32;
    let sy = (r.y - pos.y) as u32;
    let dx = (r.x - bg.x) as usize * BYTES_PER_PIXEL;
    let dy = (r.y - bg.y) as u32;
    let len = r.width as usize * BYTES_PER_PIXEL;
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        if y < dy || y >= dy + r.height {
            return;
        }
        let src_y = sy + (y - dy);
        scanner.scan(sx, src_y, sx + r.width, src_y + 1, &mut row[dx..dx + len]);
    });
    dst
}

/// Pastes `img` centred over `background`.
pub fn paste_center(background: impl Into<SourceImage>, img: impl Into<SourceImage>) -> PixelBuffer {
    let background = background.into();
    let img = img.into();
    let b = background.bounds();
    let pos = Point::new(
        b.x + (b.width / 2) as i32 - (img.width() / 2) as i32,
        b.y + (b.height / 2) as i32 - (img.height() / 2) as i32,
    );
    paste(background, img, pos)
}

/// Composites `img` over `background` with its top-left corner at `pos`.
///
/// `opacity` (clamped to `[0, 1]`, NaN as 0) scales the alpha of `img`.
/// Colors are mixed in proportion to the effective alpha of each layer;
/// where both layers are fully transparent the background is kept.
pub fn overlay(
    background: impl Into<SourceImage>,
    img: impl Into<SourceImage>,
    pos: Point,
    opacity: f64,
) -> PixelBuffer {
    let background = background.into();
    let img = img.into();
    let opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    let bg = background.bounds();
    trace!(%bg, x = pos.x, y = pos.y, opacity, "overlay");

    let mut dst = to_nrgba(background);
    let placed = Rect::new(pos.x, pos.y, img.width(), img.height());
    let Some(r) = bg.intersect(&placed) else {
        debug!("overlay: no overlap");
        return dst;
    };

    let scanner = Scanner::new(&img);
    let sx = (r.x - pos.x) as u32;
    let sy = (r.y - pos.y) as u32;
    let dx = (r.x - bg.x) as usize * BYTES_PER_PIXEL;
    let dy = (r.y - bg.y) as u32;
    let len = r.width as usize * BYTES_PER_PIXEL;
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        if y < dy || y >= dy + r.height {
            return;
        }
        let src_y = sy + (y - dy);
        let mut line = vec![0; len];
        scanner.scan(sx, src_y, sx + r.width, src_y + 1, &mut line);
        for (d, s) in row[dx..dx + len].chunks_exact_mut(BYTES_PER_PIXEL).zip(line.chunks_exact(BYTES_PER_PIXEL)) {
            let px = blend([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
            d.copy_from_slice(&px);
        }
    });
    dst
}

/// Source-over blend of `top` (alpha scaled by `opacity`) onto `bottom`.
#[inline]
fn blend(bottom: [u8; 4], top: [u8; 4], opacity: f64) -> [u8; 4] {
    let a1 = bottom[3] as f64;
    let a2 = top[3] as f64;
    let k2 = opacity * a2 / 255.0;
    let k1 = (1.0 - k2) * a1 / 255.0;
    let sum = k1 + k2;
    if sum == 0.0 {
        return bottom;
    }
    let mix = |c1: u8, c2: u8| clamp_u8((c1 as f64 * k1 + c2 as f64 * k2) / sum);
    [
        mix(bottom[0], top[0]),
        mix(bottom[1], top[1]),
        mix(bottom[2], top[2]),
        clamp_u8(a1 + a2 * opacity * (255.0 - a1) / 255.0),
    ]
}

/// Builds a `dst_w x dst_h` image whose pixel (x, y) is source pixel
/// `map(x, y)`.
fn remap<F>(src: &PixelBuffer, dst_w: u32, dst_h: u32, map: F) -> PixelBuffer
where
    F: Fn(u32, u32) -> (u32, u32) + Sync,
{
    let mut dst = PixelBuffer::new(dst_w, dst_h);
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        for (x, px) in row.chunks_exact_mut(BYTES_PER_PIXEL).enumerate() {
            let (sx, sy) = map(x as u32, y);
            px.copy_from_slice(&src.pixel(sx, sy));
        }
    });
    dst
}

/// Mirrors an image left to right.
pub fn flip_h(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "flip_h");
    remap(&src, w, h, |x, y| (w - 1 - x, y))
}

/// Mirrors an image top to bottom.
pub fn flip_v(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "flip_v");
    let mut dst = PixelBuffer::new(w, h);
    for_each_row(&Parallelism::global(), &mut dst, |y, row| {
        row.copy_from_slice(src.row(h - 1 - y));
    });
    dst
}

/// Rotates an image 90 degrees counter-clockwise.
pub fn rotate90(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "rotate90");
    remap(&src, h, w, |x, y| (w - 1 - y, x))
}

/// Rotates an image 180 degrees.
pub fn rotate180(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "rotate180");
    remap(&src, w, h, |x, y| (w - 1 - x, h - 1 - y))
}

/// Rotates an image 270 degrees counter-clockwise (90 clockwise).
pub fn rotate270(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "rotate270");
    remap(&src, h, w, |x, y| (y, h - 1 - x))
}

/// Mirrors an image across its main diagonal (top-left to bottom-right).
pub fn transpose(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "transpose");
    remap(&src, h, w, |x, y| (y, x))
}

/// Mirrors an image across its anti-diagonal (top-right to bottom-left).
pub fn transverse(img: impl Into<SourceImage>) -> PixelBuffer {
    let src = to_nrgba(img);
    let (w, h) = src.dimensions();
    trace!(w, h, "transverse");
    remap(&src, h, w, |x, y| (w - 1 - y, h - 1 - x))
}
