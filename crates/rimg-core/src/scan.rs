//! Region scanning: any [`SourceImage`] to canonical RGBA bytes.
//!
//! [`Scanner`] reads a rectangular region of a source and writes it as
//! tightly packed non-premultiplied 8-bit RGBA. Coordinates passed to
//! [`Scanner::scan`] are relative to the source origin, so callers treat
//! every source as if it started at (0, 0).
//!
//! # Dispatch
//!
//! The read path is chosen once, when the scanner is built:
//!
//! | Source | Path |
//! |--------|------|
//! | canonical buffer | row copy |
//! | packed RGBA / gray formats | per-format row converter |
//! | YCbCr | inline conversion, chroma looked up per pixel |
//! | paletted | palette converted once, then indexed |
//! | anything else | per-pixel [`PixelSource::rgba64`] |
//!
//! All fast paths agree with the per-pixel path to within one unit per
//! channel.
//!
//! # Usage
//!
//! ```rust
//! use rimg_core::{PackedFormat, PackedImage, Rect, Scanner, SourceImage};
//!
//! let mut img = PackedImage::new(PackedFormat::Rgba, Rect::new(-1, -1, 4, 4));
//! img.set_color(0, 0, [255, 0, 0, 128]);
//! let src = SourceImage::from(img);
//!
//! let scanner = Scanner::new(&src);
//! let mut dst = vec![0u8; 4];
//! scanner.scan(1, 1, 2, 2, &mut dst);
//! assert_eq!(dst, [255, 0, 0, 128]);
//! ```

use crate::color::{unpremultiply_rgba64, unpremultiply_rgba8, ycbcr_to_rgb};
use crate::parallel::{for_each_row, Parallelism};
use crate::source::{PackedFormat, PackedImage, PalettedImage, PixelSource, SourceImage, YCbCrImage};
use crate::{PixelBuffer, BYTES_PER_PIXEL};
use tracing::trace;

/// Converts one row of packed source bytes into canonical RGBA.
type RowConverter = fn(src: &[u8], dst: &mut [u8]);

/// Fast-path converter for a packed format, if one exists.
///
/// Alpha-only formats have none and fall back to the per-pixel path.
fn row_converter(format: PackedFormat) -> Option<RowConverter> {
    match format {
        PackedFormat::Nrgba => Some(convert_nrgba),
        PackedFormat::Nrgba64 => Some(convert_nrgba64),
        PackedFormat::Rgba => Some(convert_rgba),
        PackedFormat::Rgba64 => Some(convert_rgba64),
        PackedFormat::Gray => Some(convert_gray),
        PackedFormat::Gray16 => Some(convert_gray16),
        PackedFormat::Alpha | PackedFormat::Alpha16 => None,
    }
}

fn convert_nrgba(src: &[u8], dst: &mut [u8]) {
    dst.copy_from_slice(src);
}

fn convert_nrgba64(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(8).zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&[s[0], s[2], s[4], s[6]]);
    }
}

fn convert_rgba(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&unpremultiply_rgba8([s[0], s[1], s[2], s[3]]));
    }
}

fn convert_rgba64(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(8).zip(dst.chunks_exact_mut(4)) {
        let c = [0, 2, 4, 6].map(|i| u16::from_be_bytes([s[i], s[i + 1]]));
        d.copy_from_slice(&unpremultiply_rgba64(c));
    }
}

fn convert_gray(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.iter().zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&[*s, *s, *s, 0xff]);
    }
}

fn convert_gray16(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(2).zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&[s[0], s[0], s[0], 0xff]);
    }
}

enum ScanPath<'a> {
    Canonical(&'a PixelBuffer),
    Packed(&'a PackedImage, RowConverter),
    YCbCr(&'a YCbCrImage),
    Paletted(&'a PalettedImage, Vec<[u8; 4]>),
    Generic(&'a dyn PixelSource),
}

/// Reads regions of a source as canonical RGBA.
///
/// Construction picks the read path; scanning is then free of per-call
/// dispatch on the encoding. A scanner is `Sync` and may be shared by
/// parallel workers scanning different regions.
pub struct Scanner<'a> {
    path: ScanPath<'a>,
    width: u32,
    height: u32,
    origin_x: i32,
    origin_y: i32,
}

impl<'a> Scanner<'a> {
    /// Builds a scanner for `src`.
    pub fn new(src: &'a SourceImage) -> Self {
        let bounds = src.bounds();
        let path = match src {
            SourceImage::Nrgba(buf) => ScanPath::Canonical(buf),
            SourceImage::Packed(img) => match row_converter(img.format()) {
                Some(conv) => ScanPath::Packed(img, conv),
                None => ScanPath::Generic(img.as_ref()),
            },
            SourceImage::YCbCr(img) => ScanPath::YCbCr(img),
            SourceImage::Paletted(img) => {
                let palette = img.palette().iter().map(|&c| unpremultiply_rgba8(c)).collect();
                ScanPath::Paletted(img, palette)
            }
            SourceImage::Generic(img) => ScanPath::Generic(img.as_ref()),
        };
        trace!(encoding = src.encoding_name(), path = path_name(&path), %bounds, "Scanner::new");
        Self {
            path,
            width: bounds.width,
            height: bounds.height,
            origin_x: bounds.x,
            origin_y: bounds.y,
        }
    }

    /// Source width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Source height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Name of the chosen read path: `"canonical"`, `"packed"`, `"ycbcr"`,
    /// `"paletted"` or `"generic"`.
    pub fn path(&self) -> &'static str {
        path_name(&self.path)
    }

    /// Writes the region `[x1, x2) x [y1, y2)` into `dst` as tightly packed
    /// canonical RGBA, row-major.
    ///
    /// Coordinates are relative to the source origin and must satisfy
    /// `x1 <= x2 <= width` and `y1 <= y2 <= height`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than `(x2 - x1) * (y2 - y1) * 4` bytes.
    pub fn scan(&self, x1: u32, y1: u32, x2: u32, y2: u32, dst: &mut [u8]) {
        debug_assert!(x1 <= x2 && x2 <= self.width, "scan x range out of bounds");
        debug_assert!(y1 <= y2 && y2 <= self.height, "scan y range out of bounds");
        let w = (x2 - x1) as usize;
        let row_len = w * BYTES_PER_PIXEL;
        if row_len == 0 || y1 == y2 {
            return;
        }
        let rows = dst[..row_len * (y2 - y1) as usize].chunks_exact_mut(row_len);

        match &self.path {
            ScanPath::Canonical(buf) => {
                for (y, d) in (y1..y2).zip(rows) {
                    let start = x1 as usize * BYTES_PER_PIXEL;
                    d.copy_from_slice(&buf.row(y)[start..start + row_len]);
                }
            }
            ScanPath::Packed(img, conv) => {
                let bpp = img.format().bytes_per_pixel();
                for (y, d) in (y1..y2).zip(rows) {
                    let i = img.pixel_offset(self.abs_x(x1), self.abs_y(y));
                    conv(&img.pix()[i..i + w * bpp], d);
                }
            }
            ScanPath::YCbCr(img) => {
                let (y_plane, cb, cr) = (img.y_plane(), img.cb_plane(), img.cr_plane());
                for (y, d) in (y1..y2).zip(rows) {
                    let ay = self.abs_y(y);
                    let iy = img.y_offset(self.abs_x(x1), ay);
                    for (k, px) in d.chunks_exact_mut(4).enumerate() {
                        let ic = img.c_offset(self.abs_x(x1 + k as u32), ay);
                        let [r, g, b] = ycbcr_to_rgb(y_plane[iy + k], cb[ic], cr[ic]);
                        px.copy_from_slice(&[r, g, b, 0xff]);
                    }
                }
            }
            ScanPath::Paletted(img, palette) => {
                for (y, d) in (y1..y2).zip(rows) {
                    let i = img.pixel_offset(self.abs_x(x1), self.abs_y(y));
                    for (&index, px) in img.pix()[i..i + w].iter().zip(d.chunks_exact_mut(4)) {
                        px.copy_from_slice(&palette.get(index as usize).copied().unwrap_or([0; 4]));
                    }
                }
            }
            ScanPath::Generic(img) => {
                for (y, d) in (y1..y2).zip(rows) {
                    let ay = self.abs_y(y);
                    for (k, px) in d.chunks_exact_mut(4).enumerate() {
                        let c = img.rgba64(self.abs_x(x1 + k as u32), ay);
                        px.copy_from_slice(&unpremultiply_rgba64(c));
                    }
                }
            }
        }
    }

    /// Scans a region into a freshly allocated vector.
    pub fn scan_to_vec(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> Vec<u8> {
        let mut dst = vec![0; (x2 - x1) as usize * (y2 - y1) as usize * BYTES_PER_PIXEL];
        self.scan(x1, y1, x2, y2, &mut dst);
        dst
    }

    #[inline]
    fn abs_x(&self, x: u32) -> i32 {
        self.origin_x + x as i32
    }

    #[inline]
    fn abs_y(&self, y: u32) -> i32 {
        self.origin_y + y as i32
    }
}

fn path_name(path: &ScanPath<'_>) -> &'static str {
    match path {
        ScanPath::Canonical(_) => "canonical",
        ScanPath::Packed(..) => "packed",
        ScanPath::YCbCr(_) => "ycbcr",
        ScanPath::Paletted(..) => "paletted",
        ScanPath::Generic(_) => "generic",
    }
}

/// Copies the region `[x1, x2) x [y1, y2)` (relative to the source origin)
/// into a new canonical buffer, scanning rows in parallel.
pub fn copy_region(src: &SourceImage, x1: u32, y1: u32, x2: u32, y2: u32) -> PixelBuffer {
    copy_region_with(&Parallelism::global(), src, x1, y1, x2, y2)
}

/// [`copy_region`] with an explicit partitioning configuration.
pub fn copy_region_with(par: &Parallelism, src: &SourceImage, x1: u32, y1: u32, x2: u32, y2: u32) -> PixelBuffer {
    let mut dst = PixelBuffer::new(x2 - x1, y2 - y1);
    if dst.is_empty() {
        return dst;
    }
    let scanner = Scanner::new(src);
    for_each_row(par, &mut dst, |y, row| {
        scanner.scan(x1, y1 + y, x2, y1 + y + 1, row);
    });
    dst
}

/// Returns `src` as a canonical buffer.
///
/// A canonical source is returned without copying (the result shares its
/// storage); every other encoding is converted.
pub fn to_nrgba(src: impl Into<SourceImage>) -> PixelBuffer {
    match src.into() {
        SourceImage::Nrgba(buf) => buf,
        other => clone_image(&other),
    }
}

/// Returns a canonical copy of `src` that shares no storage with it.
pub fn clone_image(src: &SourceImage) -> PixelBuffer {
    let bounds = src.bounds();
    copy_region(src, 0, 0, bounds.width, bounds.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SubsampleRatio, YCbCrImage};
    use crate::Rect;

    #[test]
    fn test_alpha_formats_use_generic_path() {
        let src = SourceImage::from(PackedImage::new(PackedFormat::Alpha16, Rect::from_size(2, 2)));
        assert_eq!(Scanner::new(&src).path(), "generic");
        let src = SourceImage::from(PackedImage::new(PackedFormat::Gray16, Rect::from_size(2, 2)));
        assert_eq!(Scanner::new(&src).path(), "packed");
    }

    #[test]
    fn test_scan_subregion_of_canonical() {
        let mut buf = PixelBuffer::new(3, 3);
        buf.set_pixel(1, 1, [1, 2, 3, 4]);
        buf.set_pixel(2, 2, [5, 6, 7, 8]);
        let src = SourceImage::from(buf);
        let out = Scanner::new(&src).scan_to_vec(1, 1, 3, 3);
        assert_eq!(out, [1, 2, 3, 4, 0, 0, 0, 0, 0, 0, 0, 0, 5, 6, 7, 8]);
    }

    #[test]
    fn test_alpha_scans_as_white_coverage() {
        let mut img = PackedImage::new(PackedFormat::Alpha, Rect::new(5, 5, 1, 1));
        img.set_color(5, 5, [0, 0, 0, 128]);
        let out = Scanner::new(&SourceImage::from(img)).scan_to_vec(0, 0, 1, 1);
        assert_eq!(out, [255, 255, 255, 128]);
    }

    #[test]
    fn test_to_nrgba_shares_canonical() {
        let buf = PixelBuffer::filled(4, 4, [9, 9, 9, 9]);
        let out = to_nrgba(&buf);
        assert!(out.shares_storage(&buf));
        let copy = clone_image(&SourceImage::from(&buf));
        assert!(!copy.shares_storage(&buf));
        assert_eq!(copy, buf);
    }

    #[test]
    fn test_ycbcr_gray_scans_neutral() {
        let rect = Rect::new(-1, -1, 5, 3);
        let mut img = YCbCrImage::new(rect, SubsampleRatio::R420);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                img.set_color(x, y, [128, 128, 128, 255]);
            }
        }
        let out = to_nrgba(img);
        assert_eq!(out.dimensions(), (5, 3));
        assert!(out.pixels().all(|(_, _, p)| p == [128, 128, 128, 255]));
    }

    #[test]
    fn test_copy_region_is_relative_to_origin() {
        let mut img = PackedImage::new(PackedFormat::Nrgba, Rect::new(-10, 20, 4, 4));
        img.set_color(-8, 21, [10, 20, 30, 40]);
        let out = copy_region(&SourceImage::from(img), 2, 1, 4, 3);
        assert_eq!(out.dimensions(), (2, 2));
        assert_eq!(out.pixel(0, 0), [10, 20, 30, 40]);
    }
}
