//! Source pixel encodings accepted by rimg operations.
//!
//! Operations never require callers to convert their rasters up front.
//! Every supported encoding is a variant of the closed [`SourceImage`] set:
//!
//! | Variant | Storage |
//! |---------|---------|
//! | [`SourceImage::Nrgba`] | canonical [`PixelBuffer`], origin (0, 0) |
//! | [`SourceImage::Packed`] | interleaved [`PackedImage`] in one of the [`PackedFormat`]s, any origin |
//! | [`SourceImage::YCbCr`] | planar chroma-subsampled [`YCbCrImage`] |
//! | [`SourceImage::Paletted`] | palette-indexed [`PalettedImage`] |
//! | [`SourceImage::Generic`] | anything implementing [`PixelSource`] |
//!
//! All concrete encodings also implement [`PixelSource`], the per-pixel
//! accessor that the scanner falls back to when no fast path exists.
//!
//! # Coordinates
//!
//! Source bounds may start anywhere, including negative coordinates. Methods
//! taking `x, y` as `i32` use absolute coordinates inside [`bounds`](PixelSource::bounds).
//!
//! # Example
//!
//! ```rust
//! use rimg_core::{PackedFormat, PackedImage, Rect, SourceImage};
//!
//! let mut gray = PackedImage::new(PackedFormat::Gray, Rect::new(-2, -2, 4, 4));
//! gray.set_color(-2, -2, [200, 200, 200, 255]);
//!
//! let src = SourceImage::from(gray);
//! assert_eq!(src.bounds(), Rect::new(-2, -2, 4, 4));
//! ```

use crate::color::{gray16, premultiply, rgb_to_ycbcr, ycbcr_to_rgb};
use crate::error::plane_len;
use crate::{Error, PixelBuffer, Rect, Result};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-pixel accessor implemented by every source encoding.
///
/// This is the generic (slow) path: one virtual call per pixel. The scanner
/// uses it only for encodings without a dedicated fast path.
pub trait PixelSource: Send + Sync {
    /// Returns the image bounds.
    fn bounds(&self) -> Rect;

    /// Returns the alpha-premultiplied 16-bit RGBA color at absolute (x, y).
    ///
    /// Out-of-bounds coordinates return transparent black.
    fn rgba64(&self, x: i32, y: i32) -> [u16; 4];
}

/// Interleaved pixel encodings stored in a [`PackedImage`].
///
/// 16-bit formats store each channel big-endian (high byte first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PackedFormat {
    /// 8-bit RGBA, non-premultiplied.
    Nrgba,
    /// 16-bit RGBA, non-premultiplied.
    Nrgba64,
    /// 8-bit RGBA, alpha-premultiplied.
    Rgba,
    /// 16-bit RGBA, alpha-premultiplied.
    Rgba64,
    /// 8-bit gray, opaque.
    Gray,
    /// 16-bit gray, opaque.
    Gray16,
    /// 8-bit alpha-only (white coverage mask).
    Alpha,
    /// 16-bit alpha-only.
    Alpha16,
}

impl PackedFormat {
    /// Bytes used by one pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Nrgba | Self::Rgba => 4,
            Self::Nrgba64 | Self::Rgba64 => 8,
            Self::Gray | Self::Alpha => 1,
            Self::Gray16 | Self::Alpha16 => 2,
        }
    }

    /// Short lowercase name, used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nrgba => "nrgba",
            Self::Nrgba64 => "nrgba64",
            Self::Rgba => "rgba",
            Self::Rgba64 => "rgba64",
            Self::Gray => "gray",
            Self::Gray16 => "gray16",
            Self::Alpha => "alpha",
            Self::Alpha16 => "alpha16",
        }
    }
}

#[inline]
fn be16(hi: u8, lo: u8) -> u16 {
    (hi as u16) << 8 | lo as u16
}

/// Interleaved raster in one of the [`PackedFormat`]s, with arbitrary origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedImage {
    format: PackedFormat,
    rect: Rect,
    stride: usize,
    pix: Vec<u8>,
}

impl PackedImage {
    /// Creates a zeroed, tightly packed image covering `rect`.
    pub fn new(format: PackedFormat, rect: Rect) -> Self {
        let stride = rect.width as usize * format.bytes_per_pixel();
        Self {
            format,
            rect,
            stride,
            pix: vec![0; stride * rect.height as usize],
        }
    }

    /// Wraps existing storage.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStride`] or [`Error::BufferTooSmall`] when `pix` cannot
    /// hold `rect` at the given stride.
    pub fn from_raw(format: PackedFormat, rect: Rect, stride: usize, pix: Vec<u8>) -> Result<Self> {
        let row_len = (rect.width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_dimensions(rect.width, rect.height, "row size overflows"))?;
        if stride < row_len {
            return Err(Error::invalid_stride(stride, row_len, rect.width));
        }
        let needed = plane_len(stride, row_len, rect.height as usize)
            .ok_or_else(|| Error::invalid_dimensions(rect.width, rect.height, "plane size overflows"))?;
        if pix.len() < needed {
            return Err(Error::buffer_too_small("pixels", needed, pix.len()));
        }
        Ok(Self {
            format,
            rect,
            stride,
            pix,
        })
    }

    /// Returns the pixel encoding.
    #[inline]
    pub fn format(&self) -> PackedFormat {
        self.format
    }

    /// Returns the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the raw pixel bytes.
    #[inline]
    pub fn pix(&self) -> &[u8] {
        &self.pix
    }

    /// Returns the raw pixel bytes mutably.
    #[inline]
    pub fn pix_mut(&mut self) -> &mut [u8] {
        &mut self.pix
    }

    /// Byte offset of the pixel at absolute (x, y).
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.y) as usize * self.stride
            + (x - self.rect.x) as usize * self.format.bytes_per_pixel()
    }

    /// Stores a canonical color at absolute (x, y), converting it into this
    /// encoding (premultiplying, reducing to gray or alpha as needed).
    ///
    /// Out-of-bounds writes are ignored.
    pub fn set_color(&mut self, x: i32, y: i32, c: [u8; 4]) {
        if !self.rect.contains(x, y) {
            return;
        }
        let i = self.pixel_offset(x, y);
        let p = premultiply(c);
        let d = &mut self.pix[i..i + self.format.bytes_per_pixel()];
        match self.format {
            PackedFormat::Nrgba => d.copy_from_slice(&c),
            PackedFormat::Nrgba64 => {
                for (k, v) in c.iter().enumerate() {
                    d[2 * k] = *v;
                    d[2 * k + 1] = *v;
                }
            }
            PackedFormat::Rgba => {
                for (k, v) in p.iter().enumerate() {
                    d[k] = (v >> 8) as u8;
                }
            }
            PackedFormat::Rgba64 => {
                for (k, v) in p.iter().enumerate() {
                    d[2 * k..2 * k + 2].copy_from_slice(&v.to_be_bytes());
                }
            }
            PackedFormat::Gray => d[0] = (gray16(p) >> 8) as u8,
            PackedFormat::Gray16 => d.copy_from_slice(&gray16(p).to_be_bytes()),
            PackedFormat::Alpha => d[0] = c[3],
            PackedFormat::Alpha16 => d.copy_from_slice(&p[3].to_be_bytes()),
        }
    }
}

impl PixelSource for PackedImage {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn rgba64(&self, x: i32, y: i32) -> [u16; 4] {
        if !self.rect.contains(x, y) {
            return [0; 4];
        }
        let i = self.pixel_offset(x, y);
        let s = &self.pix[i..i + self.format.bytes_per_pixel()];
        match self.format {
            PackedFormat::Nrgba => premultiply([s[0], s[1], s[2], s[3]]),
            PackedFormat::Nrgba64 => {
                let a = be16(s[6], s[7]) as u32;
                let ch = |hi: u8, lo: u8| (be16(hi, lo) as u32 * a / 0xffff) as u16;
                [ch(s[0], s[1]), ch(s[2], s[3]), ch(s[4], s[5]), a as u16]
            }
            PackedFormat::Rgba => [s[0], s[1], s[2], s[3]].map(|v| v as u16 * 0x101),
            PackedFormat::Rgba64 => [
                be16(s[0], s[1]),
                be16(s[2], s[3]),
                be16(s[4], s[5]),
                be16(s[6], s[7]),
            ],
            PackedFormat::Gray => {
                let v = s[0] as u16 * 0x101;
                [v, v, v, 0xffff]
            }
            PackedFormat::Gray16 => {
                let v = be16(s[0], s[1]);
                [v, v, v, 0xffff]
            }
            PackedFormat::Alpha => [s[0] as u16 * 0x101; 4],
            PackedFormat::Alpha16 => [be16(s[0], s[1]); 4],
        }
    }
}

/// Chroma subsampling ratio of a [`YCbCrImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SubsampleRatio {
    /// Full-resolution chroma.
    #[default]
    R444,
    /// Chroma halved horizontally.
    R422,
    /// Chroma halved horizontally and vertically.
    R420,
    /// Chroma halved vertically.
    R440,
    /// Chroma quartered horizontally.
    R411,
    /// Chroma quartered horizontally and halved vertically.
    R410,
}

impl SubsampleRatio {
    /// Horizontal and vertical chroma divisors.
    #[inline]
    pub const fn divisors(self) -> (i32, i32) {
        match self {
            Self::R444 => (1, 1),
            Self::R422 => (2, 1),
            Self::R420 => (2, 2),
            Self::R440 => (1, 2),
            Self::R411 => (4, 1),
            Self::R410 => (4, 2),
        }
    }
}

/// Returns the chroma plane size (width, height) for luma bounds `rect`.
///
/// Chroma sample `x / dx` (truncating division) covers luma column `x`, so
/// the plane spans `min.x / dx ..= (max.x - 1) / dx`, likewise for rows.
pub fn chroma_size(rect: Rect, ratio: SubsampleRatio) -> (u32, u32) {
    if rect.is_empty() {
        return (0, 0);
    }
    let (dx, dy) = ratio.divisors();
    let w = (rect.right() + dx - 1) / dx - rect.x / dx;
    let h = (rect.bottom() + dy - 1) / dy - rect.y / dy;
    (w.max(0) as u32, h.max(0) as u32)
}

/// Planar luma/chroma raster with subsampled chroma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YCbCrImage {
    rect: Rect,
    ratio: SubsampleRatio,
    y: Vec<u8>,
    cb: Vec<u8>,
    cr: Vec<u8>,
    y_stride: usize,
    c_stride: usize,
}

impl YCbCrImage {
    /// Creates a zeroed image with tightly packed planes.
    pub fn new(rect: Rect, ratio: SubsampleRatio) -> Self {
        let (cw, ch) = chroma_size(rect, ratio);
        let y_len = rect.width as usize * rect.height as usize;
        let c_len = cw as usize * ch as usize;
        Self {
            rect,
            ratio,
            y: vec![0; y_len],
            cb: vec![0; c_len],
            cr: vec![0; c_len],
            y_stride: rect.width as usize,
            c_stride: cw as usize,
        }
    }

    /// Wraps existing planes.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidStride`] or [`Error::BufferTooSmall`] when a plane
    /// cannot hold the geometry implied by `rect` and `ratio`.
    pub fn from_planes(
        rect: Rect,
        ratio: SubsampleRatio,
        y: Vec<u8>,
        cb: Vec<u8>,
        cr: Vec<u8>,
        y_stride: usize,
        c_stride: usize,
    ) -> Result<Self> {
        let (cw, ch) = chroma_size(rect, ratio);
        if y_stride < rect.width as usize {
            return Err(Error::invalid_stride(y_stride, rect.width as usize, rect.width));
        }
        if c_stride < cw as usize {
            return Err(Error::invalid_stride(c_stride, cw as usize, cw));
        }
        let overflow = || Error::invalid_dimensions(rect.width, rect.height, "plane size overflows");
        let y_len = plane_len(y_stride, rect.width as usize, rect.height as usize).ok_or_else(overflow)?;
        let c_len = plane_len(c_stride, cw as usize, ch as usize).ok_or_else(overflow)?;
        for (plane, got, expected) in [("Y", y.len(), y_len), ("Cb", cb.len(), c_len), ("Cr", cr.len(), c_len)] {
            if got < expected {
                return Err(Error::buffer_too_small(plane, expected, got));
            }
        }
        Ok(Self {
            rect,
            ratio,
            y,
            cb,
            cr,
            y_stride,
            c_stride,
        })
    }

    /// Returns the subsampling ratio.
    #[inline]
    pub fn ratio(&self) -> SubsampleRatio {
        self.ratio
    }

    /// Returns the luma plane.
    #[inline]
    pub fn y_plane(&self) -> &[u8] {
        &self.y
    }

    /// Returns the blue-difference chroma plane.
    #[inline]
    pub fn cb_plane(&self) -> &[u8] {
        &self.cb
    }

    /// Returns the red-difference chroma plane.
    #[inline]
    pub fn cr_plane(&self) -> &[u8] {
        &self.cr
    }

    /// Luma offset of absolute (x, y).
    #[inline]
    pub fn y_offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.y) as usize * self.y_stride + (x - self.rect.x) as usize
    }

    /// Chroma offset of absolute (x, y) under the subsampling ratio.
    #[inline]
    pub fn c_offset(&self, x: i32, y: i32) -> usize {
        let (dx, dy) = self.ratio.divisors();
        (y / dy - self.rect.y / dy) as usize * self.c_stride + (x / dx - self.rect.x / dx) as usize
    }

    /// Stores the color of a canonical pixel at absolute (x, y); alpha is dropped.
    ///
    /// With subsampled chroma, neighbouring pixels share (and overwrite)
    /// one chroma sample. Out-of-bounds writes are ignored.
    pub fn set_color(&mut self, x: i32, y: i32, c: [u8; 4]) {
        if !self.rect.contains(x, y) {
            return;
        }
        let [yy, cb, cr] = rgb_to_ycbcr(c[0], c[1], c[2]);
        let iy = self.y_offset(x, y);
        let ic = self.c_offset(x, y);
        self.y[iy] = yy;
        self.cb[ic] = cb;
        self.cr[ic] = cr;
    }
}

impl PixelSource for YCbCrImage {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn rgba64(&self, x: i32, y: i32) -> [u16; 4] {
        if !self.rect.contains(x, y) {
            return [0; 4];
        }
        let ic = self.c_offset(x, y);
        let [r, g, b] = ycbcr_to_rgb(self.y[self.y_offset(x, y)], self.cb[ic], self.cr[ic]);
        [r as u16 * 0x101, g as u16 * 0x101, b as u16 * 0x101, 0xffff]
    }
}

/// Palette-indexed raster.
///
/// Palette entries are alpha-premultiplied 8-bit RGBA. Indices past the end
/// of the palette read as transparent black.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettedImage {
    rect: Rect,
    stride: usize,
    pix: Vec<u8>,
    palette: Vec<[u8; 4]>,
}

impl PalettedImage {
    /// Creates an image whose pixels all use palette index 0.
    pub fn new(rect: Rect, palette: Vec<[u8; 4]>) -> Self {
        Self {
            rect,
            stride: rect.width as usize,
            pix: vec![0; rect.width as usize * rect.height as usize],
            palette,
        }
    }

    /// Wraps existing index storage.
    pub fn from_raw(rect: Rect, stride: usize, pix: Vec<u8>, palette: Vec<[u8; 4]>) -> Result<Self> {
        if stride < rect.width as usize {
            return Err(Error::invalid_stride(stride, rect.width as usize, rect.width));
        }
        let needed = plane_len(stride, rect.width as usize, rect.height as usize)
            .ok_or_else(|| Error::invalid_dimensions(rect.width, rect.height, "plane size overflows"))?;
        if pix.len() < needed {
            return Err(Error::buffer_too_small("pixels", needed, pix.len()));
        }
        Ok(Self {
            rect,
            stride,
            pix,
            palette,
        })
    }

    /// Returns the palette.
    #[inline]
    pub fn palette(&self) -> &[[u8; 4]] {
        &self.palette
    }

    /// Returns the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the index storage.
    #[inline]
    pub fn pix(&self) -> &[u8] {
        &self.pix
    }

    /// Offset of the index at absolute (x, y).
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> usize {
        (y - self.rect.y) as usize * self.stride + (x - self.rect.x) as usize
    }

    /// Sets the palette index at absolute (x, y). Out-of-bounds writes are ignored.
    pub fn set_index(&mut self, x: i32, y: i32, index: u8) {
        if self.rect.contains(x, y) {
            let i = self.pixel_offset(x, y);
            self.pix[i] = index;
        }
    }
}

impl PixelSource for PalettedImage {
    fn bounds(&self) -> Rect {
        self.rect
    }

    fn rgba64(&self, x: i32, y: i32) -> [u16; 4] {
        if !self.rect.contains(x, y) {
            return [0; 4];
        }
        let index = self.pix[self.pixel_offset(x, y)] as usize;
        self.palette
            .get(index)
            .map_or([0; 4], |c| c.map(|v| v as u16 * 0x101))
    }
}

impl PixelSource for PixelBuffer {
    fn bounds(&self) -> Rect {
        PixelBuffer::bounds(self)
    }

    fn rgba64(&self, x: i32, y: i32) -> [u16; 4] {
        if x < 0 || y < 0 {
            return [0; 4];
        }
        self.get_pixel(x as u32, y as u32).map_or([0; 4], premultiply)
    }
}

/// Any raster an operation can read, as a closed set of encodings.
///
/// Cloning is cheap: every variant holds shared storage.
#[derive(Clone)]
pub enum SourceImage {
    /// Already canonical; may be returned without copying.
    Nrgba(PixelBuffer),
    /// Interleaved packed encoding.
    Packed(Arc<PackedImage>),
    /// Planar subsampled luma/chroma.
    YCbCr(Arc<YCbCrImage>),
    /// Palette-indexed.
    Paletted(Arc<PalettedImage>),
    /// Caller-defined raster read through [`PixelSource`].
    Generic(Arc<dyn PixelSource>),
}

impl SourceImage {
    /// Wraps a caller-defined raster.
    pub fn generic(src: impl PixelSource + 'static) -> Self {
        Self::Generic(Arc::new(src))
    }

    /// Returns the source bounds (possibly with a non-zero origin).
    pub fn bounds(&self) -> Rect {
        self.as_pixel_source().bounds()
    }

    /// Returns the source width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.bounds().width
    }

    /// Returns the source height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.bounds().height
    }

    /// Returns `true` if the source has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bounds().is_empty()
    }

    /// Views the source through the generic per-pixel accessor.
    pub fn as_pixel_source(&self) -> &dyn PixelSource {
        match self {
            Self::Nrgba(b) => b,
            Self::Packed(p) => p.as_ref(),
            Self::YCbCr(p) => p.as_ref(),
            Self::Paletted(p) => p.as_ref(),
            Self::Generic(p) => p.as_ref(),
        }
    }

    /// Encoding name, used in logs.
    pub fn encoding_name(&self) -> &'static str {
        match self {
            Self::Nrgba(_) => "nrgba",
            Self::Packed(p) => p.format().name(),
            Self::YCbCr(_) => "ycbcr",
            Self::Paletted(_) => "paletted",
            Self::Generic(_) => "generic",
        }
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("encoding", &self.encoding_name())
            .field("bounds", &self.bounds())
            .finish()
    }
}

impl From<PixelBuffer> for SourceImage {
    fn from(buf: PixelBuffer) -> Self {
        Self::Nrgba(buf)
    }
}

impl From<&PixelBuffer> for SourceImage {
    fn from(buf: &PixelBuffer) -> Self {
        Self::Nrgba(buf.clone())
    }
}

impl From<&SourceImage> for SourceImage {
    fn from(src: &SourceImage) -> Self {
        src.clone()
    }
}

impl From<PackedImage> for SourceImage {
    fn from(img: PackedImage) -> Self {
        Self::Packed(Arc::new(img))
    }
}

impl From<YCbCrImage> for SourceImage {
    fn from(img: YCbCrImage) -> Self {
        Self::YCbCr(Arc::new(img))
    }
}

impl From<PalettedImage> for SourceImage {
    fn from(img: PalettedImage) -> Self {
        Self::Paletted(Arc::new(img))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chroma_size_negative_origin() {
        let rect = Rect::new(-1, -1, 16, 16);
        assert_eq!(chroma_size(rect, SubsampleRatio::R444), (16, 16));
        assert_eq!(chroma_size(rect, SubsampleRatio::R422), (8, 16));
        assert_eq!(chroma_size(rect, SubsampleRatio::R420), (8, 8));
        assert_eq!(chroma_size(rect, SubsampleRatio::R440), (16, 8));
        assert_eq!(chroma_size(rect, SubsampleRatio::R411), (4, 16));
        assert_eq!(chroma_size(rect, SubsampleRatio::R410), (4, 8));
    }

    #[test]
    fn test_c_offset_stays_in_plane() {
        for ratio in [
            SubsampleRatio::R444,
            SubsampleRatio::R422,
            SubsampleRatio::R420,
            SubsampleRatio::R440,
            SubsampleRatio::R411,
            SubsampleRatio::R410,
        ] {
            let rect = Rect::new(-3, -5, 13, 11);
            let img = YCbCrImage::new(rect, ratio);
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    assert!(img.c_offset(x, y) < img.cb_plane().len(), "{ratio:?} ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_packed_from_raw_checks_length() {
        let rect = Rect::new(0, 0, 4, 2);
        assert!(PackedImage::from_raw(PackedFormat::Gray16, rect, 8, vec![0; 16]).is_ok());
        assert!(matches!(
            PackedImage::from_raw(PackedFormat::Gray16, rect, 8, vec![0; 15]),
            Err(Error::BufferTooSmall { .. })
        ));
        assert!(matches!(
            PackedImage::from_raw(PackedFormat::Gray16, rect, 7, vec![0; 16]),
            Err(Error::InvalidStride { .. })
        ));
    }

    #[test]
    fn test_ycbcr_from_planes_checks_chroma() {
        let rect = Rect::new(0, 0, 4, 4);
        let err = YCbCrImage::from_planes(rect, SubsampleRatio::R420, vec![0; 16], vec![0; 4], vec![0; 3], 4, 2)
            .unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { plane: "Cr", .. }));
    }

    #[test]
    fn test_set_color_roundtrips_through_rgba64() {
        let rect = Rect::new(2, 3, 2, 2);
        for format in [PackedFormat::Nrgba, PackedFormat::Nrgba64, PackedFormat::Rgba64] {
            let mut img = PackedImage::new(format, rect);
            img.set_color(3, 4, [255, 0, 0, 255]);
            assert_eq!(img.rgba64(3, 4), [0xffff, 0, 0, 0xffff], "{format:?}");
            assert_eq!(img.rgba64(2, 3), [0, 0, 0, 0], "{format:?}");
        }
    }

    #[test]
    fn test_palette_out_of_range_is_transparent() {
        let mut img = PalettedImage::new(Rect::from_size(2, 1), vec![[255, 0, 0, 255]]);
        img.set_index(1, 0, 7);
        assert_eq!(img.rgba64(0, 0), [0xffff, 0, 0, 0xffff]);
        assert_eq!(img.rgba64(1, 0), [0; 4]);
    }

    #[test]
    fn test_source_image_bounds() {
        let buf = PixelBuffer::new(3, 5);
        let src = SourceImage::from(&buf);
        assert_eq!(src.bounds(), Rect::from_size(3, 5));
        assert_eq!(src.encoding_name(), "nrgba");
    }
}
