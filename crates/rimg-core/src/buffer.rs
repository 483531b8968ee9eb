//! Canonical RGBA pixel buffer.
//!
//! [`PixelBuffer`] is the single output type of every rimg operation: 8 bits
//! per channel, R, G, B, A order, alpha *not* premultiplied into the color
//! channels, coordinate domain anchored at (0, 0).
//!
//! # Memory Layout
//!
//! Rows are stored top-to-bottom, each row `stride` bytes long, of which the
//! first `width * 4` bytes hold pixels:
//!
//! ```text
//! [R G B A R G B A ... (padding)]  ← Row 0
//! [R G B A R G B A ... (padding)]  ← Row 1
//! ```
//!
//! # Sharing
//!
//! Pixel storage lives in an [`Arc<Vec<u8>>`]. [`Clone`] is the *no-copy*
//! choice: the clone aliases the same bytes, and the first mutation through
//! either handle detaches it (copy-on-write). [`PixelBuffer::deep_copy`] is
//! the *copy* choice and always allocates fresh storage. Operations pick one
//! of the two explicitly, so a caller's buffer is never mutated in place.
//!
//! ```rust
//! use rimg_core::PixelBuffer;
//!
//! let mut a = PixelBuffer::filled(2, 2, [255, 0, 0, 255]);
//! let b = a.clone();
//! assert!(a.shares_storage(&b));
//!
//! a.set_pixel(0, 0, [0, 0, 0, 0]);
//! assert!(!a.shares_storage(&b));
//! assert_eq!(b.pixel(0, 0), [255, 0, 0, 255]);
//! ```

use crate::{Error, Rect, Result};
use std::sync::Arc;

/// Bytes per canonical RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Owned 8-bit non-premultiplied RGBA raster anchored at (0, 0).
///
/// # Invariants
///
/// - `stride >= width * 4`
/// - `data.len() == stride * height`
#[derive(Clone)]
pub struct PixelBuffer {
    /// Pixel storage (Arc for cheap aliasing)
    data: Arc<Vec<u8>>,
    /// Image width in pixels
    width: u32,
    /// Image height in pixels
    height: u32,
    /// Bytes per row (may include padding)
    stride: usize,
}

impl PixelBuffer {
    /// Creates a new fully transparent buffer.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rimg_core::PixelBuffer;
    ///
    /// let img = PixelBuffer::new(16, 8);
    /// assert_eq!(img.dimensions(), (16, 8));
    /// assert_eq!(img.stride(), 64);
    /// assert_eq!(img.pixel(3, 3), [0, 0, 0, 0]);
    /// ```
    pub fn new(width: u32, height: u32) -> Self {
        let stride = width as usize * BYTES_PER_PIXEL;
        Self {
            data: Arc::new(vec![0; stride * height as usize]),
            width,
            height,
            stride,
        }
    }

    /// Creates a zero-sized buffer.
    #[inline]
    pub fn empty() -> Self {
        Self::new(0, 0)
    }

    /// Creates a buffer filled with a single RGBA value.
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let mut data = Vec::with_capacity(count * BYTES_PER_PIXEL);
        for _ in 0..count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data: Arc::new(data),
            width,
            height,
            stride: width as usize * BYTES_PER_PIXEL,
        }
    }

    /// Wraps tightly packed RGBA bytes (`stride == width * 4`).
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let stride = (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows"))?;
        Self::from_raw(width, height, stride, data)
    }

    /// Wraps RGBA bytes with an explicit row stride.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if `stride < width * 4`
    /// - [`Error::BufferTooSmall`] if `data.len() < stride * height`
    /// - [`Error::InvalidDimensions`] if the size computation overflows
    ///
    /// Trailing bytes beyond `stride * height` are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rimg_core::PixelBuffer;
    ///
    /// // 1x2 image with 4 bytes of row padding
    /// let data = vec![1, 2, 3, 4, 0, 0, 0, 0, 5, 6, 7, 8, 0, 0, 0, 0];
    /// let img = PixelBuffer::from_raw(1, 2, 8, data).unwrap();
    /// assert_eq!(img.pixel(0, 1), [5, 6, 7, 8]);
    /// ```
    pub fn from_raw(width: u32, height: u32, stride: usize, data: Vec<u8>) -> Result<Self> {
        let min_stride = (width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows"))?;
        if stride < min_stride {
            return Err(Error::invalid_stride(stride, min_stride, width));
        }
        let expected = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        if data.len() < expected {
            return Err(Error::buffer_too_small("pixels", expected, data.len()));
        }
        let mut data = data;
        data.truncate(expected);
        Ok(Self {
            data: Arc::new(data),
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the image dimensions as (width, height).
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the stride (bytes per row).
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the total number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Returns a rectangle covering the entire image.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if the image has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the raw bytes, including row padding.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw bytes mutably, detaching shared storage first.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        Arc::make_mut(&mut self.data).as_mut_slice()
    }

    /// Consumes the buffer and returns its bytes.
    ///
    /// Copies only when the storage is still shared with another buffer.
    pub fn into_vec(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Returns `true` if both buffers alias the same storage.
    #[inline]
    pub fn shares_storage(&self, other: &PixelBuffer) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Returns a copy that shares nothing with `self`.
    ///
    /// The copy is tightly packed regardless of the source stride.
    pub fn deep_copy(&self) -> Self {
        let row_len = self.width as usize * BYTES_PER_PIXEL;
        let mut data = Vec::with_capacity(row_len * self.height as usize);
        for y in 0..self.height {
            data.extend_from_slice(self.row(y));
        }
        Self {
            data: Arc::new(data),
            width: self.width,
            height: self.height,
            stride: row_len,
        }
    }

    /// Returns the byte offset of pixel (x, y).
    #[inline]
    pub fn pixel_offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.stride + x as usize * BYTES_PER_PIXEL
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = self.pixel_offset(x, y);
        let mut px = [0; 4];
        px.copy_from_slice(&self.data[i..i + BYTES_PER_PIXEL]);
        px
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        (x < self.width && y < self.height).then(|| self.pixel(x, y))
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        let i = self.pixel_offset(x, y);
        self.data_mut()[i..i + BYTES_PER_PIXEL].copy_from_slice(&pixel);
    }

    /// Returns the pixels of row `y` (padding excluded).
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    /// Returns the pixels of row `y` mutably (padding excluded).
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        debug_assert!(y < self.height, "row out of bounds");
        let start = y as usize * self.stride;
        let end = start + self.width as usize * BYTES_PER_PIXEL;
        &mut self.data_mut()[start..end]
    }

    /// Iterates over all pixels with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, [u8; 4])> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| (x, y, self.pixel(x, y))))
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::empty()
    }
}

/// Buffers compare by size and visible pixels; row padding is ignored.
impl PartialEq for PixelBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && (0..self.height).all(|y| self.row(y) == other.row(y))
    }
}

impl Eq for PixelBuffer {}

impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_transparent() {
        let img = PixelBuffer::new(3, 2);
        assert_eq!(img.data().len(), 24);
        assert!(img.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_raw_validation() {
        assert!(matches!(
            PixelBuffer::from_raw(4, 2, 15, vec![0; 30]),
            Err(Error::InvalidStride { .. })
        ));
        assert!(matches!(
            PixelBuffer::from_raw(4, 2, 16, vec![0; 31]),
            Err(Error::BufferTooSmall { .. })
        ));
        assert!(PixelBuffer::from_raw(4, 2, 20, vec![0; 40]).is_ok());
    }

    #[test]
    fn test_eq_ignores_padding() {
        let padded = PixelBuffer::from_raw(1, 2, 8, vec![1, 2, 3, 4, 9, 9, 9, 9, 5, 6, 7, 8, 7, 7, 7, 7])
            .unwrap();
        let tight = PixelBuffer::from_vec(1, 2, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        assert_eq!(padded, tight);
    }

    #[test]
    fn test_deep_copy_detaches() {
        let a = PixelBuffer::filled(2, 2, [1, 2, 3, 4]);
        let b = a.deep_copy();
        assert!(!a.shares_storage(&b));
        assert_eq!(a, b);
    }

    #[test]
    fn test_into_vec_unique_does_not_copy_content() {
        let a = PixelBuffer::filled(1, 1, [9, 8, 7, 6]);
        assert_eq!(a.into_vec(), vec![9, 8, 7, 6]);
    }

    #[test]
    fn test_row_access() {
        let mut img = PixelBuffer::new(2, 2);
        img.row_mut(1).copy_from_slice(&[1, 1, 1, 1, 2, 2, 2, 2]);
        assert_eq!(img.pixel(1, 1), [2, 2, 2, 2]);
        assert_eq!(img.row(0), &[0; 8]);
        assert_eq!(img.get_pixel(2, 0), None);
    }
}
