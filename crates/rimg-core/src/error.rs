//! Error types for rimg-core.
//!
//! Image operations in rimg are total: degenerate sizes and parameters are
//! normalised to empty or cloned buffers instead of failing. The only
//! fallible entry points are the constructors that wrap caller-supplied raw
//! storage ([`PixelBuffer::from_raw`](crate::PixelBuffer::from_raw),
//! [`PackedImage::from_raw`](crate::PackedImage::from_raw), ...) and the
//! [`Parallelism`](crate::Parallelism) builder.
//!
//! # Usage
//!
//! ```rust
//! use rimg_core::{Error, PixelBuffer};
//!
//! let err = PixelBuffer::from_raw(4, 4, 8, vec![0; 64]).unwrap_err();
//! assert!(matches!(err, Error::InvalidStride { .. }));
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while wrapping raw pixel storage.
#[derive(Debug, Error)]
pub enum Error {
    /// Image dimensions overflow the addressable buffer size.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width and pixel size.
    ///
    /// The stride must be at least `width * bytes_per_pixel`.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Image width
        width: u32,
    },

    /// A pixel or chroma plane is shorter than its geometry requires.
    #[error("{plane} plane holds {got} bytes, expected at least {expected}")]
    BufferTooSmall {
        /// Plane name ("pixels", "Y", "Cb", "Cr")
        plane: &'static str,
        /// Minimum length required
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidStride`] error.
    #[inline]
    pub fn invalid_stride(stride: usize, min_stride: usize, width: u32) -> Self {
        Self::InvalidStride {
            stride,
            min_stride,
            width,
        }
    }

    /// Creates an [`Error::BufferTooSmall`] error.
    #[inline]
    pub fn buffer_too_small(plane: &'static str, expected: usize, got: usize) -> Self {
        Self::BufferTooSmall {
            plane,
            expected,
            got,
        }
    }

    /// Creates an [`Error::InvalidParameter`] error.
    #[inline]
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Computes `stride * (height - 1) + row_len`, the minimum length of a plane.
///
/// Returns `None` on overflow. A plane with zero height or zero-length rows
/// needs no storage at all.
pub(crate) fn plane_len(stride: usize, row_len: usize, height: usize) -> Option<usize> {
    if height == 0 || row_len == 0 {
        return Some(0);
    }
    stride.checked_mul(height - 1)?.checked_add(row_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_stride_message() {
        let err = Error::invalid_stride(8, 16, 4);
        let msg = err.to_string();
        assert!(msg.contains("8"));
        assert!(msg.contains("16"));
    }

    #[test]
    fn test_buffer_too_small_message() {
        let err = Error::buffer_too_small("Cb", 64, 10);
        assert_eq!(err.to_string(), "Cb plane holds 10 bytes, expected at least 64");
    }

    #[test]
    fn test_plane_len() {
        assert_eq!(plane_len(16, 12, 3), Some(44));
        assert_eq!(plane_len(16, 12, 0), Some(0));
        assert_eq!(plane_len(usize::MAX, 1, 3), None);
    }
}
