//! # rimg-core
//!
//! Core types for rimg image processing.
//!
//! This crate provides the foundation every rimg operation builds on:
//!
//! - [`PixelBuffer`] - Canonical 8-bit non-premultiplied RGBA raster with copy-on-write storage
//! - [`SourceImage`] - The closed set of accepted input encodings (packed, YCbCr, paletted, generic)
//! - [`Scanner`] - Reads any source region as canonical RGBA, with per-encoding fast paths
//! - [`parallel`], [`Parallelism`] - Chunked data-parallel partitioning over Rayon
//! - [`Rect`], [`Point`] - Integer geometry with signed origins
//!
//! ## Design
//!
//! Operations accept any [`SourceImage`] and always return a fresh
//! [`PixelBuffer`] anchored at (0, 0). Inputs are never mutated. Conversion
//! to the canonical layout happens once per region, through a [`Scanner`]
//! whose read path is picked when it is built.
//!
//! ```rust
//! use rimg_core::{to_nrgba, PackedFormat, PackedImage, Rect};
//!
//! let mut gray = PackedImage::new(PackedFormat::Gray16, Rect::new(-4, -4, 8, 8));
//! gray.set_color(0, 0, [255, 255, 255, 255]);
//!
//! let canonical = to_nrgba(gray);
//! assert_eq!(canonical.dimensions(), (8, 8));
//! assert_eq!(canonical.pixel(4, 4), [255, 255, 255, 255]);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! rimg-core (this crate)
//!    ^
//!    |
//!    +-- rimg-ops (resampling, blur, geometry, adjustments)
//!    +-- rimg-bench (criterion benchmarks)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for configuration and geometry types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod color;
pub mod error;
pub mod parallel;
pub mod rect;
pub mod scan;
pub mod source;

// Re-exports for convenience
pub use buffer::{PixelBuffer, BYTES_PER_PIXEL};
pub use error::{Error, Result};
pub use parallel::{for_each_row, parallel, parallel_with, DisjointSlice, Parallelism};
pub use rect::{Point, Rect};
pub use scan::{clone_image, copy_region, copy_region_with, to_nrgba, Scanner};
pub use source::{
    chroma_size, PackedFormat, PackedImage, PalettedImage, PixelSource, SourceImage,
    SubsampleRatio, YCbCrImage,
};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use rimg_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::PixelBuffer;
    pub use crate::error::{Error, Result};
    pub use crate::parallel::Parallelism;
    pub use crate::rect::{Point, Rect};
    pub use crate::source::{PixelSource, SourceImage};
}
