//! # rimg-ops
//!
//! Image operations for rimg.
//!
//! Every operation accepts any [`SourceImage`](rimg_core::SourceImage)
//! encoding (or a [`PixelBuffer`](rimg_core::PixelBuffer) directly) and
//! returns a new canonical buffer anchored at (0, 0). Inputs are never
//! modified, and degenerate parameters produce empty or copied buffers
//! instead of errors.
//!
//! # Modules
//!
//! - [`filter`] - Resampling kernel catalog
//! - [`resize`] - Separable resampling, fit and thumbnail
//! - [`effects`] - Gaussian blur, sharpen, pixelate
//! - [`transform`] - Crop, paste, overlay, flips and rotations
//! - [`adjust`] - Gamma, contrast, brightness, saturation, grayscale, invert, histogram
//!
//! # Example
//!
//! ```rust
//! use rimg_core::PixelBuffer;
//! use rimg_ops::{fit, resize, thumbnail, Filter};
//!
//! let img = PixelBuffer::filled(400, 300, [0, 128, 255, 255]);
//!
//! let half = resize(&img, 200, 0, Filter::Lanczos);
//! assert_eq!(half.dimensions(), (200, 150));
//!
//! let boxed = fit(&img, 100, 100, Filter::CatmullRom);
//! assert_eq!(boxed.dimensions(), (100, 75));
//!
//! let thumb = thumbnail(&img, 64, 64, Filter::Linear);
//! assert_eq!(thumb.dimensions(), (64, 64));
//! ```
//!
//! # Parallelism
//!
//! Row and column loops run through [`rimg_core::parallel`], configured by
//! [`rimg_core::Parallelism`]. [`resize_with`] takes the configuration
//! explicitly; everything else uses the process-wide setting.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod adjust;
pub mod effects;
pub mod filter;
pub mod resize;
pub mod transform;

pub use adjust::{
    adjust_brightness, adjust_contrast, adjust_gamma, adjust_saturation, grayscale, histogram,
    invert, map_pixels,
};
pub use effects::{blur, pixelate, sharpen};
pub use filter::Filter;
pub use resize::{fill_dimensions, fit, fit_dimensions, resize, resize_with, thumbnail};
pub use transform::{
    crop, crop_center, flip_h, flip_v, overlay, paste, paste_center, rotate180, rotate270, rotate90,
    transpose, transverse,
};
