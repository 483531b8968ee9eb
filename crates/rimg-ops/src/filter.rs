//! Resampling filter kernels.
//!
//! Every [`Filter`] is a pure function of one real argument paired with a
//! fixed support radius. The resampler evaluates the kernel only inside
//! `[-support, support]`, scaled by the downsampling factor.
//!
//! # Families
//!
//! | Filter | Support | Weight |
//! |--------|---------|--------|
//! | [`Filter::NearestNeighbor`] | 0 | none, single nearest sample |
//! | [`Filter::Box`] | 0.5 | 1 inside the half-width |
//! | [`Filter::Linear`] | 1 | `1 - |x|` |
//! | [`Filter::Hermite`], [`Filter::MitchellNetravali`], [`Filter::CatmullRom`], [`Filter::BSpline`] | 2 | cubic B/C-spline |
//! | [`Filter::Gaussian`] | 2 | `exp(-2x²)` |
//! | [`Filter::Lanczos`], [`Filter::Hann`], [`Filter::Hamming`], [`Filter::Blackman`], [`Filter::Bartlett`], [`Filter::Welch`], [`Filter::Cosine`] | 3 | `sinc(x) * window(x)` |
//!
//! # Example
//!
//! ```rust
//! use rimg_ops::Filter;
//!
//! assert_eq!(Filter::Lanczos.support(), 3.0);
//! assert_eq!(Filter::CatmullRom.kernel(0.0), 1.0);
//! assert_eq!(Filter::Linear.kernel(0.25), 0.75);
//! assert!(Filter::NearestNeighbor.is_nearest());
//! ```

use std::f64::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Filter {
    /// Nearest-neighbor (fastest, blocky). Bypasses kernel evaluation.
    NearestNeighbor,
    /// Box (unweighted area average when downsampling).
    Box,
    /// Linear (tent) filter.
    Linear,
    /// Hermite cubic (B=0, C=0).
    Hermite,
    /// Mitchell-Netravali cubic (B=1/3, C=1/3).
    MitchellNetravali,
    /// Catmull-Rom cubic (B=0, C=1/2). Sharp, some ringing.
    CatmullRom,
    /// Cubic B-spline (B=1, C=0). Smooth, no ringing.
    BSpline,
    /// Gaussian blur kernel.
    Gaussian,
    /// Lanczos-3 windowed sinc (high quality, best for downscaling).
    #[default]
    Lanczos,
    /// Hann-windowed sinc.
    Hann,
    /// Hamming-windowed sinc.
    Hamming,
    /// Blackman-windowed sinc.
    Blackman,
    /// Bartlett (triangle) windowed sinc.
    Bartlett,
    /// Welch (parabolic) windowed sinc.
    Welch,
    /// Cosine-windowed sinc.
    Cosine,
}

/// Support radius of the windowed-sinc family.
const SINC_SUPPORT: f64 = 3.0;

impl Filter {
    /// All filters, in declaration order.
    pub const ALL: [Filter; 15] = [
        Filter::NearestNeighbor,
        Filter::Box,
        Filter::Linear,
        Filter::Hermite,
        Filter::MitchellNetravali,
        Filter::CatmullRom,
        Filter::BSpline,
        Filter::Gaussian,
        Filter::Lanczos,
        Filter::Hann,
        Filter::Hamming,
        Filter::Blackman,
        Filter::Bartlett,
        Filter::Welch,
        Filter::Cosine,
    ];

    /// Returns the support radius; outside it the kernel is zero.
    #[inline]
    pub fn support(&self) -> f64 {
        match self {
            Filter::NearestNeighbor => 0.0,
            Filter::Box => 0.5,
            Filter::Linear => 1.0,
            Filter::Hermite
            | Filter::MitchellNetravali
            | Filter::CatmullRom
            | Filter::BSpline
            | Filter::Gaussian => 2.0,
            Filter::Lanczos
            | Filter::Hann
            | Filter::Hamming
            | Filter::Blackman
            | Filter::Bartlett
            | Filter::Welch
            | Filter::Cosine => SINC_SUPPORT,
        }
    }

    /// Returns `true` for the zero-support nearest-neighbor marker.
    #[inline]
    pub fn is_nearest(&self) -> bool {
        matches!(self, Filter::NearestNeighbor)
    }

    /// Evaluates the kernel at `x`.
    ///
    /// Nearest-neighbor has no kernel and always returns 0.
    #[inline]
    pub fn kernel(&self, x: f64) -> f64 {
        let x = x.abs();
        match self {
            Filter::NearestNeighbor => 0.0,
            Filter::Box => {
                if x <= 0.5 { 1.0 } else { 0.0 }
            }
            Filter::Linear => {
                if x < 1.0 { 1.0 - x } else { 0.0 }
            }
            Filter::Hermite => bcspline(x, 0.0, 0.0),
            Filter::MitchellNetravali => bcspline(x, 1.0 / 3.0, 1.0 / 3.0),
            Filter::CatmullRom => bcspline(x, 0.0, 0.5),
            Filter::BSpline => bcspline(x, 1.0, 0.0),
            Filter::Gaussian => {
                if x < 2.0 { (-2.0 * x * x).exp() } else { 0.0 }
            }
            Filter::Lanczos => windowed_sinc(x, |x| sinc(x / SINC_SUPPORT)),
            Filter::Hann => windowed_sinc(x, |x| 0.5 + 0.5 * (PI * x / SINC_SUPPORT).cos()),
            Filter::Hamming => windowed_sinc(x, |x| 0.54 + 0.46 * (PI * x / SINC_SUPPORT).cos()),
            Filter::Blackman => windowed_sinc(x, |x| {
                0.42 - 0.5 * (PI * x / SINC_SUPPORT + PI).cos() + 0.08 * (2.0 * PI * x / SINC_SUPPORT).cos()
            }),
            Filter::Bartlett => windowed_sinc(x, |x| (SINC_SUPPORT - x) / SINC_SUPPORT),
            Filter::Welch => windowed_sinc(x, |x| 1.0 - (x * x) / (SINC_SUPPORT * SINC_SUPPORT)),
            Filter::Cosine => windowed_sinc(x, |x| (PI / 2.0 * (x / SINC_SUPPORT)).cos()),
        }
    }

    /// Lowercase filter name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::NearestNeighbor => "nearest",
            Filter::Box => "box",
            Filter::Linear => "linear",
            Filter::Hermite => "hermite",
            Filter::MitchellNetravali => "mitchell",
            Filter::CatmullRom => "catmull-rom",
            Filter::BSpline => "bspline",
            Filter::Gaussian => "gaussian",
            Filter::Lanczos => "lanczos",
            Filter::Hann => "hann",
            Filter::Hamming => "hamming",
            Filter::Blackman => "blackman",
            Filter::Bartlett => "bartlett",
            Filter::Welch => "welch",
            Filter::Cosine => "cosine",
        }
    }
}

/// Normalised sinc: `sin(πx) / (πx)`, 1 at the origin.
#[inline]
fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let px = PI * x;
        px.sin() / px
    }
}

/// `sinc(x) * window(x)` inside the sinc support, else 0. `x` is non-negative.
#[inline]
fn windowed_sinc(x: f64, window: impl Fn(f64) -> f64) -> f64 {
    if x < SINC_SUPPORT { sinc(x) * window(x) } else { 0.0 }
}

/// Mitchell-Netravali cubic family with parameters (B, C). `x` is non-negative.
#[inline]
fn bcspline(x: f64, b: f64, c: f64) -> f64 {
    if x < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * x * x * x + (-18.0 + 12.0 * b + 6.0 * c) * x * x + (6.0 - 2.0 * b))
            / 6.0
    } else if x < 2.0 {
        ((-b - 6.0 * c) * x * x * x + (6.0 * b + 30.0 * c) * x * x + (-12.0 * b - 48.0 * c) * x + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}
