//! Point and rectangle types for image bounds.
//!
//! Source images may live anywhere on the integer plane, including at
//! negative coordinates, so [`Rect`] carries a signed origin and an unsigned
//! size. Every buffer produced by rimg is normalised to start at (0, 0).
//!
//! # Coordinate System
//!
//! - X increases to the right, Y increases downward
//! - Rectangles are half-open: the left/top edges are inclusive, the
//!   right/bottom edges are exclusive
//!
//! ```text
//! (x,y) ──────────► right()
//!   │  ┌──────────┐
//!   │  │  width   │ height
//!   │  └──────────┘
//!   ▼
//! bottom()
//! ```
//!
//! # Usage
//!
//! ```rust
//! use rimg_core::Rect;
//!
//! let rect = Rect::new(-1, -1, 16, 16);
//! assert_eq!(rect.right(), 15);
//! assert!(rect.contains(-1, 14));
//!
//! let other = Rect::new(10, 10, 20, 20);
//! assert_eq!(rect.intersect(&other), Some(Rect::new(10, 10, 5, 5)));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An integer point on the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by a signed origin (x, y) and dimensions.
///
/// # Invariants
///
/// - `x + width` and `y + height` fit in `i32`
/// - A rectangle with zero width or height is empty
///
/// # Example
///
/// ```rust
/// use rimg_core::Rect;
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.right(), 110);
/// assert_eq!(rect.bottom(), 70);
/// assert_eq!(rect.area(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: i32,
    /// Y coordinate of the top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at origin (0, 0) with the given dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Creates a rectangle from two corner points.
    ///
    /// `(x1, y1)` is inclusive and `(x2, y2)` exclusive. Swapped corners are
    /// normalised.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rimg_core::Rect;
    ///
    /// let rect = Rect::from_corners(-5, 20, 5, 10);
    /// assert_eq!(rect, Rect::new(-5, 10, 10, 10));
    /// ```
    #[inline]
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        let (min_x, max_x) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let (min_y, max_y) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        Self::new(
            min_x,
            min_y,
            max_x.abs_diff(min_x),
            max_y.abs_diff(min_y),
        )
    }

    /// Returns the top-left corner.
    #[inline]
    pub const fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the X coordinate of the right edge (exclusive), saturated at
    /// `i32::MAX`.
    #[inline]
    pub const fn right(&self) -> i32 {
        saturate_i32(self.x as i64 + self.width as i64)
    }

    /// Returns the Y coordinate of the bottom edge (exclusive), saturated at
    /// `i32::MAX`.
    #[inline]
    pub const fn bottom(&self) -> i32 {
        saturate_i32(self.y as i64 + self.height as i64)
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    #[inline]
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains another.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another.
    ///
    /// Returns `None` if the rectangles share no pixel.
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        // i64 so that edges past i32::MAX do not wrap
        let x = self.x.max(other.x) as i64;
        let y = self.y.max(other.y) as i64;
        let right = (self.x as i64 + self.width as i64).min(other.x as i64 + other.width as i64);
        let bottom = (self.y as i64 + self.height as i64).min(other.y as i64 + other.height as i64);

        if x < right && y < bottom {
            Some(Rect::new(x as i32, y as i32, (right - x) as u32, (bottom - y) as u32))
        } else {
            None
        }
    }

    /// Returns this rectangle translated by (dx, dy).
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x.saturating_add(dx), self.y.saturating_add(dy), self.width, self.height)
    }
}

#[inline]
const fn saturate_i32(v: i64) -> i32 {
    if v > i32::MAX as i64 { i32::MAX } else { v as i32 }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_negative_origin() {
        let r = Rect::new(-1, -1, 16, 16);
        assert_eq!(r.right(), 15);
        assert_eq!(r.bottom(), 15);
        assert!(r.contains(-1, -1));
        assert!(!r.contains(15, 0));
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));

        let c = Rect::new(100, 0, 10, 10);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_rect_edges_near_i32_max() {
        let far = Rect::new(i32::MAX, 0, 2, 2);
        assert_eq!(far.right(), i32::MAX);
        assert_eq!(Rect::new(0, 0, 4, 4).intersect(&far), None);

        let wide = Rect::new(i32::MAX - 1, i32::MAX - 1, u32::MAX, u32::MAX);
        assert_eq!(
            wide.intersect(&Rect::new(i32::MAX - 1, i32::MAX - 1, 1, 1)),
            Some(Rect::new(i32::MAX - 1, i32::MAX - 1, 1, 1))
        );
        assert_eq!(
            Rect::new(i32::MIN, 0, u32::MAX, 1).intersect(&Rect::from_size(10, 10)),
            Some(Rect::new(0, 0, 10, 1))
        );
    }

    #[test]
    fn test_rect_translate() {
        let r = Rect::new(10, 20, 5, 5).translate(-15, -25);
        assert_eq!(r, Rect::new(-5, -5, 5, 5));
    }

    #[test]
    fn test_rect_from_corners() {
        assert_eq!(Rect::from_corners(3, 4, 1, 1), Rect::new(1, 1, 2, 3));
    }

    #[test]
    fn test_empty_rect() {
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(Rect::default().is_empty());
        assert!(!Rect::from_size(1, 1).is_empty());
    }
}
