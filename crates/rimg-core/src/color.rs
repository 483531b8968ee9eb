//! Scalar pixel conversions shared by the scanner and the source encodings.
//!
//! Two representations meet here:
//!
//! - **canonical**: `[u8; 4]` non-premultiplied RGBA (what [`PixelBuffer`](crate::PixelBuffer) stores)
//! - **rgba64**: `[u16; 4]` alpha-premultiplied RGBA with 16 bits per channel,
//!   the common currency of the generic [`PixelSource`](crate::PixelSource) accessor
//!
//! # Usage
//!
//! ```rust
//! use rimg_core::color::{premultiply, unpremultiply_rgba64};
//!
//! let c = [200, 100, 50, 128];
//! let p = premultiply(c);
//! let back = unpremultiply_rgba64(p);
//! for i in 0..4 {
//!     assert!((back[i] as i32 - c[i] as i32).abs() <= 1);
//! }
//! ```

/// Rounds and clamps a float to `0..=255`.
///
/// Half-way values round up: `clamp_u8(127.5) == 128`.
#[inline]
pub fn clamp_u8(v: f64) -> u8 {
    (v.clamp(0.0, 255.0) + 0.5) as u8
}

/// Converts a full-range JPEG YCbCr triple to RGB.
///
/// 16.16 fixed point, rounded, each channel clamped to `0..=255`.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let yy = (y as i32) << 16;
    let cb = cb as i32 - 128;
    let cr = cr as i32 - 128;

    let r = (yy + 91881 * cr + (1 << 15)) >> 16;
    let g = (yy - 22554 * cb - 46802 * cr + (1 << 15)) >> 16;
    let b = (yy + 116130 * cb + (1 << 15)) >> 16;

    [r.clamp(0, 255) as u8, g.clamp(0, 255) as u8, b.clamp(0, 255) as u8]
}

/// Converts RGB to a full-range JPEG YCbCr triple.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as i32, g as i32, b as i32);

    let yy = (19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16;
    let cb = -11056 * r - 21712 * g + 32768 * b + (257 << 15);
    let cr = 32768 * r - 27440 * g - 5328 * b + (257 << 15);

    [yy as u8, chroma_u8(cb), chroma_u8(cr)]
}

#[inline]
fn chroma_u8(v: i32) -> u8 {
    if (v as u32) & 0xff00_0000 == 0 {
        (v >> 16) as u8
    } else {
        // out of range: saturate to 0 or 255 by sign
        !(v >> 31) as u8
    }
}

/// Premultiplies a canonical color into 16-bit rgba64.
#[inline]
pub fn premultiply(c: [u8; 4]) -> [u16; 4] {
    let a = c[3] as u32;
    let ch = |v: u8| ((v as u32 * 0x101) * a / 0xff) as u16;
    [ch(c[0]), ch(c[1]), ch(c[2]), (a * 0x101) as u16]
}

/// Un-premultiplies 16-bit rgba64 into a canonical color.
///
/// Fully opaque and fully transparent inputs take exact shortcuts.
#[inline]
pub fn unpremultiply_rgba64(c: [u16; 4]) -> [u8; 4] {
    let [r, g, b, a] = c.map(u32::from);
    match a {
        0xffff => [(r >> 8) as u8, (g >> 8) as u8, (b >> 8) as u8, 0xff],
        0 => [0, 0, 0, 0],
        _ => [
            ((r * 0xffff / a) >> 8) as u8,
            ((g * 0xffff / a) >> 8) as u8,
            ((b * 0xffff / a) >> 8) as u8,
            (a >> 8) as u8,
        ],
    }
}

/// Un-premultiplies an 8-bit premultiplied RGBA color.
#[inline]
pub fn unpremultiply_rgba8(c: [u8; 4]) -> [u8; 4] {
    match c[3] {
        0 => [0, 0, 0, 0],
        0xff => c,
        a => {
            let a = a as u16;
            let ch = |v: u8| (v as u16 * 0xff / a) as u8;
            [ch(c[0]), ch(c[1]), ch(c[2]), c[3]]
        }
    }
}

/// Rec.601 luma of a premultiplied rgba64 color, as 16-bit gray.
#[inline]
pub fn gray16(c: [u16; 4]) -> u16 {
    let [r, g, b, _] = c.map(u32::from);
    ((19595 * r + 38470 * g + 7471 * b + (1 << 15)) >> 16) as u16
}

/// Converts an 8-bit RGB color to HSL.
///
/// Hue is in degrees `[0, 360)`, saturation and lightness in `[0, 1]`.
/// Grays have hue and saturation 0.
pub fn rgb_to_hsl(r: u8, g: u8, b: u8) -> (f64, f64, f64) {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return (0.0, 0.0, l);
    }

    let d = max - min;
    let s = if l < 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
    let sector = if max == r {
        (g - b) / d
    } else if max == g {
        2.0 + (b - r) / d
    } else {
        4.0 + (r - g) / d
    };
    let h = sector * 60.0;
    (if h < 0.0 { h + 360.0 } else { h }, s, l)
}

/// Converts HSL (hue in degrees, saturation and lightness in `[0, 1]`) to
/// 8-bit RGB, rounded.
pub fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [u8; 3] {
    if s == 0.0 {
        let c = clamp_u8(l * 255.0);
        return [c, c, c];
    }

    let t1 = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let t2 = 2.0 * l - t1;
    let h = h / 360.0;
    let channel = |t: f64| clamp_u8(hue_to_channel(t1, t2, t) * 255.0);
    [channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0)]
}

#[inline]
fn hue_to_channel(t1: f64, t2: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };
    if 6.0 * t < 1.0 {
        t2 + (t1 - t2) * 6.0 * t
    } else if 2.0 * t < 1.0 {
        t1
    } else if 3.0 * t < 2.0 {
        t2 + (t1 - t2) * (2.0 / 3.0 - t) * 6.0
    } else {
        t2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_u8() {
        assert_eq!(clamp_u8(-3.0), 0);
        assert_eq!(clamp_u8(127.5), 128);
        assert_eq!(clamp_u8(127.49), 127);
        assert_eq!(clamp_u8(300.0), 255);
    }

    #[test]
    fn test_ycbcr_primaries_roundtrip() {
        for rgb in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255], [0, 0, 0]] {
            let [y, cb, cr] = rgb_to_ycbcr(rgb[0], rgb[1], rgb[2]);
            let back = ycbcr_to_rgb(y, cb, cr);
            for i in 0..3 {
                assert!((back[i] as i32 - rgb[i] as i32).abs() <= 2, "{rgb:?} -> {back:?}");
            }
        }
    }

    #[test]
    fn test_gray_is_neutral() {
        assert_eq!(rgb_to_ycbcr(128, 128, 128), [128, 128, 128]);
        assert_eq!(ycbcr_to_rgb(128, 128, 128), [128, 128, 128]);
    }

    #[test]
    fn test_unpremultiply_edges() {
        assert_eq!(unpremultiply_rgba64([0x1234, 0, 0, 0]), [0, 0, 0, 0]);
        assert_eq!(unpremultiply_rgba64([0xffff, 0x8000, 0, 0xffff]), [255, 128, 0, 255]);
        assert_eq!(unpremultiply_rgba8([10, 20, 30, 255]), [10, 20, 30, 255]);
        assert_eq!(unpremultiply_rgba8([64, 0, 0, 128]), [127, 0, 0, 128]);
    }

    #[test]
    fn test_premultiply_opaque() {
        assert_eq!(premultiply([255, 0, 128, 255]), [0xffff, 0, 0x8080, 0xffff]);
    }

    #[test]
    fn test_rgb_to_hsl_known_colors() {
        let cases: [([u8; 3], (f64, f64, f64)); 8] = [
            ([255, 0, 0], (0.0, 1.0, 0.5)),
            ([191, 191, 0], (60.0, 1.0, 0.375)),
            ([0, 128, 0], (120.0, 1.0, 0.25)),
            ([128, 255, 255], (180.0, 1.0, 0.75)),
            ([128, 128, 255], (240.0, 1.0, 0.75)),
            ([191, 64, 191], (300.0, 0.5, 0.5)),
            ([65, 27, 234], (251.1, 0.832, 0.511)),
            ([126, 126, 184], (240.5, 0.29, 0.607)),
        ];
        for ([r, g, b], (h, s, l)) in cases {
            let (gh, gs, gl) = rgb_to_hsl(r, g, b);
            assert!((gh - h).abs() < 0.5, "{r},{g},{b}: hue {gh}");
            assert!((gs - s).abs() < 0.01, "{r},{g},{b}: saturation {gs}");
            assert!((gl - l).abs() < 0.01, "{r},{g},{b}: lightness {gl}");
        }
        assert_eq!(rgb_to_hsl(90, 90, 90).1, 0.0);
    }

    #[test]
    fn test_hsl_to_rgb_known_colors() {
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(120.0, 1.0, 0.25), [0, 128, 0]);
        assert_eq!(hsl_to_rgb(0.0, 0.0, 0.5), [128, 128, 128]);
        let [r, g, b] = hsl_to_rgb(300.0, 0.5, 0.5);
        assert!(r.abs_diff(191) <= 1 && g.abs_diff(64) <= 1 && b.abs_diff(191) <= 1);
    }

    #[test]
    fn test_hsl_roundtrip() {
        for c in [[160, 164, 36], [30, 172, 65], [240, 200, 14], [254, 248, 136], [54, 38, 152], [7, 7, 7]] {
            let (h, s, l) = rgb_to_hsl(c[0], c[1], c[2]);
            let back = hsl_to_rgb(h, s, l);
            for i in 0..3 {
                assert!(back[i].abs_diff(c[i]) <= 1, "{c:?} -> {back:?}");
            }
        }
    }
}
