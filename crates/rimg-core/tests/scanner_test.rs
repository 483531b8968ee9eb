//! Integration tests: every scanner fast path against the per-pixel path.

use rimg_core::{
    chroma_size, to_nrgba, PackedFormat, PackedImage, PalettedImage, PixelSource, Rect, Scanner,
    SourceImage, SubsampleRatio, YCbCrImage,
};
use std::sync::Arc;

/// Deterministic test color for absolute (x, y); alpha never drops below 16.
fn pattern(x: i32, y: i32) -> [u8; 4] {
    let h = (x.wrapping_mul(73_856_093) ^ y.wrapping_mul(19_349_663)) as u32;
    [
        (h & 0xff) as u8,
        ((h >> 8) & 0xff) as u8,
        ((h >> 16) & 0xff) as u8,
        16 + ((h >> 24) % 240) as u8,
    ]
}

fn bounds() -> Rect {
    Rect::new(-1, -1, 16, 16)
}

fn packed(format: PackedFormat) -> PackedImage {
    let r = bounds();
    let mut img = PackedImage::new(format, r);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            img.set_color(x, y, pattern(x, y));
        }
    }
    img
}

/// Scans `src` twice, through its own fast path and forced through the
/// generic accessor, and checks both agree within one unit per channel.
fn assert_matches_generic(src: SourceImage, generic: Arc<dyn PixelSource>, expected_path: &str) {
    let generic = SourceImage::Generic(generic);
    let fast = Scanner::new(&src);
    let slow = Scanner::new(&generic);
    assert_eq!(fast.path(), expected_path);
    assert_eq!(slow.path(), "generic");

    let (w, h) = (fast.width(), fast.height());
    for (x1, y1, x2, y2) in [(0, 0, w, h), (3, 2, 11, 15), (0, 7, 1, 8), (5, 5, 5, 9)] {
        let a = fast.scan_to_vec(x1, y1, x2, y2);
        let b = slow.scan_to_vec(x1, y1, x2, y2);
        assert_eq!(a.len(), b.len());
        for (i, (pa, pb)) in a.iter().zip(&b).enumerate() {
            assert!(
                (*pa as i32 - *pb as i32).abs() <= 1,
                "{expected_path}: byte {i} of region ({x1},{y1})-({x2},{y2}): {pa} vs {pb}"
            );
        }
    }
}

#[test]
fn test_packed_formats_match_generic() {
    for format in [
        PackedFormat::Nrgba,
        PackedFormat::Nrgba64,
        PackedFormat::Rgba,
        PackedFormat::Rgba64,
        PackedFormat::Gray,
        PackedFormat::Gray16,
    ] {
        let img = Arc::new(packed(format));
        assert_matches_generic(SourceImage::Packed(img.clone()), img, "packed");
    }
}

#[test]
fn test_ycbcr_ratios_match_generic() {
    for ratio in [
        SubsampleRatio::R444,
        SubsampleRatio::R422,
        SubsampleRatio::R420,
        SubsampleRatio::R440,
        SubsampleRatio::R411,
        SubsampleRatio::R410,
    ] {
        let r = bounds();
        let mut img = YCbCrImage::new(r, ratio);
        for y in r.y..r.bottom() {
            for x in r.x..r.right() {
                img.set_color(x, y, pattern(x, y));
            }
        }
        let (cw, ch) = chroma_size(r, ratio);
        assert_eq!(img.cb_plane().len(), (cw * ch) as usize);

        let img = Arc::new(img);
        assert_matches_generic(SourceImage::YCbCr(img.clone()), img, "ycbcr");
    }
}

#[test]
fn test_paletted_matches_generic() {
    let r = bounds();
    let palette: Vec<[u8; 4]> = (0..200)
        .map(|i| {
            let [cr, cg, cb, a] = pattern(i, -i);
            // palette entries are premultiplied
            let pm = |c: u8| (c as u16 * a as u16 / 255) as u8;
            [pm(cr), pm(cg), pm(cb), a]
        })
        .collect();
    let mut img = PalettedImage::new(r, palette);
    for y in r.y..r.bottom() {
        for x in r.x..r.right() {
            // indices past 200 exercise the out-of-range case
            img.set_index(x, y, (pattern(x, y)[0] as u16 * 220 / 255) as u8);
        }
    }
    let img = Arc::new(img);
    assert_matches_generic(SourceImage::Paletted(img.clone()), img, "paletted");
}

#[test]
fn test_alpha_formats_go_generic() {
    for format in [PackedFormat::Alpha, PackedFormat::Alpha16] {
        let src = SourceImage::from(packed(format));
        let scanner = Scanner::new(&src);
        assert_eq!(scanner.path(), "generic");
        let out = scanner.scan_to_vec(0, 0, 1, 1);
        assert_eq!(&out[..3], &[255, 255, 255]);
        assert_eq!(out[3], pattern(-1, -1)[3]);
    }
}

#[test]
fn test_to_nrgba_normalises_origin() {
    let img = packed(PackedFormat::Nrgba);
    let out = to_nrgba(img);
    assert_eq!(out.bounds(), Rect::from_size(16, 16));
    assert_eq!(out.pixel(0, 0), pattern(-1, -1));
    assert_eq!(out.pixel(15, 15), pattern(14, 14));
}
