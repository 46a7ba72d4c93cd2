// src/processing/watermark.rs

//! Bottom-right text badge: a translucent black box with white text on top.
//!
//! Text is drawn with a scalable TrueType/OpenType font when one can be
//! loaded, sized to 5% of the image height. Without one, a built-in 8x8
//! bitmap font is scaled to a fixed small size so watermarking never fails
//! for lack of fonts.

use std::fmt;
use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use lazy_static::lazy_static;
use tracing::{debug, info, warn};

/// Distance between the badge text and the bottom/right image edges.
pub const MARGIN: i32 = 15;
/// Backing box overhang on each side of the text.
pub const PADDING: i32 = 5;
/// Scalable font size as a fraction of image height.
const FONT_SIZE_RATIO: f32 = 0.05;
/// Pixel size used with the bitmap fallback font.
const BITMAP_FONT_SIZE: u32 = 15;
const BITMAP_GLYPH_SIZE: u32 = 8;

const BACKING_COLOR: Rgba<u8> = Rgba([0, 0, 0, 128]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 220]);

const SYSTEM_FONT_PATHS: &[&str] = &[
    "arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

lazy_static! {
    /// First loadable system font, probed once per process.
    static ref SYSTEM_FONT: Option<FontArc> = load_system_font();
}

fn load_font_file(path: &Path) -> Option<FontArc> {
    let data = std::fs::read(path).ok()?;
    FontArc::try_from_vec(data).ok()
}

fn load_system_font() -> Option<FontArc> {
    for path in SYSTEM_FONT_PATHS {
        if let Some(font) = load_font_file(Path::new(path)) {
            info!("Loaded watermark font: {}", path);
            return Some(font);
        }
    }
    debug!("No system font found, watermark falls back to the bitmap font");
    None
}

/// Where the badge lands on the image.
///
/// Coordinates may be negative when the text is larger than the image; the
/// badge is then clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeGeometry {
    pub text_x: i32,
    pub text_y: i32,
    pub backing: Rect,
}

/// Anchors a `text_w` x `text_h` box at the bottom-right corner.
pub fn badge_geometry(image_w: u32, image_h: u32, text_w: u32, text_h: u32) -> BadgeGeometry {
    let text_x = image_w as i32 - text_w as i32 - MARGIN;
    let text_y = image_h as i32 - text_h as i32 - MARGIN;
    let backing = Rect::at(text_x - PADDING, text_y - PADDING).of_size(
        text_w.max(1) + 2 * PADDING as u32,
        text_h.max(1) + 2 * PADDING as u32,
    );

    BadgeGeometry {
        text_x,
        text_y,
        backing,
    }
}

#[derive(Clone)]
enum WatermarkFont {
    Scalable(FontArc),
    Bitmap,
}

/// Draws watermark badges; cheap to clone.
#[derive(Clone)]
pub struct WatermarkRenderer {
    font: WatermarkFont,
}

impl fmt::Debug for WatermarkRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let font = match self.font {
            WatermarkFont::Scalable(_) => "scalable",
            WatermarkFont::Bitmap => "bitmap",
        };
        f.debug_struct("WatermarkRenderer").field("font", &font).finish()
    }
}

impl WatermarkRenderer {
    /// Resolves a font: `font_path` first, then system fonts, then the bitmap font.
    pub fn new(font_path: Option<&Path>) -> Self {
        if let Some(path) = font_path {
            match load_font_file(path) {
                Some(font) => return Self::with_font(font),
                None => warn!("Could not load font {}, trying system fonts", path.display()),
            }
        }

        match SYSTEM_FONT.as_ref() {
            Some(font) => Self::with_font(font.clone()),
            None => Self::bitmap(),
        }
    }

    pub fn with_font(font: FontArc) -> Self {
        Self {
            font: WatermarkFont::Scalable(font),
        }
    }

    /// Renderer that always uses the built-in bitmap font.
    pub fn bitmap() -> Self {
        Self {
            font: WatermarkFont::Bitmap,
        }
    }

    /// Measures `text` as it would be drawn on an image `image_height` pixels tall.
    pub fn measure(&self, text: &str, image_height: u32) -> (u32, u32) {
        match &self.font {
            WatermarkFont::Scalable(font) => text_size(scalable_size(image_height), font, text),
            WatermarkFont::Bitmap => bitmap_text_size(text, bitmap_scale()),
        }
    }

    /// Draws the badge for `text` onto `image` and returns it.
    ///
    /// Dimensions and pixel layout are unchanged; only pixels under the badge
    /// are composited, and fully opaque pixels stay fully opaque.
    pub fn render(&self, mut image: RgbaImage, text: &str) -> RgbaImage {
        let (width, height) = image.dimensions();
        let (text_w, text_h) = self.measure(text, height);
        let geometry = badge_geometry(width, height, text_w, text_h);

        debug!(
            "Watermark {}x{} at ({}, {}) on {}x{}",
            text_w, text_h, geometry.text_x, geometry.text_y, width, height
        );

        // Text coverage, in badge-local coordinates
        let backing = geometry.backing;
        let mut coverage = GrayImage::new(backing.width(), backing.height());
        match &self.font {
            WatermarkFont::Scalable(font) => draw_text_mut(
                &mut coverage,
                Luma([255]),
                PADDING,
                PADDING,
                scalable_size(height),
                font,
                text,
            ),
            WatermarkFont::Bitmap => {
                draw_bitmap_text(&mut coverage, PADDING, PADDING, text, bitmap_scale())
            }
        }

        for (mx, my, cov) in coverage.enumerate_pixels() {
            let x = backing.left() + mx as i32;
            let y = backing.top() + my as i32;
            if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
                continue;
            }
            let pixel = image.get_pixel_mut(x as u32, y as u32);
            *pixel = source_over(*pixel, BACKING_COLOR, u8::MAX);
            *pixel = source_over(*pixel, TEXT_COLOR, cov[0]);
        }

        image
    }
}

/// `(v + 127) / 255`: integer division by 255, rounded.
fn div255(v: u32) -> u32 {
    (v + 127) / 255
}

/// Integer source-over of `src` (alpha scaled by `coverage`) onto `dst`.
///
/// `dst` alpha 255 always yields alpha 255.
fn source_over(dst: Rgba<u8>, src: Rgba<u8>, coverage: u8) -> Rgba<u8> {
    let src_a = div255(u32::from(src[3]) * u32::from(coverage));
    if src_a == 0 {
        return dst;
    }
    let dst_a = div255(u32::from(dst[3]) * (255 - src_a));
    let out_a = src_a + dst_a;

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * src_a + u32::from(dst[i]) * dst_a;
        out[i] = ((c + out_a / 2) / out_a).min(255) as u8;
    }
    out[3] = out_a as u8;
    Rgba(out)
}

fn scalable_size(image_height: u32) -> PxScale {
    PxScale::from((image_height as f32 * FONT_SIZE_RATIO).round().max(1.0))
}

fn bitmap_scale() -> u32 {
    ((BITMAP_FONT_SIZE as f32 / BITMAP_GLYPH_SIZE as f32).round() as u32).max(1)
}

fn glyph_for(ch: char) -> [u8; 8] {
    BASIC_FONTS
        .get(ch)
        .or_else(|| LATIN_FONTS.get(ch))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or_default()
}

/// Glyphs are `8 * scale` square with a `scale`-wide gap between them.
fn bitmap_text_size(text: &str, scale: u32) -> (u32, u32) {
    let count = text.chars().count() as u32;
    if count == 0 {
        return (0, 0);
    }
    let glyph = BITMAP_GLYPH_SIZE * scale;
    (count * glyph + (count - 1) * scale, glyph)
}

fn draw_bitmap_text(canvas: &mut GrayImage, x: i32, y: i32, text: &str, scale: u32) {
    let advance = ((BITMAP_GLYPH_SIZE + 1) * scale) as i32;
    for (i, ch) in text.chars().enumerate() {
        let origin_x = x + i as i32 * advance;
        for (row, bits) in glyph_for(ch).iter().enumerate() {
            for col in 0..BITMAP_GLYPH_SIZE {
                if (*bits >> col) & 1 == 0 {
                    continue;
                }
                let px = origin_x + (col * scale) as i32;
                let py = y + (row as u32 * scale) as i32;
                draw_filled_rect_mut(canvas, Rect::at(px, py).of_size(scale, scale), Luma([255]));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba([120, 120, 120, 255]))
    }

    #[test]
    fn geometry_anchors_bottom_right() {
        let g = badge_geometry(800, 600, 100, 20);
        assert_eq!((g.text_x, g.text_y), (685, 565));
        assert_eq!((g.backing.left(), g.backing.top()), (680, 560));
        assert_eq!((g.backing.width(), g.backing.height()), (110, 30));
    }

    #[test]
    fn geometry_goes_negative_for_oversized_text() {
        let g = badge_geometry(20, 10, 100, 30);
        assert!(g.text_x < 0);
        assert!(g.text_y < 0);
    }

    #[test]
    fn bitmap_text_size_counts_gaps() {
        assert_eq!(bitmap_text_size("ab", 2), (16 + 2 + 16, 16));
        assert_eq!(bitmap_text_size("", 2), (0, 0));
        assert_eq!(bitmap_scale(), 2);
    }

    #[test]
    fn render_keeps_dimensions_and_darkens_badge() {
        let renderer = WatermarkRenderer::bitmap();
        let out = renderer.render(gray(200, 100), "Hi");

        assert_eq!(out.dimensions(), (200, 100));

        let (w, h) = renderer.measure("Hi", 100);
        let g = badge_geometry(200, 100, w, h);
        // Corner of the backing box: background only, half-transparent black over gray
        let corner = out.get_pixel(g.backing.left() as u32, g.backing.top() as u32);
        assert!(corner[0] < 120);
        assert_eq!(corner[3], 255);

        // Far from the badge nothing changes
        assert_eq!(*out.get_pixel(0, 0), Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn render_draws_white_text() {
        let renderer = WatermarkRenderer::bitmap();
        let out = renderer.render(gray(200, 100), "HHHH");
        let brightest = out.pixels().map(|p| p[0]).max().unwrap_or(0);
        assert!(brightest > 200, "expected near-white text, brightest was {brightest}");
    }

    #[test]
    fn oversized_text_is_clipped_not_fatal() {
        let renderer = WatermarkRenderer::bitmap();
        let out = renderer.render(gray(10, 10), "a very long watermark");
        assert_eq!(out.dimensions(), (10, 10));
    }

    #[test]
    fn source_over_keeps_opaque_pixels_opaque() {
        for dst in [0u8, 77, 120, 255] {
            for coverage in [1u8, 128, 255] {
                let out = source_over(Rgba([dst, dst, dst, 255]), TEXT_COLOR, coverage);
                assert_eq!(out[3], 255, "dst {dst} coverage {coverage}");
                let out = source_over(Rgba([dst, dst, dst, 255]), BACKING_COLOR, coverage);
                assert_eq!(out[3], 255, "dst {dst} coverage {coverage}");
            }
        }
    }

    #[test]
    fn source_over_onto_transparent_takes_source() {
        assert_eq!(source_over(Rgba([9, 9, 9, 0]), BACKING_COLOR, 255), Rgba([0, 0, 0, 128]));
        assert_eq!(source_over(Rgba([9, 9, 9, 0]), TEXT_COLOR, 255), Rgba([255, 255, 255, 220]));
        // Zero coverage leaves the pixel alone
        assert_eq!(source_over(Rgba([9, 9, 9, 40]), TEXT_COLOR, 0), Rgba([9, 9, 9, 40]));
    }

    #[test]
    fn render_keeps_every_pixel_opaque() {
        let out = WatermarkRenderer::bitmap().render(gray(200, 100), "Hi");
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn scalable_size_is_five_percent_of_height() {
        assert_eq!(scalable_size(1000), PxScale::from(50.0));
        assert_eq!(scalable_size(600), PxScale::from(30.0));
        assert_eq!(scalable_size(610), PxScale::from(31.0));
        assert_eq!(scalable_size(10), PxScale::from(1.0));
        assert_eq!(scalable_size(5), PxScale::from(1.0));
    }

    #[test]
    fn scalable_font_renders_text_sized_to_height() {
        let Some(font) = SYSTEM_FONT_PATHS
            .iter()
            .find_map(|path| load_font_file(Path::new(path)))
        else {
            eprintln!("no system font available, skipping");
            return;
        };
        let renderer = WatermarkRenderer::with_font(font);

        let (small_w, small_h) = renderer.measure("HHH", 200);
        let (big_w, big_h) = renderer.measure("HHH", 1000);
        assert!(big_w > small_w && big_h > small_h);
        assert!(big_h <= 80, "50px text measured {big_h}px tall");

        let out = renderer.render(gray(600, 1000), "HHH");
        assert_eq!(out.dimensions(), (600, 1000));
        assert!(out.pixels().all(|p| p[3] == 255));
        let brightest = out.pixels().map(|p| p[0]).max().unwrap_or(0);
        assert!(brightest > 200, "expected near-white text, brightest was {brightest}");
        assert_eq!(*out.get_pixel(0, 0), Rgba([120, 120, 120, 255]));
    }

    #[test]
    fn unreadable_font_path_falls_back() {
        let renderer = WatermarkRenderer::new(Some(Path::new("/no/such/font.ttf")));
        let out = renderer.render(gray(64, 64), "©");
        assert_eq!(out.dimensions(), (64, 64));
    }
}
