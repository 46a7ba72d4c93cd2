// src/processing/codec.rs

//! Decoding input files and encoding results with format-specific settings.
//!
//! Encoders get [`EncodeParams`] when compression was requested; otherwise
//! each format uses its encoder defaults.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader};
use tracing::debug;

use crate::processing::EncodeParams;
use crate::utils::{FormatKind, TransformError};

type Result<T> = std::result::Result<T, TransformError>;

// ── Default encoder settings ──────────────────────────────────────────────────────────

const DEFAULT_JPEG_QUALITY: u8 = 75;
const DEFAULT_WEBP_QUALITY: u8 = 80;

/// A decoded image plus the format it was decoded from.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    /// `None` when the decoder reported a format outside [`FormatKind`]
    pub source_format: Option<FormatKind>,
}

impl DecodedImage {
    pub fn new(image: DynamicImage, source_format: Option<FormatKind>) -> Self {
        Self { image, source_format }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Decodes `path`, trusting the file's magic bytes over its extension.
pub fn load_image(path: &Path) -> Result<DecodedImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let source_format = reader.format().and_then(FormatKind::from_image_format);
    let image = reader.decode()?;

    debug!(
        "Loaded '{}': {}x{} {:?} ({})",
        path.display(),
        image.width(),
        image.height(),
        image.color(),
        source_format.map(|f| f.to_string()).unwrap_or_else(|| "unknown".into())
    );

    Ok(DecodedImage::new(image, source_format))
}

// ── Format encoders ───────────────────────────────────────────────────────────────────

/// Encodes `image` as JPEG. The buffer must already be free of alpha.
pub fn encode_jpeg(image: &DynamicImage, params: Option<EncodeParams>) -> Result<Vec<u8>> {
    let quality = match params {
        Some(EncodeParams::Quality(q)) => q.clamp(1, 100),
        _ => DEFAULT_JPEG_QUALITY,
    };

    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(Cursor::new(&mut buffer), quality)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| TransformError::encode(format!("JPEG save failed: {e}")))?;
    Ok(buffer)
}

/// Encodes `image` as PNG with adaptive filtering.
pub fn encode_png(image: &DynamicImage, params: Option<EncodeParams>) -> Result<Vec<u8>> {
    let compression = match params {
        Some(EncodeParams::CompressLevel(0)) => CompressionType::Uncompressed,
        Some(EncodeParams::CompressLevel(level)) => CompressionType::Level(level.min(9)),
        _ => CompressionType::Default,
    };

    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(Cursor::new(&mut buffer), compression, FilterType::Adaptive);
    let (width, height) = (image.width(), image.height());

    let result = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        encoder.write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
    } else {
        let rgb = image.to_rgb8();
        encoder.write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
    };
    result.map_err(|e| TransformError::encode(format!("PNG save failed: {e}")))?;
    Ok(buffer)
}

/// Encodes `image` as lossy WebP via libwebp.
pub fn encode_webp(image: &DynamicImage, params: Option<EncodeParams>) -> Result<Vec<u8>> {
    let quality = match params {
        Some(EncodeParams::Quality(q)) => q.clamp(1, 100),
        _ => DEFAULT_WEBP_QUALITY,
    };

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    let encoded = webp::Encoder::from_rgba(rgba.as_raw(), width, height)
        .encode_simple(false, f32::from(quality))
        .map_err(|e| TransformError::encode(format!("WebP save failed: {e:?}")))?;
    Ok(encoded.to_vec())
}

/// Encodes GIF and BMP, neither of which has a quality knob.
fn encode_untuned(image: &DynamicImage, format: FormatKind) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format.image_format())
        .map_err(|e| TransformError::encode(format!("{format} save failed: {e}")))?;
    Ok(buffer.into_inner())
}

/// Dispatches to the correct encoder for `format`.
pub fn encode_image(
    image: &DynamicImage,
    format: FormatKind,
    params: Option<EncodeParams>,
) -> Result<Vec<u8>> {
    match format {
        FormatKind::Jpeg => encode_jpeg(image, params),
        FormatKind::Png => encode_png(image, params),
        FormatKind::WebP => encode_webp(image, params),
        FormatKind::Gif | FormatKind::Bmp => encode_untuned(image, format),
    }
}

/// Encodes and writes `image` to `output_path`, replacing any existing file.
///
/// Returns the number of bytes written.
pub fn save_image_as(
    image: &DynamicImage,
    output_path: &Path,
    format: FormatKind,
    params: Option<EncodeParams>,
) -> Result<u64> {
    let bytes = encode_image(image, format, params)?;
    std::fs::write(output_path, &bytes)?;
    Ok(bytes.len() as u64)
}
