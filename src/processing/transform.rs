// src/processing/transform.rs

//! The fixed per-image pipeline: RGBA normalisation, resize, watermark.

use image::DynamicImage;
use image::imageops::FilterType;
use tracing::debug;

use crate::core::{ResizeOptions, TransformOptions};
use crate::processing::{DecodedImage, WatermarkRenderer};
use crate::utils::TransformError;

type Result<T> = std::result::Result<T, TransformError>;

/// Applies the optional resize and watermark steps, always in that order.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    renderer: WatermarkRenderer,
}

impl ImageTransformer {
    pub fn new(renderer: WatermarkRenderer) -> Self {
        Self { renderer }
    }

    /// Runs the pipeline on one decoded image.
    ///
    /// The result is always RGBA; colour-mode changes required by the output
    /// format happen later, in the output resolver.
    pub fn apply(&self, decoded: DecodedImage, options: &TransformOptions) -> Result<DecodedImage> {
        let DecodedImage { image, source_format } = decoded;
        let mut image = DynamicImage::ImageRgba8(image.into_rgba8());

        if let Some(resize) = &options.resize {
            image = apply_resize(image, resize)?;
        }

        if let Some(watermark) = &options.watermark {
            let rgba = self.renderer.render(image.into_rgba8(), &watermark.text);
            image = DynamicImage::ImageRgba8(rgba);
        }

        Ok(DecodedImage::new(image, source_format))
    }
}

/// Resamples `image` to exactly `settings.width` x `settings.height`.
///
/// Aspect ratio is not preserved. Zero on either side is rejected before any
/// resampling happens.
pub fn apply_resize(image: DynamicImage, settings: &ResizeOptions) -> Result<DynamicImage> {
    let ResizeOptions { width, height } = *settings;
    if width == 0 || height == 0 {
        return Err(TransformError::InvalidDimensions { width, height });
    }

    if image.width() == width && image.height() == height {
        return Ok(image);
    }

    debug!("Resizing {}x{} -> {}x{}", image.width(), image.height(), width, height);
    Ok(image.resize_exact(width, height, FilterType::Lanczos3))
}
