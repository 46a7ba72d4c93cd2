// src/processing/output.rs

//! Decides where each processed image goes, in which format and colour mode.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use tracing::debug;

use crate::core::TransformOptions;
use crate::processing::DecodedImage;
use crate::utils::FormatKind;

/// Format used when neither a conversion nor the source format is known.
pub const FALLBACK_FORMAT: FormatKind = FormatKind::Png;

/// Final destination and encoder-ready buffer for one file.
#[derive(Debug, Clone)]
pub struct ResolvedOutput {
    pub output_path: PathBuf,
    pub format: FormatKind,
    pub image: DynamicImage,
}

/// Resolves output paths inside one output directory.
#[derive(Debug, Clone)]
pub struct OutputResolver {
    output_dir: PathBuf,
}

impl OutputResolver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Picks the target format, finalises the colour mode and names the output file.
    ///
    /// An existing file at the resolved path is overwritten by the caller.
    pub fn resolve(
        &self,
        file_name: &str,
        decoded: DecodedImage,
        options: &TransformOptions,
    ) -> ResolvedOutput {
        let format = resolve_format(decoded.source_format, options);

        let mut image = decoded.image;
        if !format.supports_alpha() && image.color().has_alpha() {
            debug!("Dropping alpha channel of '{}' for {}", file_name, format);
            image = DynamicImage::ImageRgb8(image.into_rgb8());
        }

        let output_path = self.output_dir.join(output_file_name(file_name, format));

        ResolvedOutput {
            output_path,
            format,
            image,
        }
    }
}

/// Conversion target first, then the decoded source format, then PNG.
pub fn resolve_format(source_format: Option<FormatKind>, options: &TransformOptions) -> FormatKind {
    options
        .convert
        .map(|c| c.target_format)
        .or(source_format)
        .unwrap_or(FALLBACK_FORMAT)
}

/// `<stem>.<format>`, where the stem is `file_name` minus its last extension.
pub fn output_file_name(file_name: &str, format: FormatKind) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(file_name);
    format!("{stem}.{}", format.extension())
}
