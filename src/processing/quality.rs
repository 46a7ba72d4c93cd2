// src/processing/quality.rs

//! Maps the unified 1-100 quality scale onto each format's encoder knob.

use serde::Serialize;
use crate::utils::FormatKind;

/// Encoder parameters derived from a unified quality value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EncodeParams {
    /// Lossy quality, 1-100 (JPEG, WebP)
    Quality(u8),
    /// zlib effort, 0 (fastest, largest) to 9 (slowest, smallest)
    CompressLevel(u8),
    /// Format has no tunable (GIF, BMP)
    Untuned,
}

/// Maps `quality` (1-100, validated by the caller) to the parameter `format` accepts.
///
/// PNG is lossless, so quality runs the compression level backwards:
/// `round(9 - (q - 1) * 9 / 99)`, which simplifies to `(100 - q) / 11`.
/// With an odd denominator no integer `q` lands on a .5 tie, so half-up and
/// half-to-even give the same 100 values; integer half-up is used.
pub fn map_quality(format: FormatKind, quality: u8) -> EncodeParams {
    match format {
        FormatKind::Jpeg | FormatKind::WebP => EncodeParams::Quality(quality),
        FormatKind::Png => {
            let q = u32::from(quality.clamp(1, 100));
            let level = (2 * (100 - q) + 11) / 22;
            EncodeParams::CompressLevel(level as u8)
        }
        FormatKind::Gif | FormatKind::Bmp => EncodeParams::Untuned,
    }
}
