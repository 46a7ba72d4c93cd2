//! Image pipeline: decode, transform, resolve the output, encode.
//!
//! - [`codec`]: loading and format-specific encoding
//! - [`transform`]: resize and watermark steps
//! - [`watermark`]: badge rendering with scalable or bitmap fonts
//! - [`output`]: output format, colour mode and file name
//! - [`quality`]: unified quality to encoder parameter mapping
//! - [`batch`]: the sequential per-file driver

pub mod batch;
pub mod codec;
pub mod output;
pub mod quality;
pub mod transform;
pub mod watermark;

pub use batch::BatchProcessor;
pub use codec::{DecodedImage, encode_image, load_image, save_image_as};
pub use output::{OutputResolver, ResolvedOutput};
pub use quality::{EncodeParams, map_quality};
pub use transform::{ImageTransformer, apply_resize};
pub use watermark::WatermarkRenderer;
