//! Core application types and state management.
//!
//! This module contains the fundamental types used throughout the application:
//! - [`BatchConfig`]: Input/output folders plus the operations to apply
//! - [`TransformOptions`]: Optional resize, watermark, convert and compress steps
//! - [`ImageTask`]: One input file within a batch
//! - [`FileOutcome`] / [`BatchReport`]: Per-file results and their aggregate
//! - [`Progress`]: Progress events for the front end
//! - [`CancellationFlag`]: Cooperative stop between files

mod config;
mod progress;
mod state;
mod task;
mod types;

pub use config::BatchConfig;
pub use progress::{Progress, ProgressType};
pub use state::CancellationFlag;
pub use task::ImageTask;
pub use types::{
    BatchReport, BatchStatus, CompressOptions, ConvertOptions, FileFailure, FileOutcome,
    ResizeOptions, TransformOptions, WatermarkOptions, DEFAULT_QUALITY, DEFAULT_WATERMARK_TEXT,
};
