//! Core types for transform settings and batch results.

use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use crate::utils::FormatKind;

/// Default watermark text offered by the front end.
pub const DEFAULT_WATERMARK_TEXT: &str = "© Dagham.com";
/// Default unified quality when compression is enabled without a value.
pub const DEFAULT_QUALITY: u8 = 100;

/// Declarative set of operations applied to every image in a run.
///
/// Each field is optional; an absent option leaves the image untouched for
/// that step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Resize to exact dimensions
    pub resize: Option<ResizeOptions>,
    /// Text watermark in the bottom-right corner
    pub watermark: Option<WatermarkOptions>,
    /// Convert every output to one format
    pub convert: Option<ConvertOptions>,
    /// Unified 1-100 quality applied through the format's encoder knob
    pub compress: Option<CompressOptions>,
}

/// Resize target. No aspect-ratio preservation: the image is stretched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizeOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkOptions {
    pub text: String,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            text: DEFAULT_WATERMARK_TEXT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConvertOptions {
    pub target_format: FormatKind,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            target_format: FormatKind::Jpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressOptions {
    /// Unified quality, 1 (smallest) to 100 (best)
    pub quality: u8,
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Outcome of processing a single input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum FileOutcome {
    /// Output written
    #[serde(rename_all = "camelCase")]
    Success {
        file_name: String,
        output_path: PathBuf,
        format: FormatKind,
        /// Input file size in bytes
        original_size: u64,
        /// Output file size in bytes
        output_size: u64,
    },
    /// Not attempted (e.g. the run was cancelled first)
    #[serde(rename_all = "camelCase")]
    Skipped { file_name: String, reason: String },
    /// Attempted and failed; the batch carried on
    #[serde(rename_all = "camelCase")]
    Failed { file_name: String, message: String },
}

/// A failed file as listed in the report summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file_name: String,
    pub message: String,
}

/// Overall classification of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BatchStatus {
    /// No matching image files in the input folder
    Empty,
    /// Every file succeeded
    Succeeded,
    /// Some files failed, at least one succeeded
    PartiallyFailed,
    /// Every attempted file failed
    Failed,
    /// Stopped between files on request
    Cancelled,
}

/// Aggregated result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Number of matching input files
    pub total_files: usize,
    /// Number of files written successfully
    pub succeeded: usize,
    /// Failed files in processing order
    pub failures: Vec<FileFailure>,
    /// Number of files not attempted
    pub skipped: usize,
    /// Every outcome in processing order
    pub outcomes: Vec<FileOutcome>,
    /// Whether the run stopped early on request
    pub cancelled: bool,
    /// Wall-clock time for the run in milliseconds
    pub elapsed_ms: u64,
}

impl BatchReport {
    pub fn with_capacity(total_files: usize) -> Self {
        Self {
            total_files,
            outcomes: Vec::with_capacity(total_files),
            ..Self::default()
        }
    }

    /// Records one outcome and updates the counters.
    pub fn record(&mut self, outcome: FileOutcome) {
        match &outcome {
            FileOutcome::Success { .. } => self.succeeded += 1,
            FileOutcome::Skipped { .. } => self.skipped += 1,
            FileOutcome::Failed { file_name, message } => self.failures.push(FileFailure {
                file_name: file_name.clone(),
                message: message.clone(),
            }),
        }
        self.outcomes.push(outcome);
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn status(&self) -> BatchStatus {
        if self.cancelled {
            BatchStatus::Cancelled
        } else if self.total_files == 0 {
            BatchStatus::Empty
        } else if self.failures.is_empty() {
            BatchStatus::Succeeded
        } else if self.succeeded > 0 {
            BatchStatus::PartiallyFailed
        } else {
            BatchStatus::Failed
        }
    }
}
