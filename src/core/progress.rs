use serde::{Deserialize, Serialize};

/// Progress message type
#[derive(Debug, Deserialize, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ProgressType {
    /// Batch is about to start; `total` is known
    Start,
    /// A file has started processing
    Progress,
    /// The current file failed
    Error,
    /// Batch finished (also emitted for cancelled runs)
    Complete,
}

/// Unified progress struct handed to the front end after each step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Progress type (start, progress, error, complete)
    pub progress_type: ProgressType,
    /// 1-based index of the current file; 0 before the first file
    pub current_index: usize,
    /// Total number of files in the batch
    pub total: usize,
    /// Progress percentage (0-100)
    pub progress_percentage: usize,
    /// Current status message
    pub status: String,
    /// File the event refers to
    #[serde(default)]
    pub file_name: Option<String>,
    /// Optional error message
    #[serde(default)]
    pub error: Option<String>,
}

impl Progress {
    /// Create a new Progress instance with basic information
    pub fn new(
        progress_type: ProgressType,
        current_index: usize,
        total: usize,
        status: &str,
    ) -> Self {
        let progress_percentage = if total > 0 {
            (current_index * 100) / total
        } else {
            0
        };

        Self {
            progress_type,
            current_index,
            total,
            progress_percentage,
            status: status.to_string(),
            file_name: None,
            error: None,
        }
    }

    pub fn start(total: usize) -> Self {
        Self::new(ProgressType::Start, 0, total, "Starting")
    }

    /// Emitted when file `index` (1-based) starts processing.
    pub fn file_started(index: usize, total: usize, file_name: &str) -> Self {
        let status = format!("Processing {index}/{total}: {file_name}");
        let mut progress = Self::new(ProgressType::Progress, index, total, &status);
        progress.file_name = Some(file_name.to_string());
        progress
    }

    pub fn file_failed(index: usize, total: usize, file_name: &str, error: &str) -> Self {
        let status = format!("Could not process file: {file_name}");
        let mut progress = Self::new(ProgressType::Error, index, total, &status);
        progress.file_name = Some(file_name.to_string());
        progress.error = Some(error.to_string());
        progress
    }

    pub fn complete(processed: usize, total: usize) -> Self {
        Self::new(ProgressType::Complete, processed, total, "Processing complete!")
    }
}
