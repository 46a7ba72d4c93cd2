//! Error types for the batch processor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.
//! [`BatchError`] is fatal for a run; [`TransformError`] is scoped to a single file
//! and ends up as a failed outcome in the batch report.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use serde::Serialize;

/// Validation errors for the batch configuration.
#[derive(Error, Debug, Serialize)]
pub enum ValidationError {
    /// Path-related validation error
    #[error("Path error: {0}")]
    Path(#[from] PathError),
    /// Invalid settings error
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Directory path errors.
#[derive(Error, Debug, Serialize)]
pub enum PathError {
    /// A required directory was not supplied
    #[error("No {0} folder selected")]
    Missing(&'static str),
    /// Directory does not exist
    #[error("Folder not found: {0}")]
    NotFound(PathBuf),
    /// Path exists but is not a directory
    #[error("Not a folder: {0}")]
    NotDirectory(PathBuf),
    /// Input and output resolve to the same directory
    #[error("Input and output folders cannot be the same: {0}")]
    SameDirectory(PathBuf),
    /// Directory could not be listed or created
    #[error("Could not access folder {path}: {reason}")]
    Inaccessible { path: PathBuf, reason: String },
}

/// Main error type for a batch run.
///
/// Anything surfacing as `BatchError` stops the run before (or instead of)
/// touching any file.
#[derive(Error, Debug, Serialize)]
pub enum BatchError {
    /// Configuration validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Batch-level processing failed
    #[error("Processing error: {0}")]
    Processing(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),
}

/// Convenience result type for batch operations.
pub type BatchResult<T> = Result<T, BatchError>;

/// Per-file failure raised while decoding, transforming or encoding one image.
#[derive(Error, Debug, Serialize)]
pub enum TransformError {
    /// Resize target has a zero side
    #[error("Invalid width or height for resizing: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// Source could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoder rejected the buffer
    #[error("Encode error: {0}")]
    Encode(String),

    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    IO(String),

    /// Format could not be determined or is unsupported
    #[error("Format error: {0}")]
    Format(String),
}

// Helper methods for error creation
impl BatchError {
    pub fn processing<T: Into<String>>(msg: T) -> Self {
        Self::Processing(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    /// Returns `true` for errors raised before any file was touched.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// Helper methods for validation error creation
impl ValidationError {
    pub fn missing(which: &'static str) -> Self {
        Self::Path(PathError::Missing(which))
    }

    pub fn path_not_found(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotFound(path.into()))
    }

    pub fn not_a_directory(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::NotDirectory(path.into()))
    }

    pub fn same_directory(path: impl Into<PathBuf>) -> Self {
        Self::Path(PathError::SameDirectory(path.into()))
    }

    pub fn inaccessible(path: impl Into<PathBuf>, err: impl ToString) -> Self {
        Self::Path(PathError::Inaccessible {
            path: path.into(),
            reason: err.to_string(),
        })
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

impl TransformError {
    pub fn encode(err: impl ToString) -> Self {
        Self::Encode(err.to_string())
    }
}

// Convert std::io::Error to BatchError
impl From<io::Error> for BatchError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

// Convert PathError to BatchError
impl From<PathError> for BatchError {
    fn from(err: PathError) -> Self {
        Self::Validation(ValidationError::Path(err))
    }
}

impl From<io::Error> for TransformError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<image::ImageError> for TransformError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::IO(e.to_string()),
            image::ImageError::Unsupported(e) => Self::Format(e.to_string()),
            image::ImageError::Encoding(e) => Self::Encode(e.to_string()),
            other => Self::Decode(other.to_string()),
        }
    }
}
