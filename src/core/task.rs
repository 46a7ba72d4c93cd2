//! Image task definition and creation.

use std::path::{Path, PathBuf};
use serde::Serialize;
use crate::utils::extract_filename;

/// Represents a single image in a batch.
///
/// Contains the input path and the position of the file within the run.
#[derive(Debug, Clone, Serialize)]
pub struct ImageTask {
    /// Path to the source image file
    pub input_path: PathBuf,
    /// File name as listed in the input folder
    pub file_name: String,
    /// 1-based position within the batch
    pub index: usize,
    /// Number of files in the batch
    pub total: usize,
}

impl ImageTask {
    /// Builds one task per discovered input file, preserving listing order.
    pub fn from_paths(paths: Vec<PathBuf>) -> Vec<Self> {
        let total = paths.len();
        paths
            .into_iter()
            .enumerate()
            .map(|(i, input_path)| Self {
                file_name: extract_filename(&input_path).to_string(),
                input_path,
                index: i + 1,
                total,
            })
            .collect()
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }
}
