//! Batch configuration built once before a run.

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::core::TransformOptions;
use crate::utils::{BatchError, BatchResult};

/// Everything the front end supplies for one run.
///
/// Can be loaded from a JSON settings file (camelCase keys) and then
/// overridden field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchConfig {
    /// Folder scanned for images
    pub input_dir: PathBuf,
    /// Folder receiving processed images
    pub output_dir: PathBuf,
    /// Operations applied to each image
    #[serde(flatten)]
    pub options: TransformOptions,
    /// TrueType/OpenType font used for the watermark
    pub font_path: Option<PathBuf>,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: TransformOptions) -> Self {
        self.options = options;
        self
    }

    /// Parses a settings document.
    pub fn from_json(json: &str) -> BatchResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BatchError::processing(format!("Invalid settings: {e}")))
    }

    /// Reads and parses a settings file.
    pub fn from_json_file(path: impl AsRef<Path>) -> BatchResult<Self> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
