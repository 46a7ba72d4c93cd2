use std::path::Path;
use crate::core::{BatchConfig, TransformOptions};
use crate::utils::{BatchResult, ValidationError};

/// Validates a batch configuration before any file is touched
pub fn validate_config(config: &BatchConfig) -> BatchResult<()> {
    validate_directories(&config.input_dir, &config.output_dir)?;
    validate_options(&config.options)?;
    Ok(())
}

/// Validates the input and output folders
pub fn validate_directories(input: &Path, output: &Path) -> BatchResult<()> {
    if input.as_os_str().is_empty() {
        return Err(ValidationError::missing("input").into());
    }
    if output.as_os_str().is_empty() {
        return Err(ValidationError::missing("output").into());
    }

    if input == output {
        return Err(ValidationError::same_directory(input).into());
    }

    if !input.exists() {
        return Err(ValidationError::path_not_found(input).into());
    }
    if !input.is_dir() {
        return Err(ValidationError::not_a_directory(input).into());
    }

    if output.exists() {
        if !output.is_dir() {
            return Err(ValidationError::not_a_directory(output).into());
        }
        // Catch aliases such as "photos/" vs "./photos"
        if let (Ok(a), Ok(b)) = (input.canonicalize(), output.canonicalize()) {
            if a == b {
                return Err(ValidationError::same_directory(input).into());
            }
        }
    }

    Ok(())
}

/// Validates transform settings
pub fn validate_options(options: &TransformOptions) -> BatchResult<()> {
    if let Some(compress) = &options.compress {
        if compress.quality == 0 || compress.quality > 100 {
            return Err(ValidationError::settings(format!(
                "Invalid quality value: {}. Must be between 1 and 100",
                compress.quality
            ))
            .into());
        }
    }

    if let Some(watermark) = &options.watermark {
        if watermark.text.trim().is_empty() {
            return Err(ValidationError::settings("Watermark text cannot be empty").into());
        }
    }

    Ok(())
}
