use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use crate::utils::{BatchResult, ValidationError, is_supported_image};

/// Get file size in bytes, 0 when the file cannot be inspected
pub fn file_size(path: impl AsRef<Path>) -> u64 {
    std::fs::metadata(path.as_ref())
        .map(|m| m.len())
        .unwrap_or(0)
}

/// Get the final path component as a string
pub fn extract_filename(path: &Path) -> &str {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
}

/// Lists the supported image files directly inside `dir`.
///
/// Subdirectories and files with other extensions are ignored. Entries are
/// returned in the order the platform lists them.
pub async fn list_image_files(dir: impl AsRef<Path>) -> BatchResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| ValidationError::inaccessible(dir, e))?;

    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ValidationError::inaccessible(dir, e))?
    {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);

        if is_file && is_supported_image(&path) {
            files.push(path);
        } else {
            debug!("Ignoring {}", path.display());
        }
    }

    Ok(files)
}

/// Creates `dir` (and parents) when it does not exist yet
pub async fn ensure_dir(dir: impl AsRef<Path>) -> BatchResult<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)
        .await
        .map_err(|e| ValidationError::inaccessible(dir, e))?;
    Ok(())
}
