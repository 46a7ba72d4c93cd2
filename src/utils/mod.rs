pub mod error;
pub mod validation;
pub mod formats;
pub mod fs;

pub use error::{BatchError, BatchResult, PathError, TransformError, ValidationError};
pub use validation::{validate_config, validate_directories, validate_options};
pub use formats::{FormatKind, SUPPORTED_EXTENSIONS, is_supported_image};
pub use fs::{ensure_dir, extract_filename, file_size, list_image_files};
