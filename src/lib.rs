// Module declarations in dependency order
pub mod core;
pub mod processing;
pub mod utils;

// Public exports for external consumers
pub use self::core::{
    BatchConfig, BatchReport, BatchStatus, CancellationFlag, FileOutcome, Progress,
    TransformOptions,
};
pub use processing::BatchProcessor;
pub use utils::{BatchError, BatchResult, FormatKind};

// This library file is used as a public API for consuming this crate as a library.
// The command-line entry point is in main.rs.
