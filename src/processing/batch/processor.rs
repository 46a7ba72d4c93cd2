use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::core::{
    BatchConfig, BatchReport, CancellationFlag, FileOutcome, ImageTask, Progress,
    TransformOptions,
};
use crate::processing::{
    ImageTransformer, OutputResolver, WatermarkRenderer, load_image, map_quality, save_image_as,
};
use crate::utils::{
    BatchResult, TransformError, ensure_dir, file_size, list_image_files, validate_config,
};

const CANCELLED_REASON: &str = "cancelled";

/// Everything a blocking worker needs to process one file.
struct FilePipeline {
    transformer: ImageTransformer,
    resolver: OutputResolver,
    options: TransformOptions,
}

impl FilePipeline {
    fn process(&self, task: &ImageTask) -> Result<FileOutcome, TransformError> {
        let decoded = load_image(task.input_path())?;
        let transformed = self.transformer.apply(decoded, &self.options)?;
        let output = self.resolver.resolve(&task.file_name, transformed, &self.options);

        let params = self
            .options
            .compress
            .map(|c| map_quality(output.format, c.quality));
        let output_size = save_image_as(&output.image, &output.output_path, output.format, params)?;

        Ok(FileOutcome::Success {
            file_name: task.file_name.clone(),
            output_path: output.output_path,
            format: output.format,
            original_size: file_size(task.input_path()),
            output_size,
        })
    }
}

/// Runs one configured batch: validate, list, then process files one by one.
///
/// Per-file failures are recorded and the loop moves on; only configuration
/// problems abort the run.
pub struct BatchProcessor {
    config: BatchConfig,
    cancellation: CancellationFlag,
}

impl BatchProcessor {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            cancellation: CancellationFlag::new(),
        }
    }

    /// Shares `flag` with the caller so the run can be stopped between files.
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = flag;
        self
    }

    /// Processes every supported image in the input folder.
    ///
    /// `progress` receives a `Start` event, one `Progress` event per file
    /// (plus an `Error` event for each failure), and always a final `Complete`.
    pub async fn run(&self, mut progress: impl FnMut(Progress)) -> BatchResult<BatchReport> {
        let started = Instant::now();
        let config = &self.config;

        validate_config(config)?;
        let mut paths = list_image_files(&config.input_dir).await?;
        paths.sort();
        ensure_dir(&config.output_dir).await?;

        let tasks = ImageTask::from_paths(paths);
        let total = tasks.len();

        let mut report = BatchReport::with_capacity(total);
        if total == 0 {
            info!("No image files found in {}", config.input_dir.display());
            progress(Progress::complete(0, 0));
            report.elapsed_ms = started.elapsed().as_millis() as u64;
            return Ok(report);
        }

        info!(
            "Processing {} files: {} -> {}",
            total,
            config.input_dir.display(),
            config.output_dir.display()
        );
        debug!("Options: {:?}", config.options);

        let pipeline = Arc::new(FilePipeline {
            transformer: ImageTransformer::new(WatermarkRenderer::new(config.font_path.as_deref())),
            resolver: OutputResolver::new(&config.output_dir),
            options: config.options.clone(),
        });

        progress(Progress::start(total));

        let mut processed = 0;
        for task in tasks {
            if self.cancellation.is_cancelled() {
                if !report.cancelled {
                    info!("Cancelled before {} ({}/{})", task.file_name, task.index, total);
                    report.cancelled = true;
                }
                report.record(FileOutcome::Skipped {
                    file_name: task.file_name,
                    reason: CANCELLED_REASON.to_string(),
                });
                continue;
            }

            progress(Progress::file_started(task.index, total, &task.file_name));

            let outcome = Self::process_task(Arc::clone(&pipeline), task.clone()).await;
            if let FileOutcome::Failed { file_name, message } = &outcome {
                warn!("Failed to process {}: {}", file_name, message);
                progress(Progress::file_failed(task.index, total, file_name, message));
            }

            processed += 1;
            report.record(outcome);
        }

        report.elapsed_ms = started.elapsed().as_millis() as u64;
        progress(Progress::complete(processed, total));

        if report.failures.is_empty() && !report.cancelled {
            info!(
                "Batch completed successfully: {} files in {}ms",
                report.succeeded, report.elapsed_ms
            );
        } else {
            warn!(
                "Batch completed with {} failed and {} skipped out of {} files",
                report.failed(),
                report.skipped,
                total
            );
        }

        Ok(report)
    }

    /// Runs one file on the blocking pool and turns every error into an outcome.
    async fn process_task(pipeline: Arc<FilePipeline>, task: ImageTask) -> FileOutcome {
        let file_name = task.file_name.clone();
        debug!("Processing {} ({}/{})", file_name, task.index, task.total);

        match tokio::task::spawn_blocking(move || pipeline.process(&task)).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => FileOutcome::Failed {
                file_name,
                message: e.to_string(),
            },
            Err(e) => FileOutcome::Failed {
                file_name,
                message: format!("Worker task failed: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ProgressType, ResizeOptions};

    #[tokio::test]
    async fn missing_input_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out");
        let config = BatchConfig::new(dir.path().join("nope"), &output);

        let mut events = Vec::new();
        let err = BatchProcessor::new(config)
            .run(|p| events.push(p))
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(events.is_empty());
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unlistable_input_leaves_output_uncreated() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();
        std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o000)).unwrap();

        if std::fs::read_dir(&input).is_ok() {
            // Privileged users can list the folder regardless of its mode
            std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = BatchProcessor::new(BatchConfig::new(&input, &output))
            .run(|_| {})
            .await;
        std::fs::set_permissions(&input, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(result.unwrap_err().is_configuration());
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn zero_dimension_fails_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        image::RgbImage::new(4, 4).save(input.join("a.png")).unwrap();

        let options = TransformOptions {
            resize: Some(ResizeOptions { width: 0, height: 10 }),
            ..TransformOptions::default()
        };
        let config = BatchConfig::new(&input, dir.path().join("out")).with_options(options);

        let mut kinds = Vec::new();
        let report = BatchProcessor::new(config)
            .run(|p| kinds.push(p.progress_type))
            .await
            .unwrap();

        assert_eq!(report.failed(), 1);
        assert!(report.failures[0].message.contains("0x10"));
        assert_eq!(
            kinds,
            vec![
                ProgressType::Start,
                ProgressType::Progress,
                ProgressType::Error,
                ProgressType::Complete
            ]
        );
    }
}
