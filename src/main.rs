// This is the primary entry point for the bulk image processor.
// The lib.rs file serves only as a public API for external consumers.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use bulk_image_processor_lib::core::{
    BatchConfig, BatchReport, BatchStatus, CancellationFlag, CompressOptions, ConvertOptions,
    Progress, ProgressType, ResizeOptions, WatermarkOptions, DEFAULT_WATERMARK_TEXT,
};
use bulk_image_processor_lib::processing::BatchProcessor;
use bulk_image_processor_lib::utils::FormatKind;

const EXIT_FAILURES: u8 = 1;
const EXIT_CONFIGURATION: u8 = 2;

/// Resize, watermark, convert and compress every image in a folder
#[derive(Parser, Debug)]
#[command(name = "bulk-image-processor")]
#[command(version, about, long_about = None)]
struct Args {
    /// Folder containing the source images
    input_dir: Option<PathBuf>,

    /// Folder receiving the processed images (created if missing)
    output_dir: Option<PathBuf>,

    /// JSON settings file; command-line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resize every image to exactly WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", value_parser = parse_resize)]
    resize: Option<ResizeOptions>,

    /// Add a text watermark in the bottom-right corner
    #[arg(
        long,
        value_name = "TEXT",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = DEFAULT_WATERMARK_TEXT
    )]
    watermark: Option<String>,

    /// Convert every image to FORMAT (jpeg, jpg, png, webp, gif, bmp)
    #[arg(long, value_name = "FORMAT")]
    convert: Option<FormatKind>,

    /// Compress with a unified 1-100 quality (100 = best)
    #[arg(
        long,
        value_name = "QUALITY",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "100",
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    compress: Option<u8>,

    /// TrueType/OpenType font for the watermark
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// Print the final report as JSON instead of a text summary
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_resize(s: &str) -> Result<ResizeOptions, String> {
    let (width, height) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let parse = |v: &str, which: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|_| format!("invalid {which} '{v}': must be a whole number"))
    };
    Ok(ResizeOptions {
        width: parse(width, "width")?,
        height: parse(height, "height")?,
    })
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Settings file first, then every flag given on the command line on top.
fn build_config(args: &Args) -> Result<BatchConfig> {
    let mut config = match &args.config {
        Some(path) => BatchConfig::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => BatchConfig::default(),
    };

    if let Some(input) = &args.input_dir {
        config.input_dir = input.clone();
    }
    if let Some(output) = &args.output_dir {
        config.output_dir = output.clone();
    }
    if let Some(resize) = args.resize {
        config.options.resize = Some(resize);
    }
    if let Some(text) = &args.watermark {
        config.options.watermark = Some(WatermarkOptions { text: text.clone() });
    }
    if let Some(target_format) = args.convert {
        config.options.convert = Some(ConvertOptions { target_format });
    }
    if let Some(quality) = args.compress {
        config.options.compress = Some(CompressOptions { quality });
    }
    if let Some(font) = &args.font {
        config.font_path = Some(font.clone());
    }

    Ok(config)
}

fn print_progress(progress: &Progress) {
    match progress.progress_type {
        ProgressType::Start => println!("Found {} image(s)", progress.total),
        ProgressType::Progress => println!("{}", progress.status),
        ProgressType::Error => println!(
            "  failed: {}",
            progress.error.as_deref().unwrap_or("unknown error")
        ),
        ProgressType::Complete => {}
    }
}

fn print_summary(report: &BatchReport) {
    match report.status() {
        BatchStatus::Empty => {
            println!("No image files found");
            return;
        }
        BatchStatus::Succeeded => println!(
            "All {} image(s) processed successfully in {}ms",
            report.succeeded, report.elapsed_ms
        ),
        BatchStatus::PartiallyFailed | BatchStatus::Failed => println!(
            "Processed {} of {} image(s); {} failed:",
            report.succeeded,
            report.total_files,
            report.failed()
        ),
        BatchStatus::Cancelled => println!(
            "Cancelled: {} processed, {} failed, {} skipped",
            report.succeeded,
            report.failed(),
            report.skipped
        ),
    }

    for failure in &report.failures {
        println!("  {}: {}", failure.file_name, failure.message);
    }
}

fn exit_code(report: &BatchReport) -> ExitCode {
    match report.status() {
        BatchStatus::Empty | BatchStatus::Succeeded => ExitCode::SUCCESS,
        BatchStatus::PartiallyFailed | BatchStatus::Failed | BatchStatus::Cancelled => {
            ExitCode::from(EXIT_FAILURES)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    info!("=== Bulk image processor starting ===");

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::from(EXIT_CONFIGURATION);
        }
    };
    debug!("Resolved configuration: {:?}", config);

    let cancellation = CancellationFlag::new();
    let ctrl_c = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping after the current file");
            ctrl_c.cancel();
        }
    });

    let processor = BatchProcessor::new(config).with_cancellation(cancellation);
    let quiet = args.json;
    let result = processor
        .run(|progress| {
            if !quiet {
                print_progress(&progress);
            }
        })
        .await;

    let report = match result {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {e}");
            return if e.is_configuration() {
                ExitCode::from(EXIT_CONFIGURATION)
            } else {
                ExitCode::from(EXIT_FAILURES)
            };
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {e}");
                return ExitCode::from(EXIT_FAILURES);
            }
        }
    } else {
        print_summary(&report);
    }

    info!("Application exiting ({} file(s) written)", report.succeeded);

    exit_code(&report)
}
