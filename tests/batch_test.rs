use std::fs;
use std::path::{Path, PathBuf};

use bulk_image_processor_lib::core::{
    BatchConfig, BatchStatus, CancellationFlag, CompressOptions, ConvertOptions, FileOutcome,
    ProgressType, ResizeOptions, TransformOptions, WatermarkOptions,
};
use bulk_image_processor_lib::processing::BatchProcessor;
use bulk_image_processor_lib::utils::FormatKind;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use tempfile::TempDir;

struct Workspace {
    _root: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("input");
        let output = root.path().join("output");
        fs::create_dir(&input).unwrap();
        Self {
            _root: root,
            input,
            output,
        }
    }

    fn config(&self, options: TransformOptions) -> BatchConfig {
        BatchConfig::new(&self.input, &self.output).with_options(options)
    }

    fn write_rgb(&self, name: &str, format: ImageFormat, width: u32, height: u32) {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 3) as u8, (y * 5) as u8, ((x ^ y) & 0xff) as u8])
        });
        image.save_with_format(self.input.join(name), format).unwrap();
    }

    fn write_rgba(&self, name: &str, width: u32, height: u32) {
        let image = RgbaImage::from_fn(width, height, |x, _| Rgba([200, 10, 10, (x * 4) as u8]));
        image.save_with_format(self.input.join(name), ImageFormat::Png).unwrap();
    }

    fn write_bytes(&self, name: &str, bytes: &[u8]) {
        fs::write(self.input.join(name), bytes).unwrap();
    }

    fn out(&self, name: &str) -> PathBuf {
        self.output.join(name)
    }
}

fn dims(path: &Path) -> (u32, u32) {
    let image = image::open(path).unwrap();
    (image.width(), image.height())
}

#[tokio::test]
async fn one_corrupt_file_does_not_stop_the_batch() {
    let ws = Workspace::new();
    ws.write_rgb("01.png", ImageFormat::Png, 20, 10);
    ws.write_rgb("02.jpg", ImageFormat::Jpeg, 20, 10);
    ws.write_bytes("03.png", b"this is not a png");
    ws.write_rgb("04.bmp", ImageFormat::Bmp, 20, 10);
    ws.write_rgb("05.gif", ImageFormat::Gif, 20, 10);

    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .run(|_| {})
        .await
        .unwrap();

    assert_eq!(report.total_files, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].file_name, "03.png");
    assert_eq!(report.status(), BatchStatus::PartiallyFailed);

    assert!(ws.out("01.png").exists());
    assert!(ws.out("02.jpeg").exists());
    assert!(!ws.out("03.png").exists());
    assert!(ws.out("04.bmp").exists());
    assert!(ws.out("05.gif").exists());
}

#[tokio::test]
async fn resize_and_convert_every_file() {
    let ws = Workspace::new();
    ws.write_rgb("wide.png", ImageFormat::Png, 400, 300);
    ws.write_rgb("tall.bmp", ImageFormat::Bmp, 30, 90);

    let options = TransformOptions {
        resize: Some(ResizeOptions { width: 80, height: 60 }),
        convert: Some(ConvertOptions { target_format: FormatKind::WebP }),
        ..TransformOptions::default()
    };
    let report = BatchProcessor::new(ws.config(options)).run(|_| {}).await.unwrap();

    assert_eq!(report.status(), BatchStatus::Succeeded);
    assert_eq!(dims(&ws.out("wide.webp")), (80, 60));
    assert_eq!(dims(&ws.out("tall.webp")), (80, 60));
}

#[tokio::test]
async fn jpeg_extension_comes_from_content() {
    let ws = Workspace::new();
    ws.write_rgb("photo.JPG", ImageFormat::Jpeg, 16, 16);

    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .run(|_| {})
        .await
        .unwrap();

    match &report.outcomes[0] {
        FileOutcome::Success { output_path, format, .. } => {
            assert_eq!(*format, FormatKind::Jpeg);
            assert_eq!(output_path, &ws.out("photo.jpeg"));
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn transparent_png_to_jpeg_drops_alpha() {
    let ws = Workspace::new();
    ws.write_rgba("logo.png", 32, 32);

    let options = TransformOptions {
        convert: Some(ConvertOptions { target_format: FormatKind::Jpeg }),
        watermark: Some(WatermarkOptions::default()),
        ..TransformOptions::default()
    };
    let report = BatchProcessor::new(ws.config(options)).run(|_| {}).await.unwrap();
    assert_eq!(report.succeeded, 1);

    let decoded = image::open(ws.out("logo.jpeg")).unwrap();
    assert_eq!(decoded.color().channel_count(), 3);
}

#[tokio::test]
async fn watermarked_opaque_png_stays_opaque() {
    let ws = Workspace::new();
    ws.write_rgb("banner.png", ImageFormat::Png, 200, 100);

    let options = TransformOptions {
        watermark: Some(WatermarkOptions { text: "Hi".into() }),
        ..TransformOptions::default()
    };
    let report = BatchProcessor::new(ws.config(options)).run(|_| {}).await.unwrap();
    assert_eq!(report.succeeded, 1);

    let out = image::open(ws.out("banner.png")).unwrap().to_rgba8();
    let translucent = out.pixels().filter(|p| p[3] != 255).count();
    assert_eq!(translucent, 0);

    // The badge itself did land in the bottom-right corner
    let source = image::open(ws.input.join("banner.png")).unwrap().to_rgba8();
    assert_ne!(out.get_pixel(180, 80), source.get_pixel(180, 80));
}

#[tokio::test]
async fn resize_only_runs_are_reproducible() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 64, 48);
    ws.write_rgb("b.jpeg", ImageFormat::Jpeg, 64, 48);

    let options = TransformOptions {
        resize: Some(ResizeOptions { width: 32, height: 32 }),
        ..TransformOptions::default()
    };
    let processor = BatchProcessor::new(ws.config(options));

    processor.run(|_| {}).await.unwrap();
    let first = (fs::read(ws.out("a.png")).unwrap(), fs::read(ws.out("b.jpeg")).unwrap());

    processor.run(|_| {}).await.unwrap();
    let second = (fs::read(ws.out("a.png")).unwrap(), fs::read(ws.out("b.jpeg")).unwrap());

    assert_eq!(first, second);
}

#[tokio::test]
async fn compress_lowers_jpeg_size() {
    let ws = Workspace::new();
    ws.write_rgb("pic.png", ImageFormat::Png, 128, 128);

    let to_jpeg = |quality| TransformOptions {
        convert: Some(ConvertOptions { target_format: FormatKind::Jpeg }),
        compress: Some(CompressOptions { quality }),
        ..TransformOptions::default()
    };

    BatchProcessor::new(ws.config(to_jpeg(95))).run(|_| {}).await.unwrap();
    let high = fs::metadata(ws.out("pic.jpeg")).unwrap().len();

    BatchProcessor::new(ws.config(to_jpeg(10))).run(|_| {}).await.unwrap();
    let low = fs::metadata(ws.out("pic.jpeg")).unwrap().len();

    assert!(low < high, "quality 10 ({low} bytes) should be smaller than 95 ({high} bytes)");
}

#[tokio::test]
async fn same_folder_is_a_configuration_error() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 8, 8);

    let config = BatchConfig::new(&ws.input, &ws.input);
    let mut events = 0;
    let err = BatchProcessor::new(config)
        .run(|_| events += 1)
        .await
        .unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(events, 0);
    assert_eq!(fs::read_dir(&ws.input).unwrap().count(), 1);
}

#[tokio::test]
async fn invalid_quality_is_a_configuration_error() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 8, 8);

    let options = TransformOptions {
        compress: Some(CompressOptions { quality: 0 }),
        ..TransformOptions::default()
    };
    let err = BatchProcessor::new(ws.config(options)).run(|_| {}).await.unwrap_err();
    assert!(err.is_configuration());
    assert!(!ws.output.exists());
}

#[tokio::test]
async fn folder_without_images_is_empty_not_an_error() {
    let ws = Workspace::new();
    ws.write_bytes("notes.txt", b"hello");
    fs::create_dir(ws.input.join("nested.png")).unwrap();

    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .run(|_| {})
        .await
        .unwrap();

    assert_eq!(report.total_files, 0);
    assert_eq!(report.status(), BatchStatus::Empty);
    assert!(ws.output.is_dir());
}

#[tokio::test]
async fn cancellation_before_start_skips_everything() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 8, 8);
    ws.write_rgb("b.png", ImageFormat::Png, 8, 8);

    let flag = CancellationFlag::new();
    flag.cancel();

    let mut kinds = Vec::new();
    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .with_cancellation(flag)
        .run(|p| kinds.push(p.progress_type))
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.succeeded, 0);
    assert_eq!(report.status(), BatchStatus::Cancelled);
    assert_eq!(kinds, vec![ProgressType::Start, ProgressType::Complete]);
    assert!(!ws.out("a.png").exists());
}

#[tokio::test]
async fn cancelling_mid_run_finishes_the_current_file() {
    let ws = Workspace::new();
    for name in ["1.png", "2.png", "3.png"] {
        ws.write_rgb(name, ImageFormat::Png, 8, 8);
    }

    let flag = CancellationFlag::new();
    let trigger = flag.clone();
    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .with_cancellation(flag)
        .run(move |p| {
            if p.progress_type == ProgressType::Progress && p.current_index == 1 {
                trigger.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.skipped, 2);
    assert!(ws.out("1.png").exists());
    assert!(!ws.out("2.png").exists());
}

#[tokio::test]
async fn progress_events_follow_the_files() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 8, 8);
    ws.write_bytes("b.png", b"broken");

    let mut events = Vec::new();
    BatchProcessor::new(ws.config(TransformOptions::default()))
        .run(|p| events.push(p))
        .await
        .unwrap();

    let kinds: Vec<_> = events.iter().map(|p| p.progress_type).collect();
    assert_eq!(
        kinds,
        vec![
            ProgressType::Start,
            ProgressType::Progress,
            ProgressType::Progress,
            ProgressType::Error,
            ProgressType::Complete,
        ]
    );
    assert_eq!(events[1].status, "Processing 1/2: a.png");
    assert_eq!(events[2].file_name.as_deref(), Some("b.png"));
    assert_eq!(events[4].progress_percentage, 100);
}

#[tokio::test]
async fn report_serializes_for_json_output() {
    let ws = Workspace::new();
    ws.write_rgb("a.png", ImageFormat::Png, 8, 8);

    let report = BatchProcessor::new(ws.config(TransformOptions::default()))
        .run(|_| {})
        .await
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["totalFiles"], 1);
    assert_eq!(value["succeeded"], 1);
    assert_eq!(value["outcomes"][0]["status"], "success");
    assert_eq!(value["outcomes"][0]["format"], "png");
}
