//! End-to-end tests for batch orchestration: the three operations, their
//! failure semantics, and temporary-artifact hygiene.

use lopdf::Document;
use pdfdusk::batch::{self, BatchStatus, CancelFlag};
use pdfdusk::config::{CompressionLevel, Config, Operation};
use std::path::Path;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::common::{center_pixel, embedded_images, write_corrupt_pdf, write_solid_pages_pdf};

fn job_config(inputs: Vec<PathBuf>, output_dir: &Path, operation: Operation) -> Config {
    Config {
        inputs,
        operation,
        scale: 1.0,
        output_dir: output_dir.to_path_buf(),
        compression: CompressionLevel::Standard,
        quiet: true,
        jobs: Some(2),
        ..Config::default()
    }
}

fn staging_dirs_left(output_dir: &Path) -> usize {
    std::fs::read_dir(output_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".pdfdusk-"))
        .count()
}

#[tokio::test]
async fn test_convert_and_merge_end_to_end() {
    let dir = TempDir::new().unwrap();
    let white = dir.path().join("white.pdf");
    let black = dir.path().join("black.pdf");
    write_solid_pages_pdf(&white, &[(1.0, 1.0, 1.0)], 60, 80);
    write_solid_pages_pdf(&black, &[(0.0, 0.0, 0.0)], 60, 80);

    let out_dir = TempDir::new().unwrap();
    let config = job_config(
        vec![white, black],
        out_dir.path(),
        Operation::ConvertAndMerge,
    );

    let result = batch::run(&config, CancelFlag::new(), None).await;

    assert!(result.succeeded());
    let merged_path = result.merged_output.unwrap();
    let merged = Document::load(&merged_path).unwrap();
    assert_eq!(merged.get_pages().len(), 2);

    // Converted content made it into the merged document, in input order.
    let images = embedded_images(&merged);
    assert_eq!(center_pixel(&images[0], 60, 80), [0, 0, 0]);
    assert_eq!(center_pixel(&images[1], 60, 80), [255, 255, 255]);

    // No temporary artifacts survive the job.
    assert_eq!(staging_dirs_left(out_dir.path()), 0);
}

#[tokio::test]
async fn test_convert_and_merge_fail_fast() {
    let dir = TempDir::new().unwrap();
    let one = dir.path().join("one.pdf");
    let two = dir.path().join("two.pdf");
    let three = dir.path().join("three.pdf");
    write_solid_pages_pdf(&one, &[(1.0, 1.0, 1.0)], 60, 80);
    write_corrupt_pdf(&two);
    write_solid_pages_pdf(&three, &[(1.0, 1.0, 1.0)], 60, 80);

    let out_dir = TempDir::new().unwrap();
    let config = job_config(
        vec![one, two, three],
        out_dir.path(),
        Operation::ConvertAndMerge,
    );

    let result = batch::run(&config, CancelFlag::new(), None).await;

    // The second input fails conversion: overall Failed, no merged output,
    // zero temporary artifacts on disk afterwards.
    assert_eq!(result.status, BatchStatus::Failed);
    assert!(result.merged_output.is_none());
    assert!(!config.merged_output_path().exists());
    assert_eq!(staging_dirs_left(out_dir.path()), 0);

    assert!(result.files[0].is_success());
    assert!(!result.files[1].is_success());
    assert!(result.files[2].is_success());
}

#[tokio::test]
async fn test_convert_records_independent_outcomes() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    let bad = dir.path().join("bad.pdf");
    let also_good = dir.path().join("also_good.pdf");
    write_solid_pages_pdf(&good, &[(1.0, 1.0, 1.0)], 60, 80);
    write_corrupt_pdf(&bad);
    write_solid_pages_pdf(&also_good, &[(0.0, 0.0, 0.0)], 60, 80);

    let out_dir = TempDir::new().unwrap();
    let config = job_config(
        vec![good, bad, also_good],
        out_dir.path(),
        Operation::Convert,
    );

    let result = batch::run(&config, CancelFlag::new(), None).await;

    assert_eq!(result.status, BatchStatus::Failed);
    assert_eq!(result.files.len(), 3);
    assert!(result.files[0].is_success());
    assert!(!result.files[1].is_success());
    // The failure did not stop the remaining file.
    assert!(result.files[2].is_success());
    assert!(out_dir.path().join("good_dark.pdf").exists());
    assert!(out_dir.path().join("also_good_dark.pdf").exists());
}

#[tokio::test]
async fn test_merge_job_reports_unreadable_input() {
    let dir = TempDir::new().unwrap();
    let good = dir.path().join("good.pdf");
    let bad = dir.path().join("bad.pdf");
    write_solid_pages_pdf(&good, &[(1.0, 1.0, 1.0)], 60, 80);
    write_corrupt_pdf(&bad);

    let out_dir = TempDir::new().unwrap();
    let config = job_config(vec![good, bad], out_dir.path(), Operation::Merge);

    let result = batch::run(&config, CancelFlag::new(), None).await;

    assert_eq!(result.status, BatchStatus::Failed);
    let error = result.error.unwrap();
    assert!(error.contains("#2"), "error should name the input: {error}");
    assert!(error.contains("bad.pdf"), "error should name the file: {error}");
    assert!(!config.merged_output_path().exists());
}

#[tokio::test]
async fn test_batch_result_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.pdf");
    write_solid_pages_pdf(&a, &[(1.0, 1.0, 1.0)], 60, 80);

    let out_dir = TempDir::new().unwrap();
    let config = job_config(vec![a], out_dir.path(), Operation::Convert);

    let result = batch::run(&config, CancelFlag::new(), None).await;
    assert!(result.succeeded());

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"status\":\"done\""));
    assert!(json.contains("a_dark.pdf"));
}
