//! End-to-end tests for the dark-mode conversion pipeline, through saved
//! output files.

use lopdf::Document;
use pdfdusk::batch::CancelFlag;
use pdfdusk::config::CompressionLevel;
use pdfdusk::convert::DocumentConverter;
use pdfdusk::io::PdfWriter;
use tempfile::TempDir;

use crate::common::{center_pixel, embedded_images, page_boxes, write_solid_pages_pdf};

#[tokio::test]
async fn test_white_and_black_pages_swap() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("two_tone.pdf");
    let output = dir.path().join("two_tone_dark.pdf");
    write_solid_pages_pdf(&input, &[(1.0, 1.0, 1.0), (0.0, 0.0, 0.0)], 612, 792);

    let converter = DocumentConverter::new(1.0);
    let doc = converter
        .convert(&input, &CancelFlag::new(), |_, _| {})
        .unwrap();

    let writer = PdfWriter::with_compression(CompressionLevel::Standard);
    writer.save(&doc, &output).await.unwrap();

    // Inspect the saved file, not the in-memory document.
    let saved = Document::load(&output).unwrap();
    assert_eq!(saved.get_pages().len(), 2);

    let images = embedded_images(&saved);
    assert_eq!(images.len(), 2);

    // Page 1 was solid white: converted page is solid black, and vice versa.
    assert_eq!(center_pixel(&images[0], 612, 792), [0, 0, 0]);
    assert_eq!(center_pixel(&images[1], 612, 792), [255, 255, 255]);
}

#[tokio::test]
async fn test_page_count_and_order_preserved() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("five.pdf");
    let output = dir.path().join("five_dark.pdf");
    write_solid_pages_pdf(
        &input,
        &[
            (1.0, 1.0, 1.0),
            (0.0, 0.0, 0.0),
            (1.0, 1.0, 1.0),
            (0.5, 0.5, 0.5),
            (0.0, 0.0, 0.0),
        ],
        60,
        80,
    );

    let converter = DocumentConverter::new(1.0);
    let doc = converter
        .convert(&input, &CancelFlag::new(), |_, _| {})
        .unwrap();

    let writer = PdfWriter::new();
    writer.save(&doc, &output).await.unwrap();

    let saved = Document::load(&output).unwrap();
    assert_eq!(saved.get_pages().len(), 5);

    // Order check: first page came from white, second from black.
    let images = embedded_images(&saved);
    assert_eq!(center_pixel(&images[0], 60, 80), [0, 0, 0]);
    assert_eq!(center_pixel(&images[1], 60, 80), [255, 255, 255]);
}

#[tokio::test]
async fn test_geometry_preserved_across_scales() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("page.pdf");
    write_solid_pages_pdf(&input, &[(1.0, 1.0, 1.0)], 612, 792);

    for scale in [1.0_f32, 2.0] {
        let converter = DocumentConverter::new(scale);
        let doc = converter
            .convert(&input, &CancelFlag::new(), |_, _| {})
            .unwrap();

        let boxes = page_boxes(&doc);
        assert_eq!(boxes.len(), 1);
        let (w, h) = boxes[0];
        assert!(
            (w - 612.0).abs() <= 1.5,
            "width {w} drifted at scale {scale}"
        );
        assert!(
            (h - 792.0).abs() <= 1.5,
            "height {h} drifted at scale {scale}"
        );
    }
}

#[tokio::test]
async fn test_uncompressed_output_keeps_raw_streams() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("page.pdf");
    let output = dir.path().join("page_dark.pdf");
    write_solid_pages_pdf(&input, &[(1.0, 1.0, 1.0)], 60, 80);

    let converter = DocumentConverter::new(1.0);
    let doc = converter
        .convert(&input, &CancelFlag::new(), |_, _| {})
        .unwrap();

    let writer = PdfWriter::with_compression(CompressionLevel::None);
    writer.save(&doc, &output).await.unwrap();

    let saved = Document::load(&output).unwrap();
    let images = embedded_images(&saved);
    assert_eq!(images.len(), 1);
    // Inverted white page: every sample is zero.
    assert!(images[0].iter().all(|&v| v == 0));
}
