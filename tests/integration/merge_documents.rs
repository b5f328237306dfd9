//! End-to-end tests for document merging, through saved output files.

use lopdf::Document;
use pdfdusk::merge::DocumentMerger;
use tempfile::TempDir;

use crate::common::{page_boxes, write_solid_pages_pdf};

#[tokio::test]
async fn test_merge_two_documents_order_and_count() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    // Distinct page sizes tell us which input each page came from.
    write_solid_pages_pdf(&a, &[(1.0, 1.0, 1.0), (1.0, 1.0, 1.0)], 612, 792);
    write_solid_pages_pdf(&b, &[(0.0, 0.0, 0.0)], 500, 700);

    let merger = DocumentMerger::new();
    let outcome = merger.merge(&[a, b], 2, |_, _| {}).await.unwrap();

    assert_eq!(outcome.statistics.total_pages, 3);
    assert_eq!(
        page_boxes(&outcome.document),
        vec![(612.0, 792.0), (612.0, 792.0), (500.0, 700.0)]
    );
}

#[tokio::test]
async fn test_merged_output_survives_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.pdf");
    let b = dir.path().join("b.pdf");
    let output = dir.path().join("merged.pdf");
    write_solid_pages_pdf(&a, &[(1.0, 1.0, 1.0)], 612, 792);
    write_solid_pages_pdf(&b, &[(0.0, 0.0, 0.0)], 500, 700);

    let merger = DocumentMerger::new();
    let outcome = merger.merge(&[a, b], 2, |_, _| {}).await.unwrap();

    let writer = pdfdusk::io::PdfWriter::new();
    writer.save(&outcome.document, &output).await.unwrap();

    let reloaded = Document::load(&output).unwrap();
    assert_eq!(reloaded.get_pages().len(), 2);
    assert_eq!(page_boxes(&reloaded), vec![(612.0, 792.0), (500.0, 700.0)]);
}

#[tokio::test]
async fn test_merge_content_passes_through_unchanged() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.pdf");
    write_solid_pages_pdf(&a, &[(1.0, 1.0, 1.0)], 612, 792);

    // Merging a single document is a pass-through of its page sequence.
    let merger = DocumentMerger::new();
    let outcome = merger.merge(&[a.clone()], 1, |_, _| {}).await.unwrap();

    let original = Document::load(&a).unwrap();
    assert_eq!(
        page_boxes(&outcome.document),
        page_boxes(&original)
    );
}
