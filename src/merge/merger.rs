//! Core PDF merging implementation.
//!
//! Concatenates the pages of N input documents into a single output
//! document, preserving input order and per-page geometry. Pages are never
//! re-rendered: already-built content passes through untouched, which is
//! what makes merging associative in effect.

use lopdf::{Document, Object, ObjectId};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::error::{PdfDuskError, Result};
use crate::io::{LoadedPdf, PdfReader};

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Total time taken for the merge.
    pub merge_time: Duration,

    /// Time taken to load all inputs.
    pub load_time: Duration,

    /// Total size of input files.
    pub input_size: u64,
}

impl MergeStatistics {
    /// Format input size as a human-readable string.
    pub fn format_input_size(&self) -> String {
        crate::utils::format_file_size(self.input_size)
    }
}

/// Result of a merge operation.
#[derive(Debug)]
pub struct MergeOutcome {
    /// The merged PDF document, not yet persisted.
    pub document: Document,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Paths of the files that were merged, in order.
    pub merged_files: Vec<PathBuf>,
}

/// PDF merger that combines multiple documents.
pub struct DocumentMerger {
    reader: PdfReader,
}

impl DocumentMerger {
    /// Create a new merger.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
        }
    }

    /// Merge the documents at `inputs`, in order, into one document.
    ///
    /// `on_file` is called with `(files_loaded, total_files)` as inputs
    /// finish loading. `workers` bounds load concurrency.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `inputs` is empty
    /// - Any input cannot be opened or read (`UnreadableInput` with the
    ///   zero-based input position); the whole merge aborts and nothing is
    ///   produced
    /// - Page-tree bookkeeping fails
    pub async fn merge<F>(
        &self,
        inputs: &[PathBuf],
        workers: usize,
        mut on_file: F,
    ) -> Result<MergeOutcome>
    where
        F: FnMut(usize, usize),
    {
        if inputs.is_empty() {
            return Err(PdfDuskError::NoFilesToMerge);
        }

        let merge_start = Instant::now();

        let load_start = Instant::now();
        let total = inputs.len();
        let results = self
            .reader
            .load_with_progress(inputs, workers, |idx, _| on_file(idx + 1, total))
            .await;
        let load_time = load_start.elapsed();

        // First unreadable input aborts the whole merge.
        let mut loaded_pdfs = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(loaded) => loaded_pdfs.push(loaded),
                Err(e) => {
                    return Err(PdfDuskError::unreadable_input(
                        index,
                        inputs[index].clone(),
                        e,
                    ));
                }
            }
        }

        let document = merge_documents(&loaded_pdfs)?;

        let statistics = MergeStatistics {
            files_merged: loaded_pdfs.len(),
            total_pages: document.get_pages().len(),
            merge_time: merge_start.elapsed(),
            load_time,
            input_size: loaded_pdfs.iter().map(|p| p.file_size).sum(),
        };

        let merged_files: Vec<PathBuf> = loaded_pdfs.into_iter().map(|p| p.path).collect();

        Ok(MergeOutcome {
            document,
            statistics,
            merged_files,
        })
    }
}

impl Default for DocumentMerger {
    fn default() -> Self {
        Self::new()
    }
}

/// Concatenate loaded documents into one.
fn merge_documents(loaded_pdfs: &[LoadedPdf]) -> Result<Document> {
    if loaded_pdfs.is_empty() {
        return Err(PdfDuskError::NoFilesToMerge);
    }

    // The first document is the base; the rest are grafted onto its tree.
    let mut merged = loaded_pdfs[0].document.clone();
    let mut max_id = merged.max_id;

    for loaded in &loaded_pdfs[1..] {
        let mut doc = loaded.document.clone();

        // Renumber objects to avoid ID conflicts.
        doc.renumber_objects_with(max_id + 1);
        max_id = doc.max_id;

        let doc_pages: Vec<ObjectId> = doc.get_pages().into_values().collect();

        merged.objects.extend(doc.objects);

        add_pages_to_tree(&mut merged, &doc_pages)?;
    }

    merged.renumber_objects();

    Ok(merged)
}

/// Append page references to the merged document's page tree.
fn add_pages_to_tree(merged: &mut Document, page_ids: &[ObjectId]) -> Result<()> {
    let catalog = merged
        .catalog_mut()
        .map_err(|e| PdfDuskError::merge_failed(format!("Failed to get catalog: {e}")))?;

    let pages_id = catalog
        .get(b"Pages")
        .and_then(|p| p.as_reference())
        .map_err(|e| PdfDuskError::merge_failed(format!("Failed to get pages reference: {e}")))?;

    let pages_dict = merged
        .get_object_mut(pages_id)
        .map_err(|e| PdfDuskError::merge_failed(format!("Failed to get pages object: {e}")))?;

    if let Object::Dictionary(dict) = pages_dict {
        let kids = dict
            .get_mut(b"Kids")
            .map_err(|_| PdfDuskError::merge_failed("Pages dictionary missing Kids array"))?;

        if let Object::Array(kids_array) = kids {
            for &page_id in page_ids {
                kids_array.push(Object::Reference(page_id));
            }
        } else {
            return Err(PdfDuskError::merge_failed("Kids is not an array"));
        }

        let current_count = dict.get(b"Count").and_then(|c| c.as_i64()).unwrap_or(0);
        dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));
    } else {
        return Err(PdfDuskError::merge_failed("Pages object is not a dictionary"));
    }

    Ok(())
}
