//! PDF writing and saving operations.
//!
//! Persists finished output documents with:
//! - Atomic writes (write to temp file, then rename), so a crashed or
//!   cancelled job never leaves a partially written output behind
//! - Configurable compression applied at finalization
//! - Pre-flight output checks
//! - Write statistics

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{PdfDuskError, Result};

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,

    /// Compression level that was applied.
    pub compression: CompressionLevel,
}

impl WriteStatistics {
    /// Format file size as a human-readable string.
    pub fn format_file_size(&self) -> String {
        crate::utils::format_file_size(self.file_size)
    }
}

/// PDF writer with configurable behavior.
pub struct PdfWriter {
    compression: CompressionLevel,
    atomic: bool,
    buffer_size: usize,
}

impl PdfWriter {
    /// Create a writer with standard compression and atomic writes.
    pub fn new() -> Self {
        Self::with_compression(CompressionLevel::Standard)
    }

    /// Create a writer applying the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            compression,
            atomic: true,
            buffer_size: 64 * 1024,
        }
    }

    /// Create a writer without atomic writes (faster but less safe).
    pub fn non_atomic() -> Self {
        Self {
            atomic: false,
            ..Self::new()
        }
    }

    /// Save a PDF document to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be created or written
    /// (missing directory, permissions, disk full).
    pub async fn save(&self, doc: &Document, path: &Path) -> Result<()> {
        let _stats = self.save_with_stats(doc, path).await?;
        Ok(())
    }

    /// Save a PDF and return statistics about the operation.
    ///
    /// Finalization (compression, object renumbering, serialization) runs
    /// on a blocking thread. With atomic writes the document lands under a
    /// temporary name and is renamed into place only once fully flushed.
    pub async fn save_with_stats(&self, doc: &Document, path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let compression = self.compression;
        let atomic = self.atomic;
        let buffer_size = self.buffer_size;

        let mut doc_clone = doc.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            match compression {
                CompressionLevel::None => {}
                CompressionLevel::Standard => {
                    doc_clone.compress();
                }
                CompressionLevel::Maximum => {
                    doc_clone.compress();
                    doc_clone.prune_objects();
                }
            }
            doc_clone.renumber_objects();

            let write_path = if atomic {
                path_buf.with_extension("pdf.tmp")
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                PdfDuskError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(buffer_size, file);

            doc_clone
                .save_to(&mut writer)
                .map_err(|e| PdfDuskError::FailedToWrite {
                    path: write_path.clone(),
                    source: std::io::Error::other(e),
                })?;

            writer.flush().map_err(|e| PdfDuskError::FailedToWrite {
                path: write_path.clone(),
                source: e,
            })?;

            if atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    PdfDuskError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            let write_time = start.elapsed();
            let file_size = std::fs::metadata(&path_buf).map(|m| m.len()).unwrap_or(0);

            Ok::<_, PdfDuskError>(WriteStatistics {
                write_time,
                file_size,
                output_path: path_buf,
                compression,
            })
        })
        .await
        .map_err(|e| PdfDuskError::other(format!("Write task failed: {e}")))??;

        Ok(stats)
    }

    /// Pre-flight check that `path` can be written.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory doesn't exist or is
    /// read-only.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            if !parent.exists() {
                return Err(PdfDuskError::invalid_config(format!(
                    "Output directory does not exist: {}",
                    parent.display()
                )));
            }

            let metadata =
                tokio::fs::metadata(parent)
                    .await
                    .map_err(|e| PdfDuskError::FileNotAccessible {
                        path: parent.to_path_buf(),
                        source: e,
                    })?;

            if metadata.permissions().readonly() {
                return Err(PdfDuskError::invalid_config(format!(
                    "Output directory is not writable: {}",
                    parent.display()
                )));
            }
        }

        Ok(())
    }

    /// Check whether `path` exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    /// Remove an output file if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn remove_if_exists(&self, path: &Path) -> Result<()> {
        if self.exists(path).await {
            tokio::fs::remove_file(path)
                .await
                .map_err(|e| PdfDuskError::FailedToWrite {
                    path: path.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Object, dictionary};
    use tempfile::TempDir;

    fn create_test_document() -> Document {
        let mut doc = Document::with_version("1.5");

        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        doc
    }

    #[tokio::test]
    async fn test_save_pdf() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let doc = create_test_document();
        let writer = PdfWriter::new();

        writer.save(&doc, &output_path).await.unwrap();
        assert!(output_path.exists());

        // Atomic write leaves no temp file behind.
        assert!(!output_path.with_extension("pdf.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_with_stats() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let doc = create_test_document();
        let writer = PdfWriter::new();

        let stats = writer.save_with_stats(&doc, &output_path).await.unwrap();

        assert!(stats.file_size > 0);
        assert_eq!(stats.output_path, output_path);
        assert_eq!(stats.compression, CompressionLevel::Standard);
    }

    #[tokio::test]
    async fn test_non_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let doc = create_test_document();
        let writer = PdfWriter::non_atomic();

        writer.save(&doc, &output_path).await.unwrap();
        assert!(output_path.exists());
    }

    #[tokio::test]
    async fn test_save_written_pdf_reloads() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let doc = create_test_document();
        let writer = PdfWriter::with_compression(CompressionLevel::Maximum);
        writer.save(&doc, &output_path).await.unwrap();

        let reloaded = Document::load(&output_path).unwrap();
        assert_eq!(reloaded.get_pages().len(), 1);
    }

    #[tokio::test]
    async fn test_can_write() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("output.pdf");

        let writer = PdfWriter::new();
        assert!(writer.can_write(&output_path).await.is_ok());
    }

    #[tokio::test]
    async fn test_can_write_nonexistent_directory() {
        let writer = PdfWriter::new();
        let result = writer.can_write(Path::new("/nonexistent/output.pdf")).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_remove_if_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("file.pdf");
        std::fs::File::create(&file_path).unwrap();

        let writer = PdfWriter::new();

        assert!(file_path.exists());
        writer.remove_if_exists(&file_path).await.unwrap();
        assert!(!file_path.exists());

        // No error on a file that is already gone.
        assert!(writer.remove_if_exists(&file_path).await.is_ok());
    }
}
