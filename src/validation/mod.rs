//! Input validation for pdfdusk.
//!
//! Pre-flight validation of PDF inputs and output targets before a job
//! runs. It performs:
//! - File existence and accessibility checks
//! - PDF format validation and encryption detection
//! - Page count extraction
//! - Output path and overwrite-mode validation
//!
//! For the convert operation validation is always lenient: per-file
//! outcomes are independent there, so a bad input is reported but does not
//! block the job.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{PdfDuskError, Result};
use crate::io::{LoadedPdf, PdfReader};

/// Result of validating a single PDF file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// Path to the validated file.
    pub path: PathBuf,

    /// Number of pages in the PDF.
    pub page_count: usize,

    /// Size of the file in bytes.
    pub file_size: u64,

    /// Number of objects in the PDF.
    pub object_count: usize,

    /// First-page dimensions (width, height) in points, if available.
    pub page_dimensions: Option<(f32, f32)>,
}

impl ValidationResult {
    fn from_loaded(loaded: &LoadedPdf) -> Self {
        let doc = &loaded.document;

        let page_dimensions = doc.get_pages().into_values().next().and_then(|page_id| {
            let page_obj = doc.get_object(page_id).ok()?;
            let lopdf::Object::Dictionary(page_dict) = page_obj else {
                return None;
            };
            let lopdf::Object::Array(arr) = page_dict.get(b"MediaBox").ok()? else {
                return None;
            };
            if arr.len() >= 4 {
                let width = arr[2].as_float().ok()?;
                let height = arr[3].as_float().ok()?;
                Some((width, height))
            } else {
                None
            }
        });

        Self {
            path: loaded.path.clone(),
            page_count: loaded.page_count,
            file_size: loaded.file_size,
            object_count: doc.objects.len(),
            page_dimensions,
        }
    }
}

/// Summary of validation results for multiple files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Individual validation results for each file.
    pub results: Vec<ValidationResult>,

    /// Total number of pages across all files.
    pub total_pages: usize,

    /// Total file size in bytes.
    pub total_size: u64,

    /// Number of files that passed validation.
    pub files_validated: usize,

    /// Number of files that failed validation.
    pub files_failed: usize,
}

impl ValidationSummary {
    /// Create a summary from validation results.
    pub fn from_results(results: Vec<ValidationResult>) -> Self {
        let total_pages = results.iter().map(|r| r.page_count).sum();
        let total_size = results.iter().map(|r| r.file_size).sum();
        let files_validated = results.len();

        Self {
            results,
            total_pages,
            total_size,
            files_validated,
            files_failed: 0,
        }
    }

    /// Format the total file size as a human-readable string.
    pub fn format_total_size(&self) -> String {
        crate::utils::format_file_size(self.total_size)
    }
}

/// Validator for PDF files and job configuration.
pub struct Validator {
    reader: PdfReader,
}

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self {
            reader: PdfReader::new(),
        }
    }

    /// Validate a single PDF file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File does not exist or is not a regular file
    /// - File is empty or not a valid PDF
    /// - File is encrypted
    pub async fn validate_file(&self, path: &Path) -> Result<ValidationResult> {
        if !path.exists() {
            return Err(PdfDuskError::file_not_found(path.to_path_buf()));
        }

        if !path.is_file() {
            return Err(PdfDuskError::NotAFile {
                path: path.to_path_buf(),
            });
        }

        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|e| PdfDuskError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                })?;

        if metadata.len() == 0 {
            return Err(PdfDuskError::corrupted_pdf(
                path.to_path_buf(),
                "File is empty",
            ));
        }

        let loaded = self.reader.load(path).await?;

        Ok(ValidationResult::from_loaded(&loaded))
    }

    /// Validate multiple PDF files.
    ///
    /// With `continue_on_error`, failing files are skipped with a warning
    /// and counted in the summary; otherwise the first failure aborts.
    ///
    /// # Errors
    ///
    /// Returns an error if a file fails validation in strict mode, or if no
    /// file passes at all.
    pub async fn validate_files(
        &self,
        paths: &[PathBuf],
        continue_on_error: bool,
    ) -> Result<ValidationSummary> {
        let mut results = Vec::new();
        let mut failed_count = 0;

        for path in paths {
            match self.validate_file(path).await {
                Ok(result) => {
                    results.push(result);
                }
                Err(e) => {
                    if continue_on_error {
                        eprintln!("Warning: Skipping {}: {}", path.display(), e);
                        failed_count += 1;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        if results.is_empty() {
            return Err(PdfDuskError::NoFilesToMerge);
        }

        let mut summary = ValidationSummary::from_results(results);
        summary.files_failed = failed_count;

        Ok(summary)
    }

    /// Validate the output target for `config`.
    ///
    /// Checks the output directory exists and is writable, and applies the
    /// overwrite mode to an already existing merged output.
    ///
    /// # Errors
    ///
    /// Returns an error if the output directory is missing or read-only,
    /// or the merged output exists under `--no-clobber`.
    pub async fn validate_output(&self, config: &Config) -> Result<()> {
        let dir = &config.output_dir;
        if !dir.exists() {
            return Err(PdfDuskError::invalid_config(format!(
                "Output directory does not exist: {}",
                dir.display()
            )));
        }

        let metadata =
            tokio::fs::metadata(dir)
                .await
                .map_err(|e| PdfDuskError::FileNotAccessible {
                    path: dir.to_path_buf(),
                    source: e,
                })?;

        if metadata.permissions().readonly() {
            return Err(PdfDuskError::invalid_config(format!(
                "Output directory is not writable: {}",
                dir.display()
            )));
        }

        if config.operation.produces_merged_output() {
            let merged = config.merged_output_path();
            if merged.exists()
                && config.overwrite_mode == crate::config::OverwriteMode::NoClobber
            {
                return Err(PdfDuskError::output_exists(merged));
            }
        }

        Ok(())
    }

    /// Validate the complete configuration: all inputs plus the output
    /// target.
    ///
    /// The convert operation always validates leniently, matching its
    /// independent per-file semantics.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation check fails.
    pub async fn validate_config(&self, config: &Config) -> Result<ValidationSummary> {
        let lenient =
            config.continue_on_error || config.operation == crate::config::Operation::Convert;

        let summary = self.validate_files(&config.inputs, lenient).await?;

        self.validate_output(config).await?;

        Ok(summary)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
