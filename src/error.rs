//! Error types for pdfdusk.
//!
//! All fallible operations in the crate return [`PdfDuskError`]. Errors are
//! designed to be informative and actionable: they carry the file path, the
//! page index, or the input position they relate to, so the batch layer can
//! report exactly what failed without losing context.
//!
//! # Error Categories
//!
//! - **I/O Errors**: file not found, permission denied, disk full
//! - **PDF Errors**: invalid structure, corrupted or encrypted files
//! - **Render Errors**: a page could not be rasterized
//! - **Rebuild Errors**: a raster could not be embedded into the output
//! - **Merge Errors**: empty input list, unreadable input

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfdusk operations.
pub type Result<T> = std::result::Result<T, PdfDuskError>;

/// Main error type for pdfdusk operations.
#[derive(Debug, thiserror::Error)]
pub enum PdfDuskError {
    /// Input file was not found.
    #[error("File not found: {}", path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but is not accessible (permission denied, etc.).
    #[error("Cannot access file: {}\n  Reason: {}", path.display(), source)]
    FileNotAccessible {
        /// Path to the inaccessible file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Path points at a directory or other non-file.
    #[error("Not a file: {}", path.display())]
    NotAFile {
        /// Path that is not a regular file.
        path: PathBuf,
    },

    /// Failed to parse a PDF file.
    #[error("Failed to load PDF: {}\n  Reason: {}", path.display(), reason)]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// PDF file is structurally invalid.
    #[error("Corrupted or invalid PDF: {}\n  Details: {}", path.display(), details)]
    CorruptedPdf {
        /// Path to the corrupted PDF.
        path: PathBuf,
        /// Details about the corruption.
        details: String,
    },

    /// PDF file is encrypted and cannot be rendered.
    #[error(
        "PDF is encrypted and cannot be processed: {}\n  \
         Hint: Decrypt the PDF first using 'qpdf --decrypt' or similar tools",
        path.display()
    )]
    EncryptedPdf {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// A page could not be rasterized.
    #[error(
        "Failed to render page {} of {}\n  Reason: {}",
        page_index,
        path.display(),
        reason
    )]
    PageRenderFailed {
        /// Path to the source PDF.
        path: PathBuf,
        /// Zero-based index of the failing page.
        page_index: usize,
        /// Reason for the failure.
        reason: String,
    },

    /// A raster image could not be embedded into the output document.
    #[error("Failed to embed page image {page_index}: {details}")]
    ImageEmbedFailed {
        /// Zero-based index of the page being rebuilt.
        page_index: usize,
        /// Details about the failure.
        details: String,
    },

    /// Dark-mode conversion of a document failed on a specific page.
    ///
    /// Wraps the underlying render or embed error with page context. A
    /// conversion never produces partial output: the first page failure
    /// discards the whole document.
    #[error(
        "Conversion of {} failed at page {}",
        path.display(),
        page_index
    )]
    ConversionFailed {
        /// Path to the source PDF.
        path: PathBuf,
        /// Zero-based index of the failing page.
        page_index: usize,
        /// The page-level error that caused the abort.
        source: Box<PdfDuskError>,
    },

    /// No input files were provided for merging.
    #[error("No input files specified for merging")]
    NoFilesToMerge,

    /// An input to a merge operation could not be opened or read.
    ///
    /// `index` is the zero-based position of the input in the job's ordered
    /// input list, stable regardless of load concurrency.
    #[error(
        "Cannot read merge input #{} ({}): {}",
        index + 1,
        path.display(),
        source
    )]
    UnreadableInput {
        /// Zero-based position in the input list.
        index: usize,
        /// Path to the unreadable input.
        path: PathBuf,
        /// The load error.
        source: Box<PdfDuskError>,
    },

    /// Merge bookkeeping failed (page tree manipulation and the like).
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  \
         Use --force to overwrite or choose a different output path",
        path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to create an output file.
    #[error("Failed to create output file: {}\n  Reason: {}", path.display(), source)]
    FailedToCreateOutput {
        /// Path where output should be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write to an output file.
    #[error("Failed to write to output file: {}\n  Reason: {}", path.display(), source)]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to read an input list file.
    #[error("Failed to read input list file: {}\n  Reason: {}", path.display(), source)]
    FailedToReadInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Input list file contains an invalid entry.
    #[error(
        "Invalid entry in input list file: {} at line {}\n  Details: {}",
        path.display(),
        line_number,
        details
    )]
    InvalidInputList {
        /// Path to the input list file.
        path: PathBuf,
        /// Line number with the error.
        line_number: usize,
        /// Details about what's invalid.
        details: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The operation was cancelled.
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error.
        #[from]
        source: io::Error,
    },

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PdfDuskError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PdfDuskError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl PdfDuskError {
    /// Create a `FileNotFound` error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a `NotAFile` error.
    pub fn not_a_file(path: PathBuf) -> Self {
        Self::NotAFile { path }
    }

    /// Create a `FailedToLoadPdf` error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a `CorruptedPdf` error.
    pub fn corrupted_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::CorruptedPdf {
            path,
            details: details.into(),
        }
    }

    /// Create an `EncryptedPdf` error.
    pub fn encrypted_pdf(path: PathBuf) -> Self {
        Self::EncryptedPdf { path }
    }

    /// Create a `PageRenderFailed` error.
    pub fn render_failed(path: PathBuf, page_index: usize, reason: impl Into<String>) -> Self {
        Self::PageRenderFailed {
            path,
            page_index,
            reason: reason.into(),
        }
    }

    /// Create an `ImageEmbedFailed` error.
    pub fn embed_failed(page_index: usize, details: impl Into<String>) -> Self {
        Self::ImageEmbedFailed {
            page_index,
            details: details.into(),
        }
    }

    /// Wrap a page-level error with document conversion context.
    pub fn conversion_failed(path: PathBuf, page_index: usize, cause: PdfDuskError) -> Self {
        Self::ConversionFailed {
            path,
            page_index,
            source: Box::new(cause),
        }
    }

    /// Create an `UnreadableInput` error for a merge input.
    pub fn unreadable_input(index: usize, path: PathBuf, cause: PdfDuskError) -> Self {
        Self::UnreadableInput {
            index,
            path,
            source: Box::new(cause),
        }
    }

    /// Create a `MergeFailed` error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an `OutputExists` error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an `InvalidConfig` error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an `Other` error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Render this error together with its cause chain.
    ///
    /// Wrapper variants like `ConversionFailed` keep their cause in
    /// `source()`; per-file reports want the whole story on one line.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut message = self.to_string();
        let mut cause = self.source();
        while let Some(err) = cause {
            message.push_str(&format!("\n  Caused by: {err}"));
            cause = err.source();
        }
        message
    }

    /// Check if this error is recoverable at the batch level.
    ///
    /// Returns true for per-file errors that are acceptable in
    /// continue-on-error mode or under the convert operation's independent
    /// per-file semantics.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::FailedToLoadPdf { .. }
                | Self::CorruptedPdf { .. }
                | Self::EncryptedPdf { .. }
                | Self::PageRenderFailed { .. }
                | Self::ImageEmbedFailed { .. }
                | Self::ConversionFailed { .. }
        )
    }

    /// Check if this error should stop all processing immediately.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToMerge
                | Self::FailedToCreateOutput { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::FileNotAccessible { .. } => 2,
            Self::NotAFile { .. } => 2,
            Self::FailedToReadInputList { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::CorruptedPdf { .. } => 3,
            Self::EncryptedPdf { .. } => 3,
            Self::OutputExists { .. } => 4,
            Self::FailedToCreateOutput { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::Io { .. } => 5,
            Self::PageRenderFailed { .. } => 6,
            Self::ImageEmbedFailed { .. } => 6,
            Self::ConversionFailed { .. } => 6,
            Self::UnreadableInput { .. } => 6,
            Self::MergeFailed { .. } => 6,
            Self::NoFilesToMerge => 1,
            Self::InvalidInputList { .. } => 1,
            Self::InvalidConfig { .. } => 1,
            Self::Other { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
        }
    }
}
