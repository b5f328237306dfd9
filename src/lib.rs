//! pdfdusk - Convert PDF files to a dark visual theme and merge documents.
//!
//! This library renders each page of a source PDF, inverts its colors
//! (every channel value `v` becomes `255 - v`), and rebuilds the document
//! from the inverted page images, preserving page geometry. It also
//! concatenates documents, with or without converting them first, and
//! orchestrates batches of either operation with per-file outcome
//! reporting, progress callbacks, and cooperative cancellation.
//!
//! Output pages are image-based reconstructions: searchable text, fonts,
//! and hyperlinks are not preserved.
//!
//! # Examples
//!
//! ## Converting and merging a batch
//!
//! ```no_run
//! use pdfdusk::batch::{self, CancelFlag};
//! use pdfdusk::config::{Config, Operation};
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let config = Config {
//!     inputs: vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")],
//!     operation: Operation::ConvertAndMerge,
//!     output_dir: PathBuf::from("out"),
//!     ..Config::default()
//! };
//!
//! let result = batch::run(&config, CancelFlag::new(), None).await;
//! if result.succeeded() {
//!     println!("Created {}", result.merged_output.unwrap().display());
//! }
//! # }
//! ```
//!
//! ## Using individual components
//!
//! ```no_run
//! use pdfdusk::batch::CancelFlag;
//! use pdfdusk::convert::DocumentConverter;
//! use pdfdusk::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let converter = DocumentConverter::new(2.0);
//! let dark = converter.convert(Path::new("input.pdf"), &CancelFlag::new(), |page, total| {
//!     println!("page {page}/{total}");
//! })?;
//!
//! let writer = PdfWriter::new();
//! writer.save(&dark, Path::new("input_dark.pdf")).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod invert;
pub mod io;
pub mod merge;
pub mod output;
pub mod rebuild;
pub mod render;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PdfDuskError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
