//! CLI argument parsing for pdfdusk.
//!
//! Defines the command-line interface structure using `clap` and the
//! translation into a validated [`Config`].

use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::{CompressionLevel, Config, Operation, OverwriteMode};
use crate::error::{PdfDuskError, Result};

/// Convert PDF files to a dark visual theme and merge documents.
///
/// pdfdusk renders each page, inverts its colors, and rebuilds the
/// document from the inverted page images. It can also concatenate
/// documents, with or without converting them first.
#[derive(Parser, Debug)]
#[command(name = "pdfdusk")]
#[command(version)]
#[command(about = "Convert PDF files to a dark theme and merge documents", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Input PDF files (in order)
    ///
    /// Specify multiple files or use glob patterns.
    /// Files are processed in the order provided.
    ///
    /// Examples:
    ///   pdfdusk notes.pdf
    ///   pdfdusk chapter*.pdf --mode convert-and-merge -o book_dark.pdf
    #[arg(required = true, value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Operation to perform
    ///
    /// - convert: one dark-mode PDF per input (default)
    /// - merge: concatenate inputs unchanged
    /// - convert-and-merge: convert every input, then concatenate
    #[arg(short, long, value_name = "MODE", default_value = "convert")]
    #[arg(value_parser = ["convert", "merge", "convert-and-merge"])]
    pub mode: String,

    /// Render resolution multiplier for conversion
    ///
    /// Higher values increase output fidelity and file size; cost grows
    /// quadratically with the factor.
    #[arg(short, long, value_name = "FACTOR", default_value_t = crate::config::DEFAULT_SCALE)]
    pub scale: f32,

    /// Directory for output files
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Output path for the merged document
    ///
    /// Only meaningful for merge and convert-and-merge; a default name
    /// inside the output directory is used when omitted.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dry run - validate inputs and preview the job without writing output
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Verbose output - show detailed information about each PDF
    #[arg(short, long)]
    pub verbose: bool,

    /// Force overwrite of existing output files without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite an existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Compression level for output PDFs
    ///
    /// - none: raw page images (large but lossless streams)
    /// - standard: deflate-compressed streams (default)
    /// - maximum: also prunes unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Continue processing even if some files fail
    ///
    /// Only affects validation of merge-type jobs; the convert operation
    /// always records per-file outcomes independently.
    #[arg(long)]
    pub continue_on_error: bool,

    /// Read input file list from a file (one path per line)
    ///
    /// Lines starting with '#' are comments. Paths from the file are
    /// appended after direct inputs.
    #[arg(long, value_name = "FILE")]
    pub input_list: Option<PathBuf>,

    /// Number of parallel jobs
    ///
    /// Bounds how many files are converted or loaded concurrently.
    /// Default is the number of CPU cores.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Print the batch result as JSON on completion
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the mode, compression level, or scale is
    /// invalid, or configuration validation fails.
    pub fn to_config(&self) -> Result<Config> {
        let operation = Operation::from_str(&self.mode)?;
        let compression = CompressionLevel::from_str(&self.compression)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            inputs: self.inputs.iter().map(PathBuf::from).collect(),
            operation,
            scale: self.scale,
            output_dir: self.output_dir.clone(),
            merged_output: self.output.clone(),
            dry_run: self.dry_run,
            verbose: self.verbose,
            quiet: self.quiet,
            overwrite_mode,
            compression,
            continue_on_error: self.continue_on_error,
            jobs: self.jobs,
        };

        config.validate().map_err(|e| {
            PdfDuskError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before any file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any early validation check fails.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(PdfDuskError::invalid_config("No input files specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PdfDuskError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(PdfDuskError::invalid_config(format!(
                "Render scale must be a positive number, got {}",
                self.scale
            )));
        }

        Operation::from_str(&self.mode)?;
        CompressionLevel::from_str(&self.compression)?;

        Ok(())
    }

    /// Get all input paths: direct arguments (glob-expanded, in order)
    /// plus entries from the input-list file.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob pattern is malformed, the input list
    /// cannot be read, or no inputs remain.
    pub async fn get_all_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut all_inputs = crate::utils::collect_paths_for_patterns(&self.inputs)?;

        if let Some(ref input_list_path) = self.input_list {
            let additional_inputs = self.read_input_list(input_list_path).await?;
            all_inputs.extend(additional_inputs);
        }

        if all_inputs.is_empty() {
            return Err(PdfDuskError::NoFilesToMerge);
        }

        Ok(all_inputs)
    }

    /// Read input paths from a file, one per line.
    ///
    /// Lines starting with '#' are comments; empty lines are skipped.
    async fn read_input_list(&self, path: &PathBuf) -> Result<Vec<PathBuf>> {
        use tokio::fs::File;
        use tokio::io::{AsyncBufReadExt, BufReader};

        let file = File::open(path)
            .await
            .map_err(|e| PdfDuskError::FailedToReadInputList {
                path: path.clone(),
                source: e,
            })?;

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut paths = Vec::new();
        let mut line_number = 0;

        while let Some(line) =
            lines
                .next_line()
                .await
                .map_err(|e| PdfDuskError::FailedToReadInputList {
                    path: path.clone(),
                    source: e,
                })?
        {
            line_number += 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let input_path = PathBuf::from(line);
            if input_path.as_os_str().is_empty() {
                return Err(PdfDuskError::InvalidInputList {
                    path: path.clone(),
                    line_number,
                    details: "Empty path".to_string(),
                });
            }

            paths.push(input_path);
        }

        Ok(paths)
    }
}
