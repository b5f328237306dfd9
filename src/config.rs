//! Configuration module for pdfdusk.
//!
//! This module transforms CLI arguments into a validated, normalized
//! configuration that drives conversion and merge jobs. It handles:
//! - Validation of argument combinations
//! - Resolution of conflicting options
//! - Application of defaults
//! - Deterministic output naming

use anyhow::{Result, bail};

use crate::PdfDuskError;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

/// Default render resolution multiplier for dark-mode conversion.
pub const DEFAULT_SCALE: f32 = 2.0;

/// The operation a batch job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    /// Convert each input to a dark-mode PDF, one output per input.
    #[default]
    Convert,
    /// Concatenate the inputs into one document, unmodified.
    Merge,
    /// Convert each input, then concatenate the converted documents.
    ConvertAndMerge,
}

impl Operation {
    /// Whether this operation produces a single merged output document.
    pub fn produces_merged_output(&self) -> bool {
        matches!(self, Self::Merge | Self::ConvertAndMerge)
    }

    /// Whether this operation runs the dark-mode conversion pipeline.
    pub fn converts(&self) -> bool {
        matches!(self, Self::Convert | Self::ConvertAndMerge)
    }

    /// String form as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Convert => "convert",
            Self::Merge => "merge",
            Self::ConvertAndMerge => "convert-and-merge",
        }
    }
}

impl FromStr for Operation {
    type Err = crate::PdfDuskError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "convert" => Ok(Self::Convert),
            "merge" => Ok(Self::Merge),
            "convert-and-merge" | "convert-merge" => Ok(Self::ConvertAndMerge),
            _ => Err(PdfDuskError::InvalidConfig {
                message: format!(
                    "Invalid operation: {s}. Must be one of: convert, merge, convert-and-merge"
                ),
            }),
        }
    }
}

/// Compression level for output PDFs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression - raw page image streams are preserved as-is.
    None,
    /// Balanced compression - good trade-off between size and processing time.
    #[default]
    Standard,
    /// Maximum compression - also prunes unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = crate::PdfDuskError;

    /// Parse compression level from string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string doesn't match a valid compression level.
    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PdfDuskError::InvalidConfig {
                message: format!(
                    "Invalid compression level: {s}. Must be one of: none, standard, maximum"
                ),
            }),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Complete configuration for a batch job.
///
/// This structure contains all settings needed to run one job, derived and
/// validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Input PDF file paths (in processing order).
    pub inputs: Vec<PathBuf>,

    /// The operation to perform.
    pub operation: Operation,

    /// Render resolution multiplier for conversion (must be positive).
    pub scale: f32,

    /// Directory where converted outputs are written.
    pub output_dir: PathBuf,

    /// Explicit path for the merged output document, if any.
    ///
    /// `None` means the default name inside `output_dir` is used.
    pub merged_output: Option<PathBuf>,

    /// Dry run mode - validate without creating output.
    pub dry_run: bool,

    /// Verbose output mode.
    pub verbose: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Compression level for output documents.
    pub compression: CompressionLevel,

    /// Continue past per-file errors instead of stopping.
    pub continue_on_error: bool,

    /// Number of parallel jobs (None = auto-detect).
    pub jobs: Option<usize>,
}

impl Config {
    /// Returns a reference to inputs.
    pub fn inputs(&self) -> &[PathBuf] {
        self.inputs.as_ref()
    }

    /// Validate the configuration.
    ///
    /// Checks for logical inconsistencies and invalid combinations.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No input files are specified
    /// - The render scale is zero, negative, or not finite
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The merged output path collides with an input
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            bail!("No input files specified");
        }

        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("Render scale must be a positive number, got {}", self.scale);
        }

        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if self.operation.produces_merged_output() {
            let merged = self.merged_output_path();
            for input in &self.inputs {
                if input == &merged {
                    bail!(
                        "Merged output cannot be the same as an input file: {}",
                        merged.display()
                    );
                }
            }
        }

        Ok(())
    }

    /// Output path for the dark-mode conversion of `input`.
    ///
    /// Deterministic: `<output_dir>/<stem>_dark.pdf`.
    pub fn converted_output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.output_dir.join(format!("{stem}_dark.pdf"))
    }

    /// Output path for the merged document.
    ///
    /// Falls back to a default name inside `output_dir` when no explicit
    /// path was configured.
    pub fn merged_output_path(&self) -> PathBuf {
        self.merged_output.clone().unwrap_or_else(|| {
            let name = match self.operation {
                Operation::ConvertAndMerge => "merged_dark_document.pdf",
                _ => "merged_document.pdf",
            };
            self.output_dir.join(name)
        })
    }

    /// Get the effective number of parallel jobs.
    ///
    /// Returns the configured job count, or the number of CPU cores if auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            operation: Operation::default(),
            scale: DEFAULT_SCALE,
            output_dir: PathBuf::from("."),
            merged_output: None,
            dry_run: false,
            verbose: false,
            quiet: false,
            overwrite_mode: OverwriteMode::default(),
            compression: CompressionLevel::default(),
            continue_on_error: false,
            jobs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base_config() -> Config {
        Config {
            inputs: vec![PathBuf::from("a.pdf")],
            ..Config::default()
        }
    }

    #[rstest]
    #[case("convert", Operation::Convert)]
    #[case("merge", Operation::Merge)]
    #[case("convert-and-merge", Operation::ConvertAndMerge)]
    #[case("convert-merge", Operation::ConvertAndMerge)]
    #[case("CONVERT", Operation::Convert)]
    fn test_operation_from_str(#[case] input: &str, #[case] expected: Operation) {
        assert_eq!(Operation::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_operation_from_str_invalid() {
        assert!(Operation::from_str("invert").is_err());
        assert!(Operation::from_str("").is_err());
    }

    #[test]
    fn test_operation_properties() {
        assert!(!Operation::Convert.produces_merged_output());
        assert!(Operation::Merge.produces_merged_output());
        assert!(Operation::ConvertAndMerge.produces_merged_output());

        assert!(Operation::Convert.converts());
        assert!(!Operation::Merge.converts());
        assert!(Operation::ConvertAndMerge.converts());

        assert_eq!(Operation::ConvertAndMerge.as_str(), "convert-and-merge");
    }

    #[rstest]
    #[case("none", CompressionLevel::None)]
    #[case("standard", CompressionLevel::Standard)]
    #[case("maximum", CompressionLevel::Maximum)]
    #[case("STANDARD", CompressionLevel::Standard)]
    fn test_compression_level_from_str(#[case] input: &str, #[case] expected: CompressionLevel) {
        assert_eq!(CompressionLevel::from_str(input).unwrap(), expected);
    }

    #[test]
    fn test_compression_level_invalid() {
        assert!(CompressionLevel::from_str("invalid").is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = base_config();
        assert!(config.validate().is_ok());

        // No inputs
        config.inputs.clear();
        assert!(config.validate().is_err());
        config.inputs = vec![PathBuf::from("a.pdf")];

        // Verbose + quiet conflict
        config.verbose = true;
        config.quiet = true;
        assert!(config.validate().is_err());
        config.verbose = false;
        config.quiet = false;

        // Zero jobs
        config.jobs = Some(0);
        assert!(config.validate().is_err());
        config.jobs = None;

        // Merged output colliding with an input
        config.operation = Operation::Merge;
        config.merged_output = Some(PathBuf::from("a.pdf"));
        assert!(config.validate().is_err());
    }

    #[rstest]
    #[case(0.0)]
    #[case(-1.0)]
    #[case(f32::NAN)]
    #[case(f32::INFINITY)]
    fn test_config_rejects_bad_scale(#[case] scale: f32) {
        let config = Config {
            scale,
            ..base_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_converted_output_path() {
        let config = Config {
            output_dir: PathBuf::from("/out"),
            ..base_config()
        };

        assert_eq!(
            config.converted_output_path(Path::new("/docs/report.pdf")),
            PathBuf::from("/out/report_dark.pdf")
        );
    }

    #[test]
    fn test_merged_output_path_defaults() {
        let mut config = Config {
            output_dir: PathBuf::from("/out"),
            operation: Operation::Merge,
            ..base_config()
        };
        assert_eq!(
            config.merged_output_path(),
            PathBuf::from("/out/merged_document.pdf")
        );

        config.operation = Operation::ConvertAndMerge;
        assert_eq!(
            config.merged_output_path(),
            PathBuf::from("/out/merged_dark_document.pdf")
        );

        config.merged_output = Some(PathBuf::from("/elsewhere/combined.pdf"));
        assert_eq!(
            config.merged_output_path(),
            PathBuf::from("/elsewhere/combined.pdf")
        );
    }

    #[test]
    fn test_effective_jobs() {
        let config = Config {
            jobs: Some(4),
            ..base_config()
        };
        assert_eq!(config.effective_jobs(), 4);

        let auto_config = Config {
            jobs: None,
            ..base_config()
        };
        assert!(auto_config.effective_jobs() >= 1);
    }

    #[test]
    fn test_should_print() {
        let mut config = base_config();
        assert!(config.should_print());

        config.quiet = true;
        assert!(!config.should_print());

        config.dry_run = true;
        assert!(config.should_print()); // Dry run always prints
    }
}
