//! Output formatting and display.
//!
//! All user-facing output: formatted status messages, progress indicators,
//! and summary reports, with quiet and verbose modes.

pub mod formatter;
pub mod progress;

pub use formatter::{MessageLevel, OutputFormatter};
pub use progress::{ProgressBar, ProgressStyle};

use crate::batch::BatchResult;
use crate::validation::ValidationSummary;

/// Display a validation summary to the user.
pub fn display_validation_summary(formatter: &OutputFormatter, summary: &ValidationSummary) {
    if summary.files_failed > 0 {
        formatter.warning(&format!(
            "Warning: {} file(s) failed validation",
            summary.files_failed
        ));
    }

    formatter.info(&format!(
        "Validated {} file(s): {} pages, {}",
        summary.files_validated,
        summary.total_pages,
        summary.format_total_size()
    ));
}

/// Display per-file outcomes and the overall result of a batch job.
pub fn display_batch_result(formatter: &OutputFormatter, result: &BatchResult) {
    for file in &result.files {
        match (&file.output, &file.error) {
            (Some(output), None) => {
                formatter.success(&format!(
                    "{} -> {}",
                    file.input.display(),
                    output.display()
                ));
            }
            (None, None) => {
                formatter.success(&file.input.display().to_string());
            }
            (_, Some(error)) => {
                formatter.error(&format!("{}: {}", file.input.display(), error));
            }
        }
    }

    if let Some(ref merged) = result.merged_output {
        formatter.success(&format!("Created {}", merged.display()));
    }

    if let Some(ref error) = result.error {
        formatter.error(error);
    }
}
