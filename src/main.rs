//! pdfdusk - Convert PDF files to a dark visual theme and merge documents.
//!
//! CLI front end: parses arguments, validates inputs, drives one batch job
//! on the core engine, and renders per-file outcomes.

use clap::Parser;
use std::process;
use std::sync::{Arc, Mutex};

use pdfdusk::batch::{self, CancelFlag, Phase, ProgressSink};
use pdfdusk::cli::Cli;
use pdfdusk::config::{Config, Operation, OverwriteMode};
use pdfdusk::error::PdfDuskError;
use pdfdusk::output::{OutputFormatter, ProgressBar, display_batch_result, display_validation_summary};
use pdfdusk::validation::{ValidationSummary, Validator};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err}");
        process::exit(err.exit_code());
    }
}

/// Main application logic.
async fn run(cli: Cli) -> Result<(), PdfDuskError> {
    cli.validate()?;

    // Expand globs and input lists into the final ordered input set.
    let all_inputs = cli.get_all_inputs().await?;

    let mut config = cli.to_config()?;
    config.inputs = all_inputs;
    config
        .validate()
        .map_err(|e| PdfDuskError::invalid_config(e.to_string()))?;

    let formatter = OutputFormatter::from_config(&config);

    if formatter.should_print() {
        formatter.section(&format!("{} v{}", pdfdusk::NAME, pdfdusk::VERSION));
        formatter.blank_line();
    }

    formatter.info("Validating input files...");
    let validator = Validator::new();
    let validation_summary = validator.validate_config(&config).await?;

    if formatter.should_print() {
        display_validation_summary(&formatter, &validation_summary);
        formatter.blank_line();
    }

    if config.dry_run {
        display_dry_run_plan(&config, &formatter, &validation_summary);
        return Ok(());
    }

    handle_output_overwrite(&config, &formatter).await?;

    // Wire Ctrl-C to cooperative cancellation, honored between pages and
    // files.
    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let progress = progress_sink(&config, cli.json);

    formatter.info(&format!("Running {} job...", config.operation.as_str()));

    let result = batch::run(&config, cancel, progress).await;

    if cli.json {
        let report = serde_json::to_string_pretty(&result)
            .map_err(|e| PdfDuskError::other(format!("Failed to serialize report: {e}")))?;
        println!("{report}");
    } else {
        formatter.blank_line();
        display_batch_result(&formatter, &result);
    }

    if result.exit_code != 0 {
        process::exit(result.exit_code);
    }

    Ok(())
}

/// Build the progress sink driving the terminal progress bar.
///
/// Returns `None` when nothing should be rendered (quiet mode or JSON
/// output, where the bar would corrupt the report stream).
fn progress_sink(config: &Config, json: bool) -> Option<ProgressSink> {
    if !config.should_print() || json {
        return None;
    }

    let bar = Arc::new(Mutex::new(ProgressBar::auto(config.inputs.len())));
    let sink: ProgressSink = Arc::new(move |update| {
        let Ok(mut bar) = bar.lock() else {
            return;
        };
        bar.set_message(match update.phase {
            Phase::Converting => "Converting",
            Phase::Merging => "Merging",
            Phase::Finalizing => "Finalizing",
        });
        bar.update(update.files_done);
    });

    Some(sink)
}

/// Describe what the job would do, without doing it.
fn display_dry_run_plan(
    config: &Config,
    formatter: &OutputFormatter,
    summary: &ValidationSummary,
) {
    formatter.section("Plan:");
    for result in &summary.results {
        match config.operation {
            Operation::Convert | Operation::ConvertAndMerge => {
                formatter.info(&format!(
                    "  {} ({} pages) -> {}",
                    result.path.display(),
                    result.page_count,
                    config.converted_output_path(&result.path).display()
                ));
            }
            Operation::Merge => {
                formatter.info(&format!(
                    "  {} ({} pages)",
                    result.path.display(),
                    result.page_count
                ));
            }
        }
    }

    if config.operation.produces_merged_output() {
        formatter.info(&format!(
            "  Merged output: {} ({} pages)",
            config.merged_output_path().display(),
            summary.total_pages
        ));
    }

    formatter.blank_line();
    formatter.success("Dry run completed successfully");
    formatter.info("  Run without --dry-run to process the files");
}

/// Handle overwrite scenarios for the merged output file.
async fn handle_output_overwrite(
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<(), PdfDuskError> {
    if !config.operation.produces_merged_output() {
        return Ok(());
    }

    let output = config.merged_output_path();
    if !output.exists() {
        return Ok(());
    }

    match config.overwrite_mode {
        OverwriteMode::Force => Ok(()),
        OverwriteMode::NoClobber => Err(PdfDuskError::output_exists(output)),
        OverwriteMode::Prompt => {
            if formatter.is_quiet() {
                // No interactive prompt in quiet mode.
                return Err(PdfDuskError::output_exists(output));
            }

            formatter.warning(&format!("Output file already exists: {}", output.display()));

            use std::io::{self, Write};
            print!("Overwrite? [y/N]: ");
            io::stdout().flush().ok();

            let mut response = String::new();
            io::stdin()
                .read_line(&mut response)
                .map_err(|err| PdfDuskError::other(format!("Failed to read input: {err}")))?;

            let response = response.trim().to_lowercase();
            if response == "y" || response == "yes" {
                Ok(())
            } else {
                Err(PdfDuskError::Cancelled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_test_config(operation: Operation) -> Config {
        Config {
            inputs: vec![PathBuf::from("test.pdf")],
            operation,
            overwrite_mode: OverwriteMode::Force,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_force() {
        let config = create_test_config(Operation::Merge);
        let formatter = OutputFormatter::quiet();

        let result = handle_output_overwrite(&config, &formatter).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_no_clobber() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("merged_document.pdf");
        std::fs::File::create(&existing).unwrap();

        let mut config = create_test_config(Operation::Merge);
        config.output_dir = temp_dir.path().to_path_buf();
        config.overwrite_mode = OverwriteMode::NoClobber;

        let formatter = OutputFormatter::quiet();
        let result = handle_output_overwrite(&config, &formatter).await;
        assert!(matches!(result, Err(PdfDuskError::OutputExists { .. })));
    }

    #[tokio::test]
    async fn test_handle_output_overwrite_ignored_for_convert() {
        let temp_dir = TempDir::new().unwrap();
        let existing = temp_dir.path().join("merged_document.pdf");
        std::fs::File::create(&existing).unwrap();

        let mut config = create_test_config(Operation::Convert);
        config.output_dir = temp_dir.path().to_path_buf();
        config.overwrite_mode = OverwriteMode::NoClobber;

        let formatter = OutputFormatter::quiet();
        let result = handle_output_overwrite(&config, &formatter).await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_progress_sink_disabled_when_quiet() {
        let mut config = create_test_config(Operation::Convert);
        config.quiet = true;

        assert!(progress_sink(&config, false).is_none());
        config.quiet = false;
        assert!(progress_sink(&config, true).is_none());
        assert!(progress_sink(&config, false).is_some());
    }
}
