//! Batch orchestration.
//!
//! Runs one job (convert, merge, or convert-and-merge) over an ordered
//! list of input files and reports a structured, per-file outcome. The
//! three operations differ in failure semantics:
//!
//! - **convert**: every file is attempted; one file's failure is recorded
//!   and the rest still run.
//! - **merge**: a single unreadable input aborts the whole job.
//! - **convert-and-merge**: conversions write temporary artifacts; if any
//!   conversion fails the job fails and no merge is attempted, since
//!   merging a partial set would silently drop content. Temporary
//!   artifacts are deleted on every exit path.
//!
//! Progress is delivered through an explicit callback and cancellation
//! through an explicit shared flag; there is no ambient mutable state.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::task;

use crate::config::{Config, Operation};
use crate::convert::DocumentConverter;
use crate::error::{PdfDuskError, Result};
use crate::io::PdfWriter;
use crate::merge::DocumentMerger;

/// Cooperative cancellation flag shared between a job and its driver.
///
/// Checked between pages and between files, never mid-pixel-operation;
/// in-flight work finishes its current page before the flag is honored.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The phase a job is in when a progress update fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Per-file dark-mode conversion.
    Converting,
    /// Document concatenation.
    Merging,
    /// Writing the final output.
    Finalizing,
}

/// One progress milestone: how many files have completed, out of how many,
/// and in which phase. `files_done` is monotonically non-decreasing within
/// a phase.
#[derive(Debug, Clone, Copy)]
pub struct ProgressUpdate {
    /// Files completed so far in this phase.
    pub files_done: usize,
    /// Total files in this phase.
    pub total_files: usize,
    /// Current phase.
    pub phase: Phase,
}

/// Progress callback invoked after each file/page milestone.
pub type ProgressSink = Arc<dyn Fn(ProgressUpdate) + Send + Sync>;

fn emit(progress: &ProgressSink, update: ProgressUpdate) {
    (progress.as_ref())(update);
}

/// Outcome for a single input file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    /// The input path.
    pub input: PathBuf,

    /// Output path, for per-file outputs of a successful conversion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Human-readable failure cause, when the file failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn succeeded(input: PathBuf, output: Option<PathBuf>) -> Self {
        Self {
            input,
            output,
            error: None,
        }
    }

    fn failed(input: PathBuf, error: &PdfDuskError) -> Self {
        Self {
            input,
            output: None,
            error: Some(error.detailed_message()),
        }
    }

    /// Whether this file was processed successfully.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Overall terminal state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// Every step completed successfully.
    Done,
    /// The job failed, or at least one file did.
    Failed,
}

/// Structured result of one batch job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Overall job status.
    pub status: BatchStatus,

    /// Per-file outcomes, in input order.
    pub files: Vec<FileReport>,

    /// Path of the merged output, when the job produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged_output: Option<PathBuf>,

    /// Job-level failure cause, when the whole job failed at once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Process exit code for this result (0 on success).
    #[serde(skip)]
    pub exit_code: i32,
}

impl BatchResult {
    fn done(files: Vec<FileReport>, merged_output: Option<PathBuf>) -> Self {
        Self {
            status: BatchStatus::Done,
            files,
            merged_output,
            error: None,
            exit_code: 0,
        }
    }

    fn failed(files: Vec<FileReport>, error: &PdfDuskError) -> Self {
        Self {
            status: BatchStatus::Failed,
            files,
            merged_output: None,
            error: Some(error.detailed_message()),
            exit_code: error.exit_code(),
        }
    }

    fn failed_files(files: Vec<FileReport>, message: String) -> Self {
        Self {
            status: BatchStatus::Failed,
            files,
            merged_output: None,
            error: Some(message),
            exit_code: 6,
        }
    }

    /// Whether the job completed without any failure.
    pub fn succeeded(&self) -> bool {
        self.status == BatchStatus::Done
    }
}

/// Run one batch job to completion.
///
/// The configuration is the job description: ordered inputs, operation,
/// scale, and output targets. `progress` (if any) receives a milestone
/// after every completed page and file. The returned result is terminal;
/// this function does not panic on per-file failures.
pub async fn run(config: &Config, cancel: CancelFlag, progress: Option<ProgressSink>) -> BatchResult {
    let progress: ProgressSink = progress.unwrap_or_else(|| Arc::new(|_| {}));
    let config = Arc::new(config.clone());

    match config.operation {
        Operation::Convert => run_convert(config, cancel, progress).await,
        Operation::Merge => run_merge(config, cancel, progress).await,
        Operation::ConvertAndMerge => run_convert_and_merge(config, cancel, progress).await,
    }
}

/// Convert one input and persist the result at `output`.
///
/// The CPU-bound conversion runs on a blocking thread; `on_page` re-emits
/// a progress milestone after each page.
async fn convert_file_to(
    config: &Config,
    input: PathBuf,
    output: PathBuf,
    cancel: CancelFlag,
    on_page: impl Fn() + Send + 'static,
) -> Result<PathBuf> {
    let scale = config.scale;
    let doc = task::spawn_blocking(move || {
        let converter = DocumentConverter::new(scale);
        converter.convert(&input, &cancel, |_, _| on_page())
    })
    .await
    .map_err(|e| PdfDuskError::other(format!("Conversion task failed: {e}")))??;

    let writer = PdfWriter::with_compression(config.compression);
    writer.save(&doc, &output).await?;

    Ok(output)
}

/// Convert every input concurrently, with independent per-file outcomes.
///
/// Returns reports in input order regardless of completion order.
async fn convert_all(
    config: &Arc<Config>,
    cancel: &CancelFlag,
    progress: &ProgressSink,
    outputs: &[PathBuf],
) -> Vec<FileReport> {
    let total = config.inputs.len();
    let done = Arc::new(AtomicUsize::new(0));

    let tasks = config
        .inputs
        .iter()
        .cloned()
        .zip(outputs.iter().cloned())
        .enumerate()
        .map(|(idx, (input, output))| {
            let config = Arc::clone(config);
            let cancel = cancel.clone();
            let progress = Arc::clone(progress);
            let done = Arc::clone(&done);
            async move {
                if cancel.is_cancelled() {
                    return (idx, FileReport::failed(input, &PdfDuskError::Cancelled));
                }

                let page_progress = {
                    let progress = Arc::clone(&progress);
                    let done = Arc::clone(&done);
                    move || {
                        emit(&progress, ProgressUpdate {
                            files_done: done.load(Ordering::SeqCst),
                            total_files: total,
                            phase: Phase::Converting,
                        });
                    }
                };

                let result =
                    convert_file_to(&config, input.clone(), output, cancel.clone(), page_progress)
                        .await;

                let files_done = done.fetch_add(1, Ordering::SeqCst) + 1;
                emit(&progress, ProgressUpdate {
                    files_done,
                    total_files: total,
                    phase: Phase::Converting,
                });

                match result {
                    Ok(out) => (idx, FileReport::succeeded(input, Some(out))),
                    Err(e) => (idx, FileReport::failed(input, &e)),
                }
            }
        });

    let mut indexed: Vec<(usize, FileReport)> = stream::iter(tasks)
        .buffer_unordered(config.effective_jobs())
        .collect()
        .await;
    indexed.sort_by_key(|(idx, _)| *idx);

    indexed.into_iter().map(|(_, report)| report).collect()
}

async fn run_convert(
    config: Arc<Config>,
    cancel: CancelFlag,
    progress: ProgressSink,
) -> BatchResult {
    let outputs: Vec<PathBuf> = config
        .inputs
        .iter()
        .map(|input| config.converted_output_path(input))
        .collect();

    let files = convert_all(&config, &cancel, &progress, &outputs).await;

    if cancel.is_cancelled() {
        return BatchResult::failed(files, &PdfDuskError::Cancelled);
    }

    let failed = files.iter().filter(|f| !f.is_success()).count();
    if failed == 0 {
        BatchResult::done(files, None)
    } else {
        let message = format!("{failed} of {} file(s) failed to convert", config.inputs.len());
        BatchResult::failed_files(files, message)
    }
}

async fn run_merge(config: Arc<Config>, cancel: CancelFlag, progress: ProgressSink) -> BatchResult {
    if cancel.is_cancelled() {
        return BatchResult::failed(Vec::new(), &PdfDuskError::Cancelled);
    }

    let merger = DocumentMerger::new();
    let merge_progress = Arc::clone(&progress);
    let merge_result = merger
        .merge(&config.inputs, config.effective_jobs(), move |done, total| {
            emit(&merge_progress, ProgressUpdate {
                files_done: done,
                total_files: total,
                phase: Phase::Merging,
            });
        })
        .await;

    let outcome = match merge_result {
        Ok(outcome) => outcome,
        Err(e) => return BatchResult::failed(Vec::new(), &e),
    };

    if cancel.is_cancelled() {
        return BatchResult::failed(Vec::new(), &PdfDuskError::Cancelled);
    }

    let files = outcome
        .merged_files
        .into_iter()
        .map(|input| FileReport::succeeded(input, None))
        .collect();
    finalize_merged(&config, &progress, files, outcome.document).await
}

async fn run_convert_and_merge(
    config: Arc<Config>,
    cancel: CancelFlag,
    progress: ProgressSink,
) -> BatchResult {
    // All temporary artifacts for this job live in one staging directory;
    // dropping it removes them on every exit path.
    let staging = match tempfile::Builder::new()
        .prefix(".pdfdusk-")
        .tempdir_in(&config.output_dir)
    {
        Ok(dir) => dir,
        Err(e) => return BatchResult::failed(Vec::new(), &PdfDuskError::Io { source: e }),
    };

    let artifacts: Vec<PathBuf> = config
        .inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| staging.path().join(artifact_name(idx, input)))
        .collect();

    let files = convert_all(&config, &cancel, &progress, &artifacts).await;

    if cancel.is_cancelled() {
        let result = BatchResult::failed(files, &PdfDuskError::Cancelled);
        cleanup_staging(staging);
        return result;
    }

    let failed = files.iter().filter(|f| !f.is_success()).count();
    if failed > 0 {
        // Merging the remaining artifacts would silently drop content.
        let message = format!(
            "{failed} of {} file(s) failed to convert; merge aborted",
            config.inputs.len()
        );
        let result = BatchResult::failed_files(files, message);
        cleanup_staging(staging);
        return result;
    }

    let merger = DocumentMerger::new();
    let merge_progress = Arc::clone(&progress);
    let merge_result = merger
        .merge(&artifacts, config.effective_jobs(), move |done, total| {
            emit(&merge_progress, ProgressUpdate {
                files_done: done,
                total_files: total,
                phase: Phase::Merging,
            });
        })
        .await;

    let result = match merge_result {
        Ok(outcome) => {
            // Per-file reports point at the original inputs, not artifacts.
            let files = config
                .inputs
                .iter()
                .cloned()
                .map(|input| FileReport::succeeded(input, None))
                .collect();
            finalize_merged(&config, &progress, files, outcome.document).await
        }
        Err(e) => BatchResult::failed(files, &e),
    };

    cleanup_staging(staging);
    result
}

/// Write the merged document to its final location.
async fn finalize_merged(
    config: &Config,
    progress: &ProgressSink,
    files: Vec<FileReport>,
    document: lopdf::Document,
) -> BatchResult {
    let total = config.inputs.len();
    emit(progress, ProgressUpdate {
        files_done: total,
        total_files: total,
        phase: Phase::Finalizing,
    });

    let output = config.merged_output_path();
    let writer = PdfWriter::with_compression(config.compression);
    match writer.save(&document, &output).await {
        Ok(()) => BatchResult::done(files, Some(output)),
        Err(e) => BatchResult::failed(files, &e),
    }
}

/// Unique staging name for one input's temporary artifact.
///
/// The index prefix keeps concurrently produced artifacts collision-free
/// even when inputs share a file stem, and preserves input order for the
/// merge step.
fn artifact_name(index: usize, input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{index:04}_{stem}_dark.pdf")
}

/// Remove the staging directory, logging (but not propagating) failure so
/// cleanup never masks the job outcome.
fn cleanup_staging(staging: tempfile::TempDir) {
    if let Err(e) = staging.close() {
        eprintln!("Warning: failed to remove temporary artifacts: {e}");
    }
}
