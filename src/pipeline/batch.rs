use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use log::{info, warn};
use rayon::prelude::*;

use super::{Pipeline, WorkItem, WorkOutcome, generate_thumbnails};
use crate::error::ThumbError;

/// A file that failed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Aggregate result of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Files submitted
    pub total: usize,
    /// Files whose thumbnails were (re)written
    pub generated: usize,
    /// Files skipped because every tier was fresh
    pub skipped: usize,
    /// Files not started because the batch was cancelled
    pub cancelled: usize,
    /// Failed files, sorted by path
    pub errors: Vec<ErrorReport>,
}

impl BatchReport {
    /// Files that did not fail
    pub fn succeeded(&self) -> usize {
        self.total - self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Host parallelism, at least one.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Generate thumbnails for every path on a pool of `workers` threads.
///
/// Each file is independent: an error or panic while handling one file is
/// recorded as an [`ErrorReport`] and the rest of the batch continues. When
/// `cancel_token` is set, files not yet started are reported as cancelled.
/// Only failing to start the pool is an error for the whole batch.
pub fn process_batch(
    paths: &[PathBuf],
    output_base: &Path,
    workers: usize,
    overwrite: bool,
    pipeline: &Pipeline,
    cancel_token: Option<&Arc<AtomicBool>>,
) -> Result<BatchReport> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .thread_name(|i| format!("thumb-worker-{}", i))
        .build()
        .map_err(|e| ThumbError::Pool(e.to_string()))?;

    info!(
        "Generating thumbnails for {} files with {} workers",
        paths.len(),
        workers.max(1)
    );

    let outcomes: Vec<(PathBuf, Result<WorkOutcome, String>)> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| {
                if let Some(token) = cancel_token {
                    if token.load(Ordering::Relaxed) {
                        return (path.clone(), Ok(WorkOutcome::Cancelled));
                    }
                }

                let item = WorkItem {
                    path: path.clone(),
                    output_base: output_base.to_path_buf(),
                    overwrite,
                };
                let outcome = run_isolated(&item, pipeline);
                if let Err(message) = &outcome {
                    warn!("Failed: {}: {}", path.display(), message);
                }
                (path.clone(), outcome)
            })
            .collect()
    });

    let mut report = BatchReport {
        total: paths.len(),
        ..BatchReport::default()
    };
    for (path, outcome) in outcomes {
        match outcome {
            Ok(WorkOutcome::Generated { .. }) => report.generated += 1,
            Ok(WorkOutcome::Fresh) => report.skipped += 1,
            Ok(WorkOutcome::Cancelled) => report.cancelled += 1,
            Err(message) => report.errors.push(ErrorReport { path, message }),
        }
    }
    report.errors.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(report)
}

/// Run one item, turning both errors and panics into a message.
fn run_isolated(item: &WorkItem, pipeline: &Pipeline) -> Result<WorkOutcome, String> {
    match panic::catch_unwind(AssertUnwindSafe(|| generate_thumbnails(item, pipeline))) {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(payload) => Err(format!("worker panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Log the end-of-run summary.
pub fn log_summary(report: &BatchReport) {
    if report.cancelled > 0 {
        warn!("Cancelled before {} of {} files", report.cancelled, report.total);
    }

    if report.is_clean() {
        info!(
            "All thumbnails generated successfully ({} generated, {} already fresh)",
            report.generated, report.skipped
        );
    } else {
        warn!(
            "{} of {} images failed to process:",
            report.errors.len(),
            report.total
        );
        for err in &report.errors {
            warn!("{}", err);
        }
    }
}
