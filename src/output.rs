//! Result types returned by a batch run.

use crate::error::StageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of one file's pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    /// Source file name (within the input directory).
    pub file: String,
    /// 1-based position of the file in the batch.
    pub ordinal: usize,
    /// Path of the delivered PDF. Present whenever the optimize stage
    /// succeeded, even if a later cleanup failure marked the file as errored.
    pub final_pdf: Option<PathBuf>,
    /// The first stage failure, if any. `None` means a fully clean pipeline.
    pub error: Option<StageError>,
}

impl FileResult {
    /// Whether every stage, cleanup included, succeeded.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate outcome of a batch run.
#[derive(Debug)]
pub struct BatchOutput {
    /// Per-file outcomes, in batch order.
    pub results: Vec<FileResult>,
    /// Aggregate counters and timings.
    pub stats: BatchStats,
    /// Where the error report was written, when any file failed.
    pub error_report: Option<PathBuf>,
}

impl BatchOutput {
    /// Whether no file recorded an error.
    pub fn is_clean(&self) -> bool {
        self.stats.failed_files == 0
    }
}

/// Counters and timings for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStats {
    /// PDF files discovered in the input directory.
    pub total_files: usize,
    /// Files whose pipeline completed all four stages.
    pub converted_files: usize,
    /// Files that recorded a stage error.
    pub failed_files: usize,
    /// Number of waves executed (`ceil(total / parallelism)`).
    pub waves: usize,
    /// Pipelines run concurrently per wave.
    pub parallelism: usize,
    /// Total wall-clock duration of the run in milliseconds.
    pub total_duration_ms: u64,
}
