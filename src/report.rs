//! Per-file error collection and the `errors.json` report.
//!
//! Records accumulate while the waves run and are flushed once, at the end
//! of the batch, only when non-empty — a clean run leaves no report behind.
//! A failure to write the report is fatal: silently losing the only durable
//! record of what failed would defeat its purpose.

use crate::error::{FlattenError, StageError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// One per-file failure, as persisted in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Source PDF file name.
    #[serde(rename = "pdfFile")]
    pub pdf_file: String,
    /// Structured failure detail.
    pub error: StageError,
}

/// Append-only collection of [`ErrorRecord`]s for one run.
#[derive(Debug, Default)]
pub struct ErrorReport {
    records: Vec<ErrorRecord>,
}

impl ErrorReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure against `pdf_file`.
    pub fn push(&mut self, pdf_file: impl Into<String>, error: StageError) {
        self.records.push(ErrorRecord {
            pdf_file: pdf_file.into(),
            error,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    /// Write the report pretty-printed to `path` if any records exist.
    ///
    /// Returns `true` when a report was written. Write failures propagate as
    /// fatal [`FlattenError::ReportWriteFailed`].
    pub async fn flush(&self, path: &Path) -> Result<bool, FlattenError> {
        if self.records.is_empty() {
            return Ok(false);
        }
        let json = serde_json::to_vec_pretty(&self.records).map_err(|e| {
            FlattenError::Internal(format!("error report serialization: {e}"))
        })?;
        tokio::fs::write(path, json)
            .await
            .map_err(|source| FlattenError::ReportWriteFailed {
                path: path.to_path_buf(),
                source,
            })?;
        info!("Wrote {} error record(s) to {}", self.records.len(), path.display());
        Ok(true)
    }
}
