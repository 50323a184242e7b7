//! Error types for the pdf-flatten library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`FlattenError`] — **Fatal**: the batch cannot proceed at all
//!   (input directory unreadable, invalid configuration, error report
//!   unwritable). Returned as `Err(FlattenError)` from [`crate::batch::run_batch`].
//!
//! * [`StageError`] — **Non-fatal**: one stage of one file's pipeline failed
//!   (tool exited non-zero, a page image could not be deleted) but every
//!   other file in the batch is fine. Stored inside
//!   [`crate::output::FileResult`] and persisted to `errors.json` so callers
//!   can inspect partial success rather than losing the whole batch to one
//!   bad document.
//!
//! The separation lets callers decide their own tolerance: abort on the first
//! file failure, log and continue, or collect all errors for a post-run report.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf-flatten library.
///
/// Per-file failures use [`StageError`] and are stored in
/// [`crate::output::FileResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// The input directory does not exist or could not be listed.
    #[error("Failed to read input directory '{path}': {source}\nCheck the directory exists and is readable.")]
    InputDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The temp or output directory could not be created.
    #[error("Failed to create directory '{path}': {source}")]
    DirCreateFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write the error report at the end of the run.
    #[error("Failed to write error report '{path}': {source}")]
    ReportWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single file's pipeline stage.
///
/// Recorded against the originating file and serialized into `errors.json`.
/// The batch continues with the other files.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
pub enum StageError {
    /// The external tool could not be launched at all (missing binary,
    /// permission denied on the executable).
    #[error("{stage}: failed to launch '{tool}': {detail}")]
    Launch {
        stage: Stage,
        tool: String,
        detail: String,
    },

    /// The external tool ran but exited non-zero (or was killed by a signal).
    #[error("{stage}: '{tool}' exited with {status}: {stderr}")]
    Tool {
        stage: Stage,
        tool: String,
        /// Exit code, or "signal" when terminated without one.
        status: String,
        /// Trimmed, truncated stderr from the tool.
        stderr: String,
    },

    /// The external tool exceeded the configured deadline and was killed.
    #[error("{stage}: '{tool}' timed out after {secs}s")]
    Timeout {
        stage: Stage,
        tool: String,
        secs: u64,
    },

    /// A filesystem operation inside a stage failed.
    #[error("{stage}: {op} '{path}' failed: {detail}")]
    Fs {
        stage: Stage,
        /// The operation that failed ("list", "delete", …).
        op: String,
        path: String,
        detail: String,
    },

    /// The rasterizer exited 0 but left no page images behind.
    #[error("rasterize: '{tool}' produced no page images for stem '{stem}'")]
    NoPages { tool: String, stem: String },
}

impl StageError {
    /// The stage this error originated from.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Launch { stage, .. }
            | StageError::Tool { stage, .. }
            | StageError::Timeout { stage, .. }
            | StageError::Fs { stage, .. } => *stage,
            StageError::NoPages { .. } => Stage::Rasterize,
        }
    }
}

/// The four stages of a file's pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Rasterize,
    Reassemble,
    Optimize,
    Cleanup,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stage::Rasterize => "rasterize",
            Stage::Reassemble => "reassemble",
            Stage::Optimize => "optimize",
            Stage::Cleanup => "cleanup",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_error_display() {
        let e = StageError::Tool {
            stage: Stage::Optimize,
            tool: "gs".into(),
            status: "1".into(),
            stderr: "Unrecoverable error".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("optimize"), "got: {msg}");
        assert!(msg.contains("gs"));
        assert!(msg.contains("Unrecoverable error"));
    }

    #[test]
    fn timeout_display() {
        let e = StageError::Timeout {
            stage: Stage::Rasterize,
            tool: "convert".into(),
            secs: 600,
        };
        assert!(e.to_string().contains("600s"));
        assert!(e.to_string().contains("convert"));
    }

    #[test]
    fn stage_accessor_matches_variant() {
        let e = StageError::Fs {
            stage: Stage::Cleanup,
            op: "delete".into(),
            path: "temp/report-0.jpg".into(),
            detail: "permission denied".into(),
        };
        assert_eq!(e.stage(), Stage::Cleanup);

        let e = StageError::NoPages {
            tool: "convert".into(),
            stem: "report".into(),
        };
        assert_eq!(e.stage(), Stage::Rasterize);
    }

    #[test]
    fn stage_error_serializes_with_structure() {
        let e = StageError::Tool {
            stage: Stage::Optimize,
            tool: "gs".into(),
            status: "1".into(),
            stderr: "boom".into(),
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"Tool\""), "got: {json}");
        assert!(json.contains("\"optimize\""));
    }
}
