//! Batch entry point: directory scan, wave scheduling, error flush.
//!
//! ## Why waves?
//!
//! Every in-flight pipeline owns an external `convert`/`gs` process, so
//! unbounded concurrency means unbounded process count. The scheduler
//! partitions the batch into consecutive waves of at most P files
//! (P = detected host parallelism), runs all pipelines in a wave
//! concurrently, and waits for the whole wave to settle before starting the
//! next. Waves are strictly sequential; completion order *within* a wave is
//! unspecified.
//!
//! Pipelines suspend only at external-process and filesystem boundaries, so
//! a single task polling the wave's futures is enough — no spawning, no
//! synchronisation beyond the progress tracker's mutex.

use crate::config::BatchConfig;
use crate::error::FlattenError;
use crate::output::{BatchOutput, BatchStats, FileResult};
use crate::pipeline;
use crate::progress::ProgressTracker;
use crate::report::ErrorReport;
use futures::future::join_all;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// One source PDF, identified at scan time. Immutable for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// File name within the input directory, e.g. `report.pdf`.
    pub name: String,
    /// Name with the extension stripped; keys every artifact the file's
    /// pipeline produces. Stems are unique because input names are.
    pub stem: String,
}

impl InputFile {
    fn new(name: String) -> Self {
        let stem = Path::new(&name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.clone());
        Self { name, stem }
    }
}

/// Number of waves a batch of `total` files needs at parallelism `p`.
pub fn wave_count(total: usize, parallelism: usize) -> usize {
    total.div_ceil(parallelism.max(1))
}

/// List the input directory and collect `*.pdf` entries, sorted by name so
/// wave composition is deterministic across platforms.
///
/// Non-UTF-8 names are skipped with a warning: every artifact name is
/// derived from the stem as a string, so such entries cannot be processed.
pub async fn scan_input_dir(dir: &Path) -> Result<Vec<InputFile>, FlattenError> {
    let io_err = |source| FlattenError::InputDirUnreadable {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut names: Vec<String> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let file_type = entry.file_type().await.map_err(io_err)?;
        if file_type.is_dir() {
            continue;
        }
        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            warn!("skipping non-UTF-8 entry in {}", dir.display());
            continue;
        };
        let is_pdf = Path::new(name)
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            names.push(name.to_string());
        }
    }
    names.sort();

    Ok(names.into_iter().map(InputFile::new).collect())
}

/// Flatten every PDF in the configured input directory.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(BatchOutput)` on success, even if some files failed
/// (check `output.stats.failed_files` or [`BatchOutput::is_clean`]).
///
/// # Errors
/// Returns `Err(FlattenError)` only for fatal errors:
/// - Input directory unreadable
/// - Temp/output directory cannot be created
/// - The error report cannot be written
pub async fn run_batch(config: &BatchConfig) -> Result<BatchOutput, FlattenError> {
    let run_start = Instant::now();

    // ── Scan ─────────────────────────────────────────────────────────────
    let files = scan_input_dir(&config.input_dir).await?;
    info!("Found {} PDF file(s) in {}", files.len(), config.input_dir.display());

    for dir in [&config.temp_dir, &config.output_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| FlattenError::DirCreateFailed {
                path: dir.clone(),
                source,
            })?;
    }

    // ── Schedule ─────────────────────────────────────────────────────────
    let parallelism = config.effective_parallelism();
    let progress = ProgressTracker::new(files.len(), parallelism, config.show_progress);
    progress.paint();

    let mut report = ErrorReport::new();
    let mut results: Vec<FileResult> = Vec::with_capacity(files.len());

    for (wave_idx, wave) in files.chunks(parallelism).enumerate() {
        let base = wave_idx * parallelism;
        let pipelines = wave.iter().enumerate().map(|(offset, file)| {
            let ordinal = base + offset + 1;
            progress.dispatched(ordinal);
            pipeline::flatten_file(file, ordinal, config, &progress)
        });

        // The barrier: the next wave starts only after every pipeline in
        // this one has settled.
        for result in join_all(pipelines).await {
            if let Some(error) = &result.error {
                report.push(&result.file, error.clone());
            }
            results.push(result);
        }
    }

    // ── Flush errors ─────────────────────────────────────────────────────
    let error_report = if report.flush(&config.error_report).await? {
        Some(config.error_report.clone())
    } else {
        None
    };

    // ── Stats ────────────────────────────────────────────────────────────
    let failed_files = results.iter().filter(|r| r.error.is_some()).count();
    let stats = BatchStats {
        total_files: files.len(),
        converted_files: results.len() - failed_files,
        failed_files,
        waves: wave_count(files.len(), parallelism),
        parallelism,
        total_duration_ms: run_start.elapsed().as_millis() as u64,
    };

    info!(
        "Batch complete: {}/{} files in {} wave(s), {}ms",
        stats.converted_files, stats.total_files, stats.waves, stats.total_duration_ms
    );

    Ok(BatchOutput {
        results,
        stats,
        error_report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_count_is_ceiling_division() {
        assert_eq!(wave_count(0, 4), 0);
        assert_eq!(wave_count(1, 4), 1);
        assert_eq!(wave_count(4, 4), 1);
        assert_eq!(wave_count(5, 4), 2);
        assert_eq!(wave_count(8, 4), 2);
        assert_eq!(wave_count(9, 4), 3);
    }

    #[test]
    fn wave_count_survives_zero_parallelism() {
        assert_eq!(wave_count(3, 0), 3);
    }

    #[test]
    fn input_file_stem_strips_extension_only() {
        let f = InputFile::new("annual.report.pdf".into());
        assert_eq!(f.stem, "annual.report");
        let f = InputFile::new("a.pdf".into());
        assert_eq!(f.stem, "a");
    }

    #[tokio::test]
    async fn scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt", "scan.PDF", "noext"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("folder.pdf")).unwrap();

        let files = scan_input_dir(dir.path()).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf", "scan.PDF"]);
    }

    #[tokio::test]
    async fn scan_missing_dir_is_fatal() {
        let err = scan_input_dir(Path::new("/no/such/input-dir"))
            .await
            .unwrap_err();
        assert!(matches!(err, FlattenError::InputDirUnreadable { .. }));
    }
}
