//! # pdf-flatten
//!
//! Flatten a directory of PDF documents into re-rasterized, image-only PDFs.
//!
//! ## Why this crate?
//!
//! Forms portals, archival systems, and print shops routinely choke on PDFs
//! with transparency, embedded fonts, or interactive layers. The reliable
//! fix is brute force: render every page to an image, reassemble the images
//! into a PDF, and recompress the result to a conservative compatibility
//! level. This crate batch-drives ImageMagick and Ghostscript to do exactly
//! that for a whole directory at once, bounding the number of concurrent
//! external processes to the host's parallelism and isolating failures so
//! one broken document never sinks the batch.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ./original/*.pdf
//!  │
//!  ├─ scan      list the input directory, one pipeline per file
//!  ├─ schedule  waves of ≤ P concurrent pipelines (P = host parallelism)
//!  │
//!  │    per file:
//!  │    ├─ 1. Rasterize   convert -density 150 … → ./temp/{stem}-N.jpg
//!  │    ├─ 2. Reassemble  convert pages… → ./temp/{stem}_image.pdf
//!  │    ├─ 3. Optimize    gs -sDEVICE=pdfwrite … → ./output/{stem}_final.pdf
//!  │    └─ 4. Cleanup     delete the file's temp artifacts
//!  │
//!  └─ report    errors.json when any file failed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_flatten::{run_batch, BatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Defaults: ./original → ./temp → ./output, parallelism = host CPUs
//!     let config = BatchConfig::default();
//!     let output = run_batch(&config).await?;
//!     eprintln!(
//!         "{}/{} files flattened in {} wave(s)",
//!         output.stats.converted_files,
//!         output.stats.total_files,
//!         output.stats.waves,
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-flatten` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf-flatten = { version = "0.3", default-features = false }
//! ```
//!
//! ## External tools
//!
//! The heavy lifting is delegated to tools you almost certainly already
//! have: ImageMagick's `convert` (rasterize + reassemble) and Ghostscript's
//! `gs` (recompress). Both are invoked as plain subprocesses with a
//! configurable deadline; nothing is linked in-process. Binaries and
//! directories are configurable through [`BatchConfig`], mainly so tests
//! and packagers can substitute them.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod report;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{run_batch, scan_input_dir, wave_count, InputFile};
pub use config::{BatchConfig, BatchConfigBuilder, PdfPreset};
pub use error::{FlattenError, Stage, StageError};
pub use output::{BatchOutput, BatchStats, FileResult};
pub use progress::{format_elapsed, render_line, ProgressSnapshot, ProgressTracker};
pub use report::{ErrorRecord, ErrorReport};
