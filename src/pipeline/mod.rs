//! Pipeline stages for flattening one PDF.
//!
//! Each submodule implements exactly one transformation step. Keeping
//! stages separate makes each independently testable and lets us swap an
//! external tool (e.g. `magick` for `convert`) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! rasterize ──▶ reassemble ──▶ optimize ──▶ cleanup
//! (convert)     (convert)      (gs)         (fs delete)
//! ```
//!
//! 1. [`rasterize`] — render every page to a JPEG in the temp directory and
//!    discover the produced page set
//! 2. [`assemble`]  — combine the page images into `{stem}_image.pdf`
//! 3. [`optimize`]  — recompress into the delivered `{stem}_final.pdf`
//! 4. [`cleanup`]   — delete the page images and the intermediate PDF
//!
//! [`exec`] is the shared external-process runner the tool stages go
//! through.
//!
//! [`flatten_file`] drives the four stages for one file as a strict state
//! machine, terminal on the first failure. Errors never cross file
//! boundaries: a failure here is returned in the [`FileResult`] and the
//! rest of the batch is unaffected.

pub mod assemble;
pub mod cleanup;
pub mod exec;
pub mod optimize;
pub mod rasterize;

use crate::batch::InputFile;
use crate::config::BatchConfig;
use crate::output::FileResult;
use crate::progress::ProgressTracker;
use tracing::{info, warn};

/// Run the four-stage pipeline for one file.
///
/// `ordinal` is the file's 1-based position in the batch; each stage
/// reports it together with a status message so the live display can show
/// which file moved last. Always returns a [`FileResult`] — per-file
/// failures are data, not `Err`s.
pub async fn flatten_file(
    file: &InputFile,
    ordinal: usize,
    config: &BatchConfig,
    progress: &ProgressTracker,
) -> FileResult {
    let fail = |error| FileResult {
        file: file.name.clone(),
        ordinal,
        final_pdf: None,
        error: Some(error),
    };

    // ── Stage 1: rasterize ───────────────────────────────────────────────
    let pages = match rasterize::rasterize(file, config).await {
        Ok(pages) => {
            progress.update(ordinal, format!("Converted PDF to image: {}", file.name));
            pages
        }
        Err(e) => {
            warn!(file = %file.name, error = %e, "rasterize failed");
            progress.update(ordinal, format!("Error converting PDF to image: {}", file.name));
            return fail(e);
        }
    };

    // ── Stage 2: reassemble ──────────────────────────────────────────────
    let image_pdf = match assemble::assemble(file, &pages, config).await {
        Ok(path) => {
            progress.update(
                ordinal,
                format!("Converted image to PDF: {}", assemble::image_pdf_name(&file.stem)),
            );
            path
        }
        Err(e) => {
            warn!(file = %file.name, error = %e, "reassemble failed");
            progress.update(ordinal, format!("Error converting image to PDF: {}", file.name));
            return fail(e);
        }
    };

    // ── Stage 3: optimize ────────────────────────────────────────────────
    let final_name = optimize::final_pdf_name(&file.stem);
    let final_pdf = match optimize::optimize(file, &image_pdf, config).await {
        Ok(path) => {
            progress.update(ordinal, format!("Created final PDF: {final_name}"));
            path
        }
        Err(e) => {
            warn!(file = %file.name, error = %e, "optimize failed");
            progress.update(ordinal, format!("Error creating final PDF: {final_name}"));
            return fail(e);
        }
    };

    // ── Stage 4: cleanup ─────────────────────────────────────────────────
    // The final PDF is already delivered at this point; a cleanup failure is
    // still reported so the operator knows temp residue exists.
    match cleanup::cleanup(&pages, &image_pdf).await {
        Ok(()) => {
            progress.update(ordinal, format!("Cleaned up intermediate files: {}", file.name));
        }
        Err(e) => {
            warn!(file = %file.name, error = %e, "cleanup failed");
            progress.update(
                ordinal,
                format!("Error cleaning up intermediate files: {}", file.name),
            );
            return FileResult {
                file: file.name.clone(),
                ordinal,
                final_pdf: Some(final_pdf),
                error: Some(e),
            };
        }
    }

    info!(file = %file.name, output = %final_pdf.display(), "flattened");
    FileResult {
        file: file.name.clone(),
        ordinal,
        final_pdf: Some(final_pdf),
        error: None,
    }
}
