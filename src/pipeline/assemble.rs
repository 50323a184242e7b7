//! Stage 2: reassemble a file's page images into a single intermediate PDF.

use crate::batch::InputFile;
use crate::config::BatchConfig;
use crate::error::{Stage, StageError};
use crate::pipeline::exec::run_tool;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the intermediate PDF for `stem`.
pub fn image_pdf_name(stem: &str) -> String {
    format!("{stem}_image.pdf")
}

/// Combine `pages` (already in page order) into `{stem}_image.pdf` in the
/// temp directory. Returns the path of the assembled PDF.
pub async fn assemble(
    file: &InputFile,
    pages: &[PathBuf],
    config: &BatchConfig,
) -> Result<PathBuf, StageError> {
    let image_pdf = config.temp_dir.join(image_pdf_name(&file.stem));

    let mut args: Vec<OsString> = pages.iter().map(|p| p.as_os_str().to_owned()).collect();
    args.push(image_pdf.as_os_str().to_owned());

    run_tool(Stage::Reassemble, &config.magick_bin, args, config.tool_timeout).await?;

    Ok(image_pdf)
}

/// Path of the intermediate PDF a pipeline would produce for `stem`.
pub fn image_pdf_path(temp_dir: &Path, stem: &str) -> PathBuf {
    temp_dir.join(image_pdf_name(stem))
}
