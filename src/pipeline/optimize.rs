//! Stage 3: recompress the intermediate PDF into the delivered output.
//!
//! Ghostscript rewrites the image-only PDF at the configured compatibility
//! level and preset, producing `{stem}_final.pdf` in the output directory.
//! `-dNOPAUSE -dQUIET -dBATCH` keep the invocation non-interactive.

use crate::batch::InputFile;
use crate::config::BatchConfig;
use crate::error::{Stage, StageError};
use crate::pipeline::exec::run_tool;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Name of the delivered PDF for `stem`.
pub fn final_pdf_name(stem: &str) -> String {
    format!("{stem}_final.pdf")
}

/// Recompress `image_pdf` into `{stem}_final.pdf` in the output directory.
/// Returns the path of the delivered PDF.
pub async fn optimize(
    file: &InputFile,
    image_pdf: &Path,
    config: &BatchConfig,
) -> Result<PathBuf, StageError> {
    let final_pdf = config.output_dir.join(final_pdf_name(&file.stem));

    let mut out_arg = OsString::from("-sOutputFile=");
    out_arg.push(final_pdf.as_os_str());

    let args: Vec<OsString> = vec![
        "-sDEVICE=pdfwrite".into(),
        format!("-dCompatibilityLevel={}", config.compatibility_level).into(),
        format!("-dPDFSETTINGS={}", config.preset.as_arg()).into(),
        "-dNOPAUSE".into(),
        "-dQUIET".into(),
        "-dBATCH".into(),
        out_arg,
        image_pdf.as_os_str().to_owned(),
    ];

    run_tool(Stage::Optimize, &config.ghostscript_bin, args, config.tool_timeout).await?;

    Ok(final_pdf)
}
