//! Stage 1: rasterize a PDF's pages to JPEG images.
//!
//! ImageMagick names its own outputs: a single-page document becomes
//! `{stem}.jpg`, a multi-page one `{stem}-0.jpg`, `{stem}-1.jpg`, …  The
//! stage therefore lists the temp directory once, right after the tool
//! exits, and returns the discovered page set so later stages work from an
//! explicit artifact list instead of re-scanning. The filter anchors on
//! `{stem}.{ext}` / `{stem}-N.{ext}` so a stem like `report` never claims
//! the pages of `report2`.

use crate::batch::InputFile;
use crate::config::BatchConfig;
use crate::error::{Stage, StageError};
use crate::pipeline::exec::run_tool;
use std::ffi::OsStr;
use std::path::PathBuf;
use tracing::debug;

/// File extension of rasterized page images.
pub const PAGE_EXT: &str = "jpg";

/// Rasterize `file` at the configured density, white background, alpha
/// removed. Returns the produced page images in page order.
pub async fn rasterize(
    file: &InputFile,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, StageError> {
    let input = config.input_dir.join(&file.name);
    let out = config.temp_dir.join(format!("{}.{PAGE_EXT}", file.stem));
    let dpi = config.dpi.to_string();

    let args: [&OsStr; 8] = [
        OsStr::new("-density"),
        OsStr::new(&dpi),
        OsStr::new("-background"),
        OsStr::new("white"),
        OsStr::new("-alpha"),
        OsStr::new("remove"),
        input.as_os_str(),
        out.as_os_str(),
    ];

    run_tool(Stage::Rasterize, &config.magick_bin, args, config.tool_timeout).await?;

    let pages = discover_pages(file, config).await?;
    if pages.is_empty() {
        return Err(StageError::NoPages {
            tool: config.magick_bin.display().to_string(),
            stem: file.stem.clone(),
        });
    }
    debug!(file = %file.name, pages = pages.len(), "rasterized");
    Ok(pages)
}

/// List the temp directory and collect this file's page images, sorted by
/// page number.
async fn discover_pages(
    file: &InputFile,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, StageError> {
    let fs_err = |e: std::io::Error| StageError::Fs {
        stage: Stage::Rasterize,
        op: "list".into(),
        path: config.temp_dir.display().to_string(),
        detail: e.to_string(),
    };

    let mut entries = tokio::fs::read_dir(&config.temp_dir).await.map_err(fs_err)?;
    let mut names: Vec<String> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(fs_err)? {
        // Page names are generated from a UTF-8 stem; anything else is not ours.
        if let Some(name) = entry.file_name().to_str() {
            if matches_stem(name, &file.stem, PAGE_EXT) {
                names.push(name.to_string());
            }
        }
    }

    names.sort_by_key(|name| page_index(name, &file.stem, PAGE_EXT));
    Ok(names
        .into_iter()
        .map(|name| config.temp_dir.join(name))
        .collect())
}

/// Whether `name` is a page image belonging to `stem`.
///
/// Accepts exactly `{stem}.{ext}` (single page) and `{stem}-N.{ext}` with a
/// numeric N (multi page). The separator check is what keeps `report` from
/// matching `report2-0.jpg`.
pub fn matches_stem(name: &str, stem: &str, ext: &str) -> bool {
    let suffix = match name.strip_prefix(stem) {
        Some(s) => s,
        None => return false,
    };
    if let Some(rest) = suffix.strip_prefix('.') {
        return rest == ext;
    }
    if let Some(rest) = suffix.strip_prefix('-') {
        return rest
            .strip_suffix(&format!(".{ext}"))
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()));
    }
    false
}

/// Numeric page index embedded in a page image name; 0 for the
/// single-page form. Sorting by this keeps page 10 after page 9.
fn page_index(name: &str, stem: &str, ext: &str) -> usize {
    name.strip_prefix(stem)
        .and_then(|s| s.strip_prefix('-'))
        .and_then(|s| s.strip_suffix(&format!(".{ext}")))
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_accepts_own_pages_only() {
        assert!(matches_stem("report.jpg", "report", "jpg"));
        assert!(matches_stem("report-0.jpg", "report", "jpg"));
        assert!(matches_stem("report-12.jpg", "report", "jpg"));

        assert!(!matches_stem("report.pdf", "report", "jpg"));
        assert!(!matches_stem("report_image.pdf", "report", "jpg"));
        assert!(!matches_stem("other-0.jpg", "report", "jpg"));
    }

    #[test]
    fn filter_does_not_over_match_longer_stems() {
        // "report2"'s pages must never be claimed by "report".
        assert!(!matches_stem("report2.jpg", "report", "jpg"));
        assert!(!matches_stem("report2-0.jpg", "report", "jpg"));
        // while "report2" still claims its own
        assert!(matches_stem("report2-0.jpg", "report2", "jpg"));
    }

    #[test]
    fn filter_rejects_non_numeric_suffixes() {
        assert!(!matches_stem("report-final.jpg", "report", "jpg"));
        assert!(!matches_stem("report-.jpg", "report", "jpg"));
    }

    #[test]
    fn pages_sort_numerically_not_lexically() {
        let mut names = vec![
            "doc-10.jpg".to_string(),
            "doc-2.jpg".to_string(),
            "doc-0.jpg".to_string(),
            "doc-1.jpg".to_string(),
        ];
        names.sort_by_key(|n| page_index(n, "doc", "jpg"));
        assert_eq!(names, ["doc-0.jpg", "doc-1.jpg", "doc-2.jpg", "doc-10.jpg"]);
    }

    #[test]
    fn single_page_form_sorts_first() {
        assert_eq!(page_index("doc.jpg", "doc", "jpg"), 0);
        assert_eq!(page_index("doc-3.jpg", "doc", "jpg"), 3);
    }
}
