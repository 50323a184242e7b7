//! Stage 4: delete a file's intermediate artifacts.
//!
//! Runs only after a successful optimize. Deletes the page images first,
//! then the intermediate PDF. The delivered `{stem}_final.pdf` is never
//! touched. A failed deletion aborts the stage and is reported like any
//! other stage failure; whatever was already removed stays removed.

use crate::error::{Stage, StageError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Delete every page image, then the intermediate PDF.
pub async fn cleanup(pages: &[PathBuf], image_pdf: &Path) -> Result<(), StageError> {
    for page in pages {
        remove(page).await?;
    }
    remove(image_pdf).await?;
    debug!(
        image_pdf = %image_pdf.display(),
        pages = pages.len(),
        "cleaned up intermediate artifacts"
    );
    Ok(())
}

async fn remove(path: &Path) -> Result<(), StageError> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|e| StageError::Fs {
            stage: Stage::Cleanup,
            op: "delete".into(),
            path: path.display().to_string(),
            detail: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_pages_then_image_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let p0 = dir.path().join("doc-0.jpg");
        let p1 = dir.path().join("doc-1.jpg");
        let image = dir.path().join("doc_image.pdf");
        for p in [&p0, &p1, &image] {
            std::fs::write(p, b"x").unwrap();
        }

        cleanup(&[p0.clone(), p1.clone()], &image).await.unwrap();

        assert!(!p0.exists());
        assert!(!p1.exists());
        assert!(!image.exists());
    }

    #[tokio::test]
    async fn missing_artifact_is_a_stage_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("doc-0.jpg");
        let image = dir.path().join("doc_image.pdf");
        std::fs::write(&image, b"x").unwrap();

        let err = cleanup(&[missing], &image).await.unwrap_err();
        assert_eq!(err.stage(), Stage::Cleanup);
        // the image pdf was not reached
        assert!(image.exists());
    }
}
