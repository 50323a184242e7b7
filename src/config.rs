//! Configuration types for batch PDF flattening.
//!
//! All batch behaviour is controlled through [`BatchConfig`], built via its
//! [`BatchConfigBuilder`]. Keeping every knob in one struct makes it trivial
//! to share configs across tasks, serialise them for logging, and diff two
//! runs to understand why their outputs differ.
//!
//! The defaults reproduce the tool's zero-flag conventions exactly:
//! `./original` in, `./temp` scratch, `./output` out, `errors.json` report,
//! 150 dpi, parallelism from the host's processing units.

use crate::error::FlattenError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for one batch run.
///
/// Built via [`BatchConfig::builder()`] or using [`BatchConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf_flatten::BatchConfig;
///
/// let config = BatchConfig::builder()
///     .dpi(150)
///     .parallelism(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Directory scanned for `*.pdf` inputs. Default: `./original`.
    pub input_dir: PathBuf,

    /// Scratch directory for page images and intermediate PDFs. Created if
    /// absent; its contents for a file are deleted by that file's cleanup
    /// stage. Default: `./temp`.
    pub temp_dir: PathBuf,

    /// Directory receiving the delivered `{stem}_final.pdf` files. Created if
    /// absent; never cleaned. Default: `./output`.
    pub output_dir: PathBuf,

    /// Path of the error report written when at least one file failed.
    /// Default: `./errors.json`.
    pub error_report: PathBuf,

    /// Rasterization density in DPI. Range: 72–600. Default: 150.
    ///
    /// 150 DPI keeps text legible in the flattened output while the page
    /// JPEGs stay small enough that reassembly and recompression are fast.
    pub dpi: u32,

    /// Concurrent pipelines per wave. Default: `None` = the host's available
    /// parallelism (`std::thread::available_parallelism()`).
    ///
    /// Each in-flight pipeline owns at most one external process at a time,
    /// so this bounds the number of concurrent `convert`/`gs` processes.
    pub parallelism: Option<usize>,

    /// ImageMagick binary used for rasterization and reassembly.
    /// Default: `convert`. Override for `magick` shims or test stubs.
    pub magick_bin: PathBuf,

    /// Ghostscript binary used for recompression. Default: `gs`.
    pub ghostscript_bin: PathBuf,

    /// Ghostscript `-dPDFSETTINGS` preset. Default: [`PdfPreset::Default`].
    pub preset: PdfPreset,

    /// Ghostscript `-dCompatibilityLevel` target. Default: "1.4".
    ///
    /// 1.4 is the most widely accepted baseline for archival and
    /// government-portal uploads, which is the usual reason to flatten.
    pub compatibility_level: String,

    /// Deadline for each external tool invocation. The child is killed on
    /// expiry and the stage fails with a timeout error. Default: 600 s.
    pub tool_timeout: Duration,

    /// Render the live progress display to stderr. Default: true.
    /// Disable for non-interactive runs; per-file outcomes are still logged
    /// via `tracing` and collected in the report.
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("./original"),
            temp_dir: PathBuf::from("./temp"),
            output_dir: PathBuf::from("./output"),
            error_report: PathBuf::from("errors.json"),
            dpi: 150,
            parallelism: None,
            magick_bin: PathBuf::from("convert"),
            ghostscript_bin: PathBuf::from("gs"),
            preset: PdfPreset::default(),
            compatibility_level: "1.4".to_string(),
            tool_timeout: Duration::from_secs(600),
            show_progress: true,
        }
    }
}

impl BatchConfig {
    /// Create a new builder for `BatchConfig`.
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder {
            config: Self::default(),
        }
    }

    /// Effective parallelism: the configured override, or the host's
    /// available processing units, or 1 if that cannot be determined.
    /// Never returns 0, even for a hand-built config.
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}

/// Builder for [`BatchConfig`].
#[derive(Debug)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn error_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.error_report = path.into();
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn parallelism(mut self, n: usize) -> Self {
        self.config.parallelism = Some(n.max(1));
        self
    }

    pub fn magick_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.config.magick_bin = bin.into();
        self
    }

    pub fn ghostscript_bin(mut self, bin: impl Into<PathBuf>) -> Self {
        self.config.ghostscript_bin = bin.into();
        self
    }

    pub fn preset(mut self, preset: PdfPreset) -> Self {
        self.config.preset = preset;
        self
    }

    pub fn compatibility_level(mut self, level: impl Into<String>) -> Self {
        self.config.compatibility_level = level.into();
        self
    }

    pub fn tool_timeout(mut self, timeout: Duration) -> Self {
        self.config.tool_timeout = timeout;
        self
    }

    pub fn show_progress(mut self, v: bool) -> Self {
        self.config.show_progress = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<BatchConfig, FlattenError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(FlattenError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.parallelism == Some(0) {
            return Err(FlattenError::InvalidConfig(
                "Parallelism must be ≥ 1".into(),
            ));
        }
        if c.tool_timeout.is_zero() {
            return Err(FlattenError::InvalidConfig(
                "Tool timeout must be non-zero".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Ghostscript `-dPDFSETTINGS` preset controlling the recompression profile.
///
/// The presets trade output size against image quality; `/default` balances
/// the two and is what the tool has always shipped with. The others map to
/// Ghostscript's distiller parameters unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PdfPreset {
    /// Balanced output, usable on screen and in print. (default)
    #[default]
    Default,
    /// 72 dpi images, smallest output.
    Screen,
    /// 150 dpi images, medium quality.
    Ebook,
    /// 300 dpi images, print quality.
    Printer,
    /// Maximum quality, colour-preserving.
    Prepress,
}

impl PdfPreset {
    /// The literal value passed to `-dPDFSETTINGS=`.
    pub fn as_arg(&self) -> &'static str {
        match self {
            PdfPreset::Default => "/default",
            PdfPreset::Screen => "/screen",
            PdfPreset::Ebook => "/ebook",
            PdfPreset::Printer => "/printer",
            PdfPreset::Prepress => "/prepress",
        }
    }
}
