//! CLI binary for pdf-flatten.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`
//! and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use pdf_flatten::{format_elapsed, run_batch, BatchConfig, PdfPreset};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Flatten ./original/*.pdf into ./output/*_final.pdf
  pdf-flatten

  # Explicit directories, 4 pipelines per wave
  pdf-flatten --input-dir scans --output-dir delivered -j 4

  # Smaller output at the cost of image quality
  pdf-flatten --preset screen

  # ImageMagick 7 installs `magick` instead of `convert`
  pdf-flatten --magick-bin magick

  # Machine-readable run summary
  pdf-flatten --json --no-progress

FILESYSTEM LAYOUT (relative to the working directory):
  ./original/*.pdf        inputs (read-only)
  ./temp/                 page images and intermediate PDFs (cleaned per file)
  ./output/*_final.pdf    delivered results
  ./errors.json           written only when at least one file failed

EXIT STATUS:
  0  every file flattened cleanly
  1  at least one file failed (details in errors.json)
  2  fatal error before or after the batch (bad input dir, unwritable report)

REQUIRED TOOLS:
  ImageMagick (convert) and Ghostscript (gs) must be on PATH, or pointed to
  with --magick-bin / --gs-bin.
"#;

/// Flatten directories of PDFs into re-rasterized, image-only PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "pdf-flatten",
    version,
    about = "Flatten directories of PDFs into re-rasterized, image-only PDFs",
    long_about = "Batch-convert every PDF in a directory into a flattened, re-rasterized copy: \
pages are rendered to images with ImageMagick, reassembled into a PDF, and recompressed with \
Ghostscript. Files are processed in waves sized to the host's parallelism; one file's failure \
never aborts the batch.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory scanned for input PDFs.
    #[arg(long, env = "PDF_FLATTEN_INPUT_DIR", default_value = "./original")]
    input_dir: PathBuf,

    /// Scratch directory for intermediate artifacts.
    #[arg(long, env = "PDF_FLATTEN_TEMP_DIR", default_value = "./temp")]
    temp_dir: PathBuf,

    /// Directory receiving the flattened PDFs.
    #[arg(long, env = "PDF_FLATTEN_OUTPUT_DIR", default_value = "./output")]
    output_dir: PathBuf,

    /// Where to write the error report when files fail.
    #[arg(long, env = "PDF_FLATTEN_ERROR_REPORT", default_value = "errors.json")]
    error_report: PathBuf,

    /// Rasterization density in DPI (72–600).
    #[arg(long, env = "PDF_FLATTEN_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// Pipelines per wave. Defaults to the host's available parallelism.
    #[arg(short, long, env = "PDF_FLATTEN_JOBS")]
    jobs: Option<usize>,

    /// Ghostscript PDFSETTINGS preset.
    #[arg(long, env = "PDF_FLATTEN_PRESET", value_enum, default_value = "default")]
    preset: PresetArg,

    /// Ghostscript compatibility level.
    #[arg(long, env = "PDF_FLATTEN_COMPAT", default_value = "1.4")]
    compat: String,

    /// ImageMagick binary (rasterize + reassemble).
    #[arg(long, env = "PDF_FLATTEN_MAGICK_BIN", default_value = "convert")]
    magick_bin: PathBuf,

    /// Ghostscript binary (recompress).
    #[arg(long, env = "PDF_FLATTEN_GS_BIN", default_value = "gs")]
    gs_bin: PathBuf,

    /// Per-invocation tool deadline in seconds.
    #[arg(long, env = "PDF_FLATTEN_TIMEOUT", default_value_t = 600)]
    timeout: u64,

    /// Disable the live progress display.
    #[arg(long, env = "PDF_FLATTEN_NO_PROGRESS")]
    no_progress: bool,

    /// Print the run summary as JSON to stdout.
    #[arg(long, env = "PDF_FLATTEN_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF_FLATTEN_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF_FLATTEN_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PresetArg {
    Default,
    Screen,
    Ebook,
    Printer,
    Prepress,
}

impl From<PresetArg> for PdfPreset {
    fn from(v: PresetArg) -> Self {
        match v {
            PresetArg::Default => PdfPreset::Default,
            PresetArg::Screen => PdfPreset::Screen,
            PresetArg::Ebook => PdfPreset::Ebook,
            PresetArg::Printer => PdfPreset::Printer,
            PresetArg::Prepress => PdfPreset::Prepress,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress display owns the terminal while it is active; suppress
    // INFO-level library logs unless the user asked for them.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = BatchConfig::builder()
        .input_dir(&cli.input_dir)
        .temp_dir(&cli.temp_dir)
        .output_dir(&cli.output_dir)
        .error_report(&cli.error_report)
        .dpi(cli.dpi)
        .preset(cli.preset.clone().into())
        .compatibility_level(cli.compat.as_str())
        .magick_bin(&cli.magick_bin)
        .ghostscript_bin(&cli.gs_bin)
        .tool_timeout(Duration::from_secs(cli.timeout))
        .show_progress(show_progress);
    if let Some(jobs) = cli.jobs {
        builder = builder.parallelism(jobs);
    }
    // Fatal errors (bad config, unreadable input dir, unwritable report)
    // use exit code 2; code 1 is reserved for per-file failures.
    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {e:#}", red("✘"));
            std::process::exit(2);
        }
    };

    // ── Run batch ────────────────────────────────────────────────────────
    let output = match run_batch(&config).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {e:#}", red("✘"));
            std::process::exit(2);
        }
    };

    // ── Summary ──────────────────────────────────────────────────────────
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&output.stats).context("Failed to serialise summary")?
        );
    }

    if !cli.quiet {
        let elapsed = format_elapsed(Duration::from_millis(output.stats.total_duration_ms));
        if output.is_clean() {
            eprintln!(
                "{} {} file(s) flattened  →  {}",
                green("✔"),
                bold(&output.stats.converted_files.to_string()),
                bold(&cli.output_dir.display().to_string()),
            );
        } else {
            eprintln!(
                "{} {}/{} file(s) flattened  ({} failed, see {})",
                red("✘"),
                bold(&output.stats.converted_files.to_string()),
                output.stats.total_files,
                red(&output.stats.failed_files.to_string()),
                cli.error_report.display(),
            );
        }
        eprintln!(
            "Completed in: {elapsed} {}",
            dim(&format!(
                "({} wave(s) × {} thread(s))",
                output.stats.waves, output.stats.parallelism
            )),
        );
    }

    // A batch with per-file failures completes, but must not look clean.
    if !output.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}
