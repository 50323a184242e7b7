//! Live batch progress: shared state plus a textual bar renderer.
//!
//! Every pipeline stage reports through a shared [`ProgressTracker`] handed
//! to it by the scheduler. `current` and `message` are updated under a single
//! `Mutex` so a rendered line is always internally consistent, even when
//! pipelines in the same wave report concurrently. The display is still
//! best-effort, not authoritative: between two files finishing at the same
//! moment, last-wins decides whose message is shown.
//!
//! Rendering itself is a pure function over a [`ProgressSnapshot`] — the
//! tracker only decides *when* to paint. The painted display is a single
//! evolving screen (the console is cleared before each paint), not a log
//! stream; durable per-file outcomes go to `tracing` and the error report.

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Width of the textual progress bar in characters.
const BAR_WIDTH: usize = 50;

/// Mutable progress fields, guarded by the tracker's mutex.
#[derive(Debug, Clone, Default)]
struct ProgressState {
    /// Items dispatched so far (1-based ordinal of the newest dispatch).
    processed: usize,
    /// Ordinal of the item most recently updated.
    current: usize,
    /// Last status message.
    message: String,
}

/// A point-in-time copy of the progress fields, for rendering.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub current: usize,
    pub total: usize,
    pub threads: usize,
    pub message: String,
}

/// Shared progress tracker for one batch run.
///
/// Cheap to share via `Arc`; all mutation goes through `&self`.
#[derive(Debug)]
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    total: usize,
    threads: usize,
    started: Instant,
    /// When false, updates are recorded but nothing is painted.
    render: bool,
}

impl ProgressTracker {
    /// Create a tracker for a batch of `total` files running `threads`
    /// pipelines per wave.
    pub fn new(total: usize, threads: usize, render: bool) -> Self {
        Self {
            state: Mutex::new(ProgressState::default()),
            total,
            threads,
            started: Instant::now(),
            render,
        }
    }

    /// Record that the file with 1-based ordinal `ordinal` has been
    /// dispatched into a wave.
    pub fn dispatched(&self, ordinal: usize) {
        let mut s = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if ordinal > s.processed {
            s.processed = ordinal;
        }
    }

    /// Record a stage outcome for the file with 1-based ordinal `ordinal`
    /// and repaint the display.
    pub fn update(&self, ordinal: usize, message: impl Into<String>) {
        {
            let mut s = self.state.lock().unwrap_or_else(|p| p.into_inner());
            s.current = ordinal;
            s.message = message.into();
        }
        self.paint();
    }

    /// Copy the current progress fields.
    pub fn snapshot(&self) -> ProgressSnapshot {
        let s = self.state.lock().unwrap_or_else(|p| p.into_inner());
        ProgressSnapshot {
            processed: s.processed,
            current: s.current,
            total: self.total,
            threads: self.threads,
            message: s.message.clone(),
        }
    }

    /// Wall-clock time since the tracker was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Clear the console and paint the current progress display to stderr.
    pub fn paint(&self) {
        if !self.render {
            return;
        }
        let snap = self.snapshot();
        // ESC[2J clears the screen, ESC[H homes the cursor: one evolving
        // display rather than a scrolling log.
        eprint!("\x1b[2J\x1b[H");
        eprintln!("{}", render_line(&snap));
        eprintln!("Time: {}", format_elapsed(self.elapsed()));
    }
}

/// Render the progress line for a snapshot.
///
/// `percent = processed / total * 100`, clamped to 100 and guarded against a
/// zero total; `floor(percent / 2)` of the 50 bar characters are filled.
pub fn render_line(snap: &ProgressSnapshot) -> String {
    let percent = if snap.total == 0 {
        0.0
    } else {
        ((snap.processed as f64 / snap.total as f64) * 100.0).min(100.0)
    };
    let filled = (percent / 2.0).floor() as usize;
    let bar: String = "*".repeat(filled) + &"_".repeat(BAR_WIDTH - filled);
    format!(
        "Progress ({} threads): {} of {} |{}| ({:.2}%) {}",
        snap.threads, snap.current, snap.total, bar, percent, snap.message
    )
}

/// Format a duration as `{h}h {m}m {s}s`, minutes and seconds modulo 60,
/// hours unbounded.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{hours}h {minutes}m {seconds}s")
}
