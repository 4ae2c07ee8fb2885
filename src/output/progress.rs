//! Progress bar sink for text mode.

use std::ops::ControlFlow;

use indicatif::{ProgressBar, ProgressStyle};

use crate::download::{ProgressEvent, ProgressSink, ProgressSnapshot};
use crate::output::stats::format_rate;

/// Resolution of the progress bar.
const BAR_SCALE: u64 = 1000;

/// Renders progress events as an `indicatif` progress bar.
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(BAR_SCALE))
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_style(download_style());
        Self { bar }
    }

    fn update(&self, snapshot: &ProgressSnapshot, status: &str) {
        self.bar.set_position(bar_position(snapshot.progress));
        self.bar.set_message(status_line(snapshot, status));
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_progress(&mut self, event: &ProgressEvent) -> ControlFlow<()> {
        match event {
            ProgressEvent::Waiting(s) if s.retries > 0 => self.update(s, "retrying"),
            ProgressEvent::Waiting(s) | ProgressEvent::SegmentComplete(s) => {
                self.update(s, "downloading")
            }
            ProgressEvent::Delaying(s) => self.update(s, "buffering"),
            ProgressEvent::Aborted(s) => {
                self.bar.set_position(bar_position(s.progress));
                self.bar.abandon_with_message(format!(
                    "aborted at {:.1}%, use --continue to resume",
                    s.progress * 100.0
                ));
            }
            ProgressEvent::Success(s) => {
                self.bar.set_position(bar_position(s.progress));
                self.bar.finish_with_message("done");
            }
            ProgressEvent::Error { .. } => self.bar.abandon(),
        }

        ControlFlow::Continue(())
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {percent:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

fn bar_position(progress: f32) -> u64 {
    (progress.clamp(0.0, 1.0) as f64 * BAR_SCALE as f64).round() as u64
}

fn status_line(snapshot: &ProgressSnapshot, status: &str) -> String {
    if snapshot.retries > 0 {
        format!(
            "{} {} (retry {})",
            format_rate(snapshot.rate),
            status,
            snapshot.retries
        )
    } else {
        format!("{} {}", format_rate(snapshot.rate), status)
    }
}
