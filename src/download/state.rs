//! Download state tracking.

use crate::download::progress::ProgressSnapshot;

/// Mutable state of one running download.
#[derive(Debug, Default, Clone)]
pub struct DownloadState {
    /// Index of the next segment to fetch within the window.
    pub next_index: usize,
    /// Segments in the window.
    pub total: usize,

    // Reported values
    pub progress: f32,
    pub rate: f64,
    pub retries: u32,

    // Statistics for this run
    pub bytes_written: u64,
    pub segments_written: usize,
}

impl DownloadState {
    /// Create state for a window of `total` segments resuming at `next_index`.
    pub fn new(total: usize, next_index: usize) -> Self {
        let mut state = Self {
            next_index,
            total,
            ..Default::default()
        };
        state.progress = state.fraction(next_index);
        state
    }

    /// Report the segment at `next_index` as received, before it is written.
    pub fn segment_received(&mut self) {
        self.progress = self.fraction(self.next_index + 1);
    }

    /// Record a written segment and advance.
    pub fn segment_written(&mut self, bytes: usize) {
        self.bytes_written += bytes as u64;
        self.segments_written += 1;
        self.next_index += 1;
        self.progress = self.fraction(self.next_index);
    }

    pub fn is_finished(&self) -> bool {
        self.next_index >= self.total
    }

    /// Snapshot for a progress event.
    pub fn snapshot(&self, title: &str) -> ProgressSnapshot {
        ProgressSnapshot {
            progress: self.progress,
            rate: self.rate,
            retries: self.retries,
            title: title.to_string(),
        }
    }

    fn fraction(&self, done: usize) -> f32 {
        if self.total == 0 {
            return 1.0;
        }
        (done.min(self.total) as f64 / self.total as f64) as f32
    }
}
