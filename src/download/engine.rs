//! Segment download engine.
//!
//! Fetches the segments of one format strictly in order, appends them to
//! the destination and records the next index in the resume checkpoint
//! after every segment. A transfer can be continued from that checkpoint
//! after a cancellation or a failure.

use std::io::SeekFrom;
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::Rng;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncSeekExt, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::download::progress::{ProgressEvent, ProgressSink};
use crate::download::request::DownloadRequest;
use crate::download::source::MediaSource;
use crate::download::state::DownloadState;
use crate::download::throttle::{Pause, Throttle};
use crate::error::{Error, Result};
use crate::fs::{checkpoint_path, resolve_output_path, ResumeCheckpoint};
use crate::media::Episode;

/// Retries per segment after the initial attempt.
pub const MAX_RETRIES: u32 = 5;

/// Summary of a completed download.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadReport {
    pub path: PathBuf,
    /// Segments written during this run.
    pub segments: usize,
    /// Bytes written during this run.
    pub bytes: u64,
    pub elapsed: Duration,
}

/// How a download ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadOutcome {
    Completed(DownloadReport),
    /// Stopped early; the checkpoint holds `next_index`.
    Aborted { next_index: usize, path: PathBuf },
}

/// Why the transfer loop stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Interrupt {
    /// The cancellation token was tripped.
    Cancelled,
    /// The progress sink asked to stop.
    Stopped,
}

/// A fully received segment body.
struct Fetched {
    data: Vec<u8>,
    started: Instant,
    elapsed: Duration,
}

/// Downloads episodes from a [`MediaSource`].
pub struct Downloader<'a> {
    source: &'a dyn MediaSource,
    cancel: CancellationToken,
}

impl<'a> Downloader<'a> {
    pub fn new(source: &'a dyn MediaSource, cancel: CancellationToken) -> Self {
        Self { source, cancel }
    }

    /// Download `episode` as described by `request`.
    ///
    /// Every progress event is delivered to `sink` before the engine
    /// continues. Failures are reported to the sink as an error event and
    /// returned.
    pub async fn download(
        &self,
        episode: &Episode,
        request: &DownloadRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadOutcome> {
        match self.run(episode, request, sink).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                let _ = sink.on_progress(&ProgressEvent::Error {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        episode: &Episode,
        request: &DownloadRequest,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadOutcome> {
        let title = episode.title.as_str();

        // Input errors first, before touching the filesystem
        let chapter = episode.chapter_by_number(request.chapter)?;
        let format = episode.format_by_name(&request.format)?;
        let window = episode.window(chapter, request.start, request.stop);
        let path = resolve_output_path(
            request.output.as_deref(),
            &episode.propose_filename(chapter),
        );

        if !request.overwrite && !request.continue_download && fs::try_exists(&path).await? {
            return Err(Error::FileExists(path));
        }

        let info_path = checkpoint_path(&path);
        let resume_index = if request.continue_download && !request.overwrite {
            ResumeCheckpoint::read(&info_path).await?
        } else {
            0
        };

        let segments = self.source.segment_list(format).await?.cut(window);
        tracing::info!(
            "Downloading {} segments of format {} to {}, starting at {}",
            segments.len(),
            format.name,
            path.display(),
            resume_index
        );

        let mut file = open_output(&path, request.overwrite).await?;
        let mut checkpoint = ResumeCheckpoint::create(info_path, resume_index).await?;
        let mut state = DownloadState::new(segments.len(), resume_index);
        let mut throttle = Throttle::new(request.rate_limit, request.throttle);
        let started = Instant::now();

        while !state.is_finished() {
            let index = state.next_index;
            let url = segments
                .segment_url(index)
                .ok_or_else(|| Error::Download(format!("segment {} out of range", index)))?;

            let fetched = match self.fetch_segment(&url, request, &mut state, title, sink).await? {
                ControlFlow::Continue(fetched) => fetched,
                ControlFlow::Break(interrupt) => {
                    return Ok(self.interrupted(interrupt, &state, title, path, sink));
                }
            };

            if self.cancel.is_cancelled() {
                return Ok(self.interrupted(Interrupt::Cancelled, &state, title, path, sink));
            }

            let measurement = throttle.measure(fetched.data.len(), fetched.elapsed);
            state.rate = measurement.effective_rate;
            state.segment_received();

            if let Pause::Delay(_) = measurement.pause {
                if sink
                    .on_progress(&ProgressEvent::Delaying(state.snapshot(title)))
                    .is_break()
                {
                    return Ok(self.interrupted(Interrupt::Stopped, &state, title, path, sink));
                }
            }
            // A cancelled pause still writes the segment it already has
            self.pause(measurement.pause.duration()).await;

            file.write_all(&fetched.data).await?;
            file.flush().await?;
            state.segment_written(fetched.data.len());
            checkpoint.store(state.next_index).await?;

            throttle.record_iteration(measurement.pause, fetched.started.elapsed());

            if sink
                .on_progress(&ProgressEvent::SegmentComplete(state.snapshot(title)))
                .is_break()
            {
                return Ok(self.interrupted(Interrupt::Stopped, &state, title, path, sink));
            }
        }

        drop(file);
        checkpoint.remove().await?;

        let report = DownloadReport {
            path,
            segments: state.segments_written,
            bytes: state.bytes_written,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Finished {} ({} segments, {} bytes)",
            report.path.display(),
            report.segments,
            report.bytes
        );

        let _ = sink.on_progress(&ProgressEvent::Success(state.snapshot(title)));
        Ok(DownloadOutcome::Completed(report))
    }

    /// Fetch one segment, retrying transport failures.
    async fn fetch_segment(
        &self,
        url: &str,
        request: &DownloadRequest,
        state: &mut DownloadState,
        title: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<ControlFlow<Interrupt, Fetched>> {
        state.retries = 0;

        loop {
            if self.cancel.is_cancelled() {
                return Ok(ControlFlow::Break(Interrupt::Cancelled));
            }
            if sink
                .on_progress(&ProgressEvent::Waiting(state.snapshot(title)))
                .is_break()
            {
                return Ok(ControlFlow::Break(Interrupt::Stopped));
            }

            let started = Instant::now();
            match self.source.segment(url).await {
                Ok(data) => {
                    return Ok(ControlFlow::Continue(Fetched {
                        data,
                        started,
                        elapsed: started.elapsed(),
                    }));
                }
                Err(e) if state.retries >= MAX_RETRIES => {
                    tracing::warn!("Giving up on {} after {} retries", url, state.retries);
                    return Err(e);
                }
                Err(e) => {
                    state.retries += 1;
                    tracing::warn!(
                        "Fetching {} failed: {} (retry {}/{})",
                        url,
                        e,
                        state.retries,
                        MAX_RETRIES
                    );
                    if !self.pause(retry_pause(request.retry_delay)).await {
                        return Ok(ControlFlow::Break(Interrupt::Cancelled));
                    }
                }
            }
        }
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }

        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }

    fn interrupted(
        &self,
        interrupt: Interrupt,
        state: &DownloadState,
        title: &str,
        path: PathBuf,
        sink: &mut dyn ProgressSink,
    ) -> DownloadOutcome {
        tracing::info!(
            "Download of {} stopped at segment {} ({:?})",
            path.display(),
            state.next_index,
            interrupt
        );

        if interrupt == Interrupt::Cancelled {
            let _ = sink.on_progress(&ProgressEvent::Aborted(state.snapshot(title)));
        }

        DownloadOutcome::Aborted {
            next_index: state.next_index,
            path,
        }
    }
}

/// Open the destination for appending. `truncate` discards existing content.
async fn open_output(path: &Path, truncate: bool) -> Result<File> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(truncate)
        .open(path)
        .await?;
    file.seek(SeekFrom::End(0)).await?;
    Ok(file)
}

/// Random pause of up to `max` between retries.
fn retry_pause(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::types::{EpisodeInfo, RawChapter};
    use crate::download::progress::NullSink;
    use crate::download::throttle::ThrottleSettings;
    use crate::media::{Format, SegmentList};

    const BASE_URL: &str = "mem://cdn/720p";

    /// In-memory source with scripted failures and cancellation.
    struct FakeSource {
        segments: Vec<Vec<u8>>,
        failures: Mutex<HashMap<usize, u32>>,
        cancel_at: Option<(usize, CancellationToken)>,
        requests: AtomicUsize,
    }

    impl FakeSource {
        fn new(count: usize) -> Self {
            Self {
                segments: (0..count)
                    .map(|i| format!("<segment {}>", i).into_bytes())
                    .collect(),
                failures: Mutex::new(HashMap::new()),
                cancel_at: None,
                requests: AtomicUsize::new(0),
            }
        }

        fn failing(self, index: usize, times: u32) -> Self {
            self.failures.lock().unwrap().insert(index, times);
            self
        }

        fn cancelling(mut self, index: usize, token: CancellationToken) -> Self {
            self.cancel_at = Some((index, token));
            self
        }

        fn concat(&self, range: std::ops::Range<usize>) -> Vec<u8> {
            self.segments[range].concat()
        }
    }

    #[async_trait]
    impl MediaSource for FakeSource {
        async fn segment_list(&self, _format: &Format) -> Result<SegmentList> {
            Ok(SegmentList {
                base_url: BASE_URL.to_string(),
                segments: (0..self.segments.len()).map(|i| format!("{}.ts", i)).collect(),
                segment_duration: 10.0,
            })
        }

        async fn segment(&self, url: &str) -> Result<Vec<u8>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let index: usize = url
                .trim_start_matches(BASE_URL)
                .trim_start_matches('/')
                .trim_end_matches(".ts")
                .parse()
                .map_err(|_| Error::Download(format!("bad url {}", url)))?;

            if let Some((at, token)) = &self.cancel_at {
                if *at == index {
                    token.cancel();
                }
            }

            let mut failures = self.failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(&index) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(Error::http_status(url, 503));
                }
            }

            Ok(self.segments[index].clone())
        }
    }

    fn make_episode() -> Episode {
        let info = EpisodeInfo {
            title: "Test Stream".to_string(),
            chapters: vec![
                RawChapter {
                    title: "Intro".to_string(),
                    offset: 0.0,
                },
                RawChapter {
                    title: "Main".to_string(),
                    offset: 20.0,
                },
                RawChapter {
                    title: "Outro".to_string(),
                    offset: 50.0,
                },
            ],
            ..Default::default()
        };
        let formats = vec![Format {
            name: "720p".to_string(),
            url: format!("{}/index.m3u8", BASE_URL),
        }];
        Episode::from_info("42", info, formats)
    }

    fn make_request(output: &Path) -> DownloadRequest {
        DownloadRequest {
            output: Some(output.to_path_buf()),
            retry_delay: Duration::ZERO,
            rate_limit: 1e12,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_download() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(6);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let mut events = Vec::new();
        let mut sink = |event: &ProgressEvent| {
            events.push(event.clone());
            ControlFlow::Continue(())
        };
        let outcome = downloader
            .download(&make_episode(), &make_request(&output), &mut sink)
            .await
            .unwrap();

        let DownloadOutcome::Completed(report) = outcome else {
            panic!("expected completion");
        };
        assert_eq!(report.segments, 6);
        assert_eq!(report.path, output);
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..6));
        assert!(!checkpoint_path(&output).exists());

        let completed = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::SegmentComplete(_)))
            .count();
        assert_eq!(completed, 6);
        assert!(matches!(events.last(), Some(ProgressEvent::Success(s)) if s.progress == 1.0));
    }

    #[tokio::test]
    async fn test_existing_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        std::fs::write(&output, b"precious").unwrap();
        let source = FakeSource::new(3);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let result = downloader
            .download(&make_episode(), &make_request(&output), &mut NullSink)
            .await;

        assert!(matches!(result, Err(Error::FileExists(path)) if path == output));
        assert_eq!(std::fs::read(&output).unwrap(), b"precious");
        assert!(!checkpoint_path(&output).exists());
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overwrite_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        std::fs::write(&output, b"old content that is long").unwrap();
        let source = FakeSource::new(2);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let request = DownloadRequest {
            overwrite: true,
            ..make_request(&output)
        };
        downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..2));
    }

    #[tokio::test]
    async fn test_cancel_then_resume() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let token = CancellationToken::new();
        let source = FakeSource::new(8).cancelling(3, token.clone());
        let downloader = Downloader::new(&source, token);

        let mut events = Vec::new();
        let mut sink = |event: &ProgressEvent| {
            events.push(event.clone());
            ControlFlow::Continue(())
        };
        let outcome = downloader
            .download(&make_episode(), &make_request(&output), &mut sink)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DownloadOutcome::Aborted {
                next_index: 3,
                path: output.clone()
            }
        );
        assert!(matches!(events.last(), Some(ProgressEvent::Aborted(_))));
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..3));
        assert_eq!(
            ResumeCheckpoint::read(&checkpoint_path(&output)).await.unwrap(),
            3
        );

        let source = FakeSource::new(8);
        let downloader = Downloader::new(&source, CancellationToken::new());
        let request = DownloadRequest {
            continue_download: true,
            ..make_request(&output)
        };
        let outcome = downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await
            .unwrap();

        assert!(matches!(outcome, DownloadOutcome::Completed(ref r) if r.segments == 5));
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..8));
        assert!(!checkpoint_path(&output).exists());
        assert_eq!(source.requests.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_continue_without_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(2);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let request = DownloadRequest {
            continue_download: true,
            ..make_request(&output)
        };
        let result = downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await;

        assert!(matches!(result, Err(Error::ResumeStateUnreadable { .. })));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(3).failing(1, MAX_RETRIES);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let mut max_retries = 0;
        let mut sink = |event: &ProgressEvent| {
            if let Some(snapshot) = event.snapshot() {
                max_retries = max_retries.max(snapshot.retries);
            }
            ControlFlow::Continue(())
        };
        let outcome = downloader
            .download(&make_episode(), &make_request(&output), &mut sink)
            .await
            .unwrap();

        assert!(matches!(outcome, DownloadOutcome::Completed(_)));
        assert_eq!(max_retries, MAX_RETRIES);
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..3));
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(3).failing(1, MAX_RETRIES + 1);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let mut last = None;
        let mut sink = |event: &ProgressEvent| {
            last = Some(event.clone());
            ControlFlow::Continue(())
        };
        let result = downloader
            .download(&make_episode(), &make_request(&output), &mut sink)
            .await;

        assert!(matches!(result, Err(Error::HttpStatus { status: 503, .. })));
        assert!(matches!(last, Some(ProgressEvent::Error { .. })));
        // 1 good segment, then the initial attempt and every retry
        assert_eq!(
            source.requests.load(Ordering::SeqCst),
            1 + 1 + MAX_RETRIES as usize
        );
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..1));
        assert_eq!(
            ResumeCheckpoint::read(&checkpoint_path(&output)).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_chapter_window() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(8);
        let downloader = Downloader::new(&source, CancellationToken::new());

        // chapter 2 spans 20s..50s, segments are 10s long
        let request = DownloadRequest {
            chapter: 2,
            ..make_request(&output)
        };
        downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), source.concat(2..6));
    }

    #[tokio::test]
    async fn test_window_beyond_list_completes_empty() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(3);
        let downloader = Downloader::new(&source, CancellationToken::new());

        // chapter 3 starts at 50s, past the last segment
        let request = DownloadRequest {
            chapter: 3,
            ..make_request(&output)
        };
        let outcome = downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await
            .unwrap();

        assert!(matches!(outcome, DownloadOutcome::Completed(ref r) if r.segments == 0));
        assert!(std::fs::read(&output).unwrap().is_empty());
        assert!(!checkpoint_path(&output).exists());
        assert_eq!(source.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_format_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(2);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let request = DownloadRequest {
            format: "4k".to_string(),
            ..make_request(&output)
        };
        let result = downloader
            .download(&make_episode(), &request, &mut NullSink)
            .await;

        assert!(matches!(result, Err(Error::FormatNotFound(_))));
        assert!(!output.exists());
        assert!(!checkpoint_path(&output).exists());
    }

    #[tokio::test]
    async fn test_sink_stop_keeps_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(5);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let mut completed = 0;
        let mut sink = |event: &ProgressEvent| {
            if matches!(event, ProgressEvent::SegmentComplete(_)) {
                completed += 1;
                if completed == 2 {
                    return ControlFlow::Break(());
                }
            }
            ControlFlow::Continue(())
        };
        let outcome = downloader
            .download(&make_episode(), &make_request(&output), &mut sink)
            .await
            .unwrap();

        assert!(matches!(outcome, DownloadOutcome::Aborted { next_index: 2, .. }));
        assert_eq!(std::fs::read(&output).unwrap(), source.concat(0..2));
        assert_eq!(
            ResumeCheckpoint::read(&checkpoint_path(&output)).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_rate_limit_sleeps() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(2);
        let downloader = Downloader::new(&source, CancellationToken::new());

        // each segment is 11 bytes, at 100 B/s that is >= 0.11 s per segment
        let request = DownloadRequest {
            rate_limit: 100.0,
            ..make_request(&output)
        };
        let started = std::time::Instant::now();
        let mut max_rate: f64 = 0.0;
        let mut sink = |event: &ProgressEvent| {
            if let Some(snapshot) = event.snapshot() {
                max_rate = max_rate.max(snapshot.rate);
            }
            ControlFlow::Continue(())
        };
        downloader
            .download(&make_episode(), &request, &mut sink)
            .await
            .unwrap();

        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(max_rate <= 100.0);
    }

    #[tokio::test]
    async fn test_delaying_reports_received_segment() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.ts");
        let source = FakeSource::new(4);
        let downloader = Downloader::new(&source, CancellationToken::new());

        let request = DownloadRequest {
            throttle: ThrottleSettings {
                delay: Duration::from_millis(1),
                delay_after: Duration::ZERO,
            },
            ..make_request(&output)
        };
        let mut events = Vec::new();
        let mut sink = |event: &ProgressEvent| {
            events.push(event.clone());
            ControlFlow::Continue(())
        };
        downloader
            .download(&make_episode(), &request, &mut sink)
            .await
            .unwrap();

        let mut delays = 0;
        for (i, event) in events.iter().enumerate() {
            let ProgressEvent::Delaying(delaying) = event else {
                continue;
            };
            delays += 1;
            let completed = events[i..]
                .iter()
                .find_map(|e| match e {
                    ProgressEvent::SegmentComplete(s) => Some(s),
                    _ => None,
                })
                .unwrap();
            assert_eq!(delaying.progress, completed.progress);
        }
        assert!(delays > 0);
    }
}
