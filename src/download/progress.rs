//! Progress events emitted by the download engine.

use std::ops::ControlFlow;

use serde::Serialize;

/// Read-only copy of the engine's progress at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    /// Fraction of the window downloaded, `0.0..=1.0`.
    pub progress: f32,
    /// Effective transfer rate in bytes per second.
    pub rate: f64,
    /// Retries of the current segment.
    pub retries: u32,
    pub title: String,
}

/// One progress event.
///
/// Serialized with a `type` tag, e.g. `{"type":"waiting","progress":0.5,...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A segment request is about to be issued.
    Waiting(ProgressSnapshot),
    /// The engine pauses to simulate playback of buffered data.
    Delaying(ProgressSnapshot),
    /// A segment was written and checkpointed.
    SegmentComplete(ProgressSnapshot),
    /// The download was cancelled; the checkpoint is kept.
    Aborted(ProgressSnapshot),
    /// All segments were written.
    Success(ProgressSnapshot),
    /// The download failed.
    Error { message: String },
}

impl ProgressEvent {
    /// The snapshot carried by this event, if any.
    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        match self {
            ProgressEvent::Waiting(s)
            | ProgressEvent::Delaying(s)
            | ProgressEvent::SegmentComplete(s)
            | ProgressEvent::Aborted(s)
            | ProgressEvent::Success(s) => Some(s),
            ProgressEvent::Error { .. } => None,
        }
    }
}

/// Consumer of progress events.
///
/// Each event is delivered before the engine continues. Returning
/// [`ControlFlow::Break`] stops the download at that point; the checkpoint
/// is kept so the download can be continued later.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, event: &ProgressEvent) -> ControlFlow<()>;
}

impl<F> ProgressSink for F
where
    F: FnMut(&ProgressEvent) -> ControlFlow<()> + Send,
{
    fn on_progress(&mut self, event: &ProgressEvent) -> ControlFlow<()> {
        self(event)
    }
}

/// Sink that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&mut self, _event: &ProgressEvent) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> ProgressSnapshot {
        ProgressSnapshot {
            progress: 0.5,
            rate: 1000.0,
            retries: 2,
            title: "Stream".to_string(),
        }
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_value(ProgressEvent::SegmentComplete(snapshot())).unwrap();
        assert_eq!(json["type"], "segment_complete");
        assert_eq!(json["progress"], 0.5);
        assert_eq!(json["retries"], 2);
        assert_eq!(json["title"], "Stream");

        let json = serde_json::to_value(ProgressEvent::Error {
            message: "boom".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "boom");
    }

    #[test]
    fn test_event_snapshot() {
        assert_eq!(
            ProgressEvent::Delaying(snapshot()).snapshot().map(|s| s.progress),
            Some(snapshot().progress)
        );
        assert!(ProgressEvent::Error { message: String::new() }.snapshot().is_none());
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |event: &ProgressEvent| {
            seen.push(event.clone());
            ControlFlow::Continue(())
        };
        assert!(sink.on_progress(&ProgressEvent::Waiting(snapshot())).is_continue());
        assert_eq!(seen.len(), 1);
    }
}
