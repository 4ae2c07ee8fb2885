//! Segment lists and time window cutting.

use std::time::Duration;

/// A start/stop time window. `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub start: Option<Duration>,
    pub stop: Option<Duration>,
}

impl Window {
    pub fn new(start: Option<Duration>, stop: Option<Duration>) -> Self {
        Self { start, stop }
    }

    /// Whether both sides are open.
    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.stop.is_none()
    }
}

/// Ordered segments of one format, sharing a base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentList {
    /// Common prefix for segment requests, without trailing slash.
    pub base_url: String,
    /// Segment identifiers relative to `base_url`.
    pub segments: Vec<String>,
    /// Nominal duration of one segment in seconds. Only used for windowing.
    pub segment_duration: f64,
}

impl SegmentList {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Full request URL of the segment at `index`.
    pub fn segment_url(&self, index: usize) -> Option<String> {
        self.segments
            .get(index)
            .map(|segment| format!("{}/{}", self.base_url, segment))
    }

    /// Slice the list down to the segments covering `window`.
    ///
    /// The first index is `floor(start / duration)`, the end index is
    /// `floor(stop / duration) + 1`, clamped to the list length. Windows
    /// outside the list yield an empty list.
    pub fn cut(&self, window: Window) -> SegmentList {
        if window.is_unbounded() || !(self.segment_duration > 0.0) {
            return self.clone();
        }

        let total = self.segments.len();
        let first = window.start.map_or(0, |start| self.index_at(start));
        let last = window
            .stop
            .map_or(total, |stop| self.index_at(stop).saturating_add(1).min(total));
        let first = first.min(last);

        SegmentList {
            base_url: self.base_url.clone(),
            segments: self.segments[first..last].to_vec(),
            segment_duration: self.segment_duration,
        }
    }

    fn index_at(&self, offset: Duration) -> usize {
        // float to int casts saturate
        (offset.as_secs_f64() / self.segment_duration).floor() as usize
    }
}
