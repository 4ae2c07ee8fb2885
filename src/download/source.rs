//! Where segment data comes from.

use async_trait::async_trait;

use crate::error::Result;
use crate::media::{Format, SegmentList};

/// Source of segment lists and segment payloads.
///
/// Implemented by the HTTP client; tests substitute an in-memory source.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Fetch and parse the media playlist of `format`.
    async fn segment_list(&self, format: &Format) -> Result<SegmentList>;

    /// Fetch one segment body. The body is returned only if fully received.
    async fn segment(&self, url: &str) -> Result<Vec<u8>>;
}
