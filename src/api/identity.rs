//! Video URL parsing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

/// The only video class this tool can download.
pub const SUPPORTED_CLASS: &str = "streams";

static VIDEO_URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"gronkh\.tv/([a-z]+)/([0-9]+)").expect("video url pattern is valid"));

/// A video reference extracted from a user supplied URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    /// Video class, e.g. `streams`.
    pub class: String,
    /// Numeric episode id, kept as text.
    pub id: String,
}

/// Extract the video class and id from a URL, rejecting unsupported classes.
///
/// Pattern: `https://gronkh.tv/streams/774`
pub fn parse_video_url(url: &str) -> Result<VideoRef> {
    let captures = VIDEO_URL_PATTERN
        .captures(url)
        .ok_or_else(|| Error::VideoUrl(url.to_string()))?;

    let video = VideoRef {
        class: captures[1].to_string(),
        id: captures[2].to_string(),
    };

    if video.class != SUPPORTED_CLASS {
        return Err(Error::UnsupportedCategory(video.class));
    }

    Ok(video)
}
