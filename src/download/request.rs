//! Parameters of a single download.

use std::path::PathBuf;
use std::time::Duration;

use crate::download::throttle::ThrottleSettings;
use crate::media::AUTO_FORMAT;

/// Default rate ceiling, 10 MB/s.
pub const DEFAULT_RATE_LIMIT: f64 = 10_000_000.0;

/// Default upper bound of the pause between retries.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Everything the engine needs to know about what to download and how.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub format: String,
    /// Explicit destination. Falls back to the proposed filename.
    pub output: Option<PathBuf>,
    pub start: Option<Duration>,
    pub stop: Option<Duration>,
    /// 1-based chapter number, `<= 0` for none.
    pub chapter: i64,
    pub overwrite: bool,
    pub continue_download: bool,
    /// Rate ceiling in bytes per second.
    pub rate_limit: f64,
    /// Upper bound of the randomized pause between retries.
    pub retry_delay: Duration,
    pub throttle: ThrottleSettings,
}

impl Default for DownloadRequest {
    fn default() -> Self {
        Self {
            format: AUTO_FORMAT.to_string(),
            output: None,
            start: None,
            stop: None,
            chapter: 0,
            overwrite: false,
            continue_download: false,
            rate_limit: DEFAULT_RATE_LIMIT,
            retry_delay: DEFAULT_RETRY_DELAY,
            throttle: ThrottleSettings::default(),
        }
    }
}
