//! gtv-downloader - download stream episodes from gronkh.tv
//!
//! This library provides functionality for downloading stream episodes and
//! single chapters as MPEG-TS files.
//!
//! # Features
//!
//! - Episode metadata, chapters and formats from the gronkh.tv API
//! - Chapter and start/stop time windows
//! - Resumable downloads via a checkpoint file next to the output
//! - Client-side rate limiting that mimics a buffering video player
//! - Progress as a progress bar or JSON lines
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use gtv_downloader::{parse_video_url, Config, DownloadRequest, Downloader, GtvApi, NullSink};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_or_default(Path::new("gtv-downloader.toml"))?;
//!     let api = GtvApi::new(&config.http)?;
//!
//!     let video = parse_video_url("https://gronkh.tv/streams/777")?;
//!     let episode = api.get_episode(&video.id).await?;
//!
//!     let downloader = Downloader::new(&api, CancellationToken::new());
//!     downloader
//!         .download(&episode, &DownloadRequest::default(), &mut NullSink)
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{parse_video_url, GtvApi};
pub use config::{Config, OutputMode};
pub use download::{
    DownloadOutcome, DownloadRequest, Downloader, MediaSource, NullSink, ProgressEvent,
    ProgressSink,
};
pub use error::{Error, Result};
pub use media::{Chapter, Episode, Format};
