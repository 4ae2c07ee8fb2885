//! Download module.
//!
//! This module provides:
//! - The sequential segment download engine
//! - Progress events and sinks
//! - Rate limiting
//! - Interrupt handling
//! - Download state tracking

pub mod engine;
pub mod interrupt;
pub mod progress;
pub mod request;
pub mod source;
pub mod state;
pub mod throttle;

pub use engine::{DownloadOutcome, DownloadReport, Downloader, MAX_RETRIES};
pub use interrupt::spawn_interrupt_listener;
pub use progress::{NullSink, ProgressEvent, ProgressSink, ProgressSnapshot};
pub use request::DownloadRequest;
pub use source::MediaSource;
pub use state::DownloadState;
pub use throttle::{Pause, Throttle, ThrottleSettings, RATELIMIT_DELAY, RATELIMIT_DELAY_AFTER};
