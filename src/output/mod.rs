//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bar and JSON-lines progress sinks
//! - Chapter/format listings and download statistics

pub mod console;
pub mod json;
pub mod progress;
pub mod stats;

pub use console::{
    print_error, print_format, print_info, print_title, print_warning,
};
pub use json::{print_json, JsonMessage, JsonProgress};
pub use progress::ConsoleProgress;
pub use stats::{
    format_bytes, format_rate, format_timestamp, print_chapters, print_download_summary,
    print_episode_info, print_formats,
};
