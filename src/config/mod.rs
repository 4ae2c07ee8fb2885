//! Configuration module for gtv-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Output modes
//! - Configuration validation and timestamp parsing

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, HttpConfig, OptionsConfig, DEFAULT_CONFIG_FILE};
pub use modes::OutputMode;
pub use validation::{
    download_request, parse_timestamp, validate_config, validate_max_rate, validate_url,
};
