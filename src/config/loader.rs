//! Configuration structures and loading logic.

use crate::config::modes::OutputMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "gtv-downloader.toml";

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Base URL of the metadata API.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header value.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Origin header value.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Referer header value.
    #[serde(default = "default_referer")]
    pub referer: String,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// URL of the video to download.
    #[serde(default)]
    pub url: Option<String>,

    /// Format name, or `auto` for the first listed format.
    #[serde(default = "default_format")]
    pub format: String,

    /// Output file. Proposed from the episode metadata when unset.
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Start timestamp, e.g. `12m34s`.
    #[serde(default)]
    pub start: Option<String>,

    /// Stop timestamp, e.g. `1h23m45s`.
    #[serde(default)]
    pub stop: Option<String>,

    /// 1-based chapter number, 0 downloads the complete stream.
    #[serde(default)]
    pub chapter: i64,

    /// Overwrite the output file if it already exists.
    #[serde(default)]
    pub overwrite: bool,

    /// Continue a previously interrupted download.
    #[serde(default)]
    pub continue_download: bool,

    /// Maximum download rate in MB/s.
    #[serde(default = "default_max_rate")]
    pub max_rate: f64,

    /// Terminal output format.
    #[serde(default)]
    pub output_mode: OutputMode,

    /// Upper bound of the random pause between retries of a segment.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            origin: default_origin(),
            referer: default_referer(),
        }
    }
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            url: None,
            format: default_format(),
            output_file: None,
            start: None,
            stop: None,
            chapter: 0,
            overwrite: false,
            continue_download: false,
            max_rate: default_max_rate(),
            output_mode: OutputMode::default(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.gronkh.tv".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/119.0".to_string()
}

fn default_accept_language() -> String {
    "de,en-US;q=0.7,en;q=0.3".to_string()
}

fn default_origin() -> String {
    "https://gronkh.tv".to_string()
}

fn default_referer() -> String {
    "https://gronkh.tv/".to_string()
}

fn default_format() -> String {
    "auto".to_string()
}

fn default_max_rate() -> f64 {
    10.0
}

fn default_retry_delay_ms() -> u64 {
    500
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the configuration file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(
                "No configuration file at {}, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Rate ceiling in bytes per second.
    pub fn rate_limit(&self) -> f64 {
        self.options.max_rate * 1_000_000.0
    }
}
