//! Error types for the gtv-downloader application.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the application.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    // Input errors
    #[error("Could not parse URL {0}")]
    VideoUrl(String),

    #[error("Video category '{0}' not supported")]
    UnsupportedCategory(String),

    #[error("Format {0} is not available.")]
    FormatNotFound(String),

    #[error("Chapter {0} not found.")]
    ChapterNotFound(i64),

    // API errors
    #[error("{class} - got status code {status} while fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
        class: &'static str,
    },

    #[error("API error: {0}")]
    Api(String),

    // Playlist errors
    #[error("Playlist error: {0}")]
    Playlist(String),

    // File system errors
    #[error("File '{}' already exists. See the available options on how to proceed.", .0.display())]
    FileExists(PathBuf),

    #[error("Could not read download info file '{}', can't continue download: {reason}", .path.display())]
    ResumeStateUnreadable { path: PathBuf, reason: String },

    // Download errors
    #[error("Download failed: {0}")]
    Download(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // HTTP errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build an [`Error::HttpStatus`] for a non-200 response.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Error::HttpStatus {
            url: url.into(),
            status,
            class: status_class(status),
        }
    }

    /// Whether this error was caused by bad user input rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::VideoUrl(_)
                | Error::UnsupportedCategory(_)
                | Error::FormatNotFound(_)
                | Error::ChapterNotFound(_)
        )
    }
}

/// Human readable class of an HTTP status code.
pub fn status_class(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 | 502 | 504 => "Server Error",
        503 => "Service Unavailable",
        _ => "Request failed",
    }
}

/// Process exit codes.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const ABORTED: i32 = 1;
    pub const INPUT_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const API_ERROR: i32 = 4;
    pub const DOWNLOAD_ERROR: i32 = 5;
    pub const UNEXPECTED_ERROR: i32 = 6;
}
