//! Output mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How progress and messages are written to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Human readable text with a progress bar (default).
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputMode::Text => write!(f, "text"),
            OutputMode::Json => write!(f, "json"),
        }
    }
}
