//! JSON-lines output for `--json`.
//!
//! Every message is one JSON object on its own line, tagged by `type`.

use std::io::{self, Write};
use std::ops::ControlFlow;

use serde::Serialize;

use crate::download::{DownloadReport, ProgressEvent, ProgressSink};
use crate::media::{Chapter, Format};

/// A non-progress message.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage<'a> {
    Title {
        id: &'a str,
        title: &'a str,
    },
    Format {
        format: &'a str,
    },
    Info {
        message: String,
    },
    Error {
        message: String,
    },
    AvailableFormats {
        formats: &'a [Format],
    },
    AvailableChapters {
        chapters: &'a [Chapter],
    },
    Summary {
        path: String,
        segments: usize,
        bytes: u64,
        elapsed: f64,
    },
}

impl<'a> JsonMessage<'a> {
    pub fn summary(report: &DownloadReport) -> Self {
        JsonMessage::Summary {
            path: report.path.display().to_string(),
            segments: report.segments,
            bytes: report.bytes,
            elapsed: report.elapsed.as_secs_f64(),
        }
    }
}

/// Write a message to stdout.
pub fn print_json(message: &JsonMessage<'_>) {
    write_line(&mut io::stdout().lock(), message);
}

/// Writes progress events as JSON lines.
///
/// Error events are skipped; the final error is printed as a
/// [`JsonMessage::Error`] by the caller.
pub struct JsonProgress<W: Write + Send> {
    writer: W,
}

impl JsonProgress<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> JsonProgress<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> ProgressSink for JsonProgress<W> {
    fn on_progress(&mut self, event: &ProgressEvent) -> ControlFlow<()> {
        if !matches!(event, ProgressEvent::Error { .. }) {
            write_line(&mut self.writer, event);
        }
        ControlFlow::Continue(())
    }
}

fn write_line<W: Write, T: Serialize>(writer: &mut W, value: &T) {
    let result = serde_json::to_writer(&mut *writer, value)
        .map_err(io::Error::from)
        .and_then(|()| writer.write_all(b"\n"))
        .and_then(|()| writer.flush());

    if let Err(e) = result {
        tracing::warn!("Failed to write JSON output: {}", e);
    }
}
