//! Episode model.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::api::types::EpisodeInfo;
use crate::error::{Error, Result};
use crate::fs::sanitize_filename;
use crate::media::segments::Window;

/// Format name that selects the first listed format.
pub const AUTO_FORMAT: &str = "auto";

/// A chapter marker inside an episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chapter {
    /// Zero-based position after sorting by offset.
    pub index: usize,
    pub title: String,
    /// Offset from stream start.
    #[serde(serialize_with = "serialize_secs")]
    pub offset: Duration,
}

impl Chapter {
    /// 1-based chapter number as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }
}

/// A video quality variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Format {
    #[serde(rename = "format")]
    pub name: String,
    /// URL of the format's media playlist.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub title: String,
}

/// A stream episode with its chapters and formats.
#[derive(Debug, Clone, PartialEq)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub chapters: Vec<Chapter>,
    pub formats: Vec<Format>,
    pub length: Duration,
    pub views: u64,
    pub created_at: Option<String>,
    pub tags: Vec<Tag>,
}

impl Episode {
    /// Build an episode from decoded API data.
    ///
    /// Chapters are sorted by offset and re-indexed; offsets arrive in seconds.
    pub fn from_info(id: impl Into<String>, info: EpisodeInfo, formats: Vec<Format>) -> Self {
        let mut raw_chapters = info.chapters;
        raw_chapters.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let chapters = raw_chapters
            .into_iter()
            .enumerate()
            .map(|(index, chapter)| Chapter {
                index,
                title: chapter.title,
                offset: secs_to_duration(chapter.offset),
            })
            .collect();

        let tags = info
            .tags
            .into_iter()
            .map(|tag| Tag {
                id: tag.id,
                title: tag.title,
            })
            .collect();

        Self {
            id: id.into(),
            title: info.title,
            chapters,
            formats,
            length: secs_to_duration(info.source_length.unwrap_or(0.0)),
            views: info.views.unwrap_or(0),
            created_at: info.created_at,
            tags,
        }
    }

    /// Find a format by name. `auto` resolves to the first format.
    pub fn format_by_name(&self, name: &str) -> Result<&Format> {
        if name == AUTO_FORMAT {
            // The metadata source lists the best format first
            return self
                .formats
                .first()
                .ok_or_else(|| Error::FormatNotFound(name.to_string()));
        }

        self.formats
            .iter()
            .find(|format| format.name == name)
            .ok_or_else(|| Error::FormatNotFound(name.to_string()))
    }

    /// Find a chapter by its 1-based number. Numbers `<= 0` select no chapter.
    pub fn chapter_by_number(&self, number: i64) -> Result<Option<&Chapter>> {
        if number <= 0 {
            return Ok(None);
        }

        usize::try_from(number - 1)
            .ok()
            .and_then(|index| self.chapters.get(index))
            .map(Some)
            .ok_or(Error::ChapterNotFound(number))
    }

    /// Propose an output filename for the episode or one of its chapters.
    pub fn propose_filename(&self, chapter: Option<&Chapter>) -> String {
        if let Some(chapter) = chapter.and_then(|c| self.chapters.get(c.index)) {
            return format!(
                "GTV{:0>4} - {}. {}.ts",
                self.id,
                chapter.number(),
                sanitize_filename(&chapter.title)
            );
        }

        let title = sanitize_filename(&self.title);
        if title.is_empty() {
            format!("GTV{:0>4}.ts", self.id)
        } else {
            format!("{}.ts", title)
        }
    }

    /// Resolve the download window, defaulting open sides to the chapter bounds.
    pub fn window(
        &self,
        chapter: Option<&Chapter>,
        start: Option<Duration>,
        stop: Option<Duration>,
    ) -> Window {
        let mut window = Window::new(start, stop);

        if let Some(chapter) = chapter {
            if window.start.is_none() {
                window.start = Some(chapter.offset);
            }
            if window.stop.is_none() {
                // next chapter is stop
                window.stop = self.chapters.get(chapter.index + 1).map(|next| next.offset);
            }
        }

        window
    }

    /// Parsed creation timestamp, if the API delivered a valid one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

fn secs_to_duration(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

fn serialize_secs<S: Serializer>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}
