//! API response type definitions.

use serde::Deserialize;

/// Episode information from the `video/info` endpoint.
///
/// Every field is optional on the wire; missing values decode to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EpisodeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<RawChapter>,
    /// Stream length in seconds.
    #[serde(default)]
    pub source_length: Option<f64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<RawTag>,
}

/// Chapter as delivered by the API. Order and index are not trusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawChapter {
    #[serde(default)]
    pub title: String,
    /// Offset from stream start in seconds.
    #[serde(default)]
    pub offset: f64,
}

/// Episode tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTag {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
}

/// Response of the `video/playlist` endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistInfo {
    pub playlist_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_info_defaults() {
        let info: EpisodeInfo = serde_json::from_str(r#"{"title": "Stream"}"#).unwrap();
        assert_eq!(info.title, "Stream");
        assert!(info.chapters.is_empty());
        assert!(info.source_length.is_none());
    }

    #[test]
    fn test_episode_info_full() {
        let json = r#"{
            "title": "Stream 774",
            "source_length": 7200,
            "views": 1234,
            "created_at": "2023-10-01T18:00:00Z",
            "tags": [{"id": 1, "title": "Horror"}],
            "chapters": [{"id": 9, "title": "Intro", "offset": 0}]
        }"#;
        let info: EpisodeInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.source_length, Some(7200.0));
        assert_eq!(info.views, Some(1234));
        assert_eq!(info.tags[0].title, "Horror");
        assert_eq!(info.chapters[0].title, "Intro");
    }
}
