//! gronkh.tv HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::headers::HeaderProfile;
use crate::api::types::{EpisodeInfo, PlaylistInfo};
use crate::config::HttpConfig;
use crate::download::MediaSource;
use crate::error::{Error, Result};
use crate::media::{parse_formats, parse_segment_list, Episode, Format, SegmentList};

/// Timeout for metadata and playlist requests.
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for a single segment request.
pub const SEGMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for preallocating a body from its Content-Length.
const MAX_PREALLOCATION: u64 = 64 << 20;

/// Client for the episode metadata API and the video CDN.
pub struct GtvApi {
    client: Client,
    api_base: String,
    headers: HeaderProfile,
}

impl GtvApi {
    /// Create a client from the HTTP configuration.
    pub fn new(http: &HttpConfig) -> Result<Self> {
        Self::with_profile(&http.api_base, HeaderProfile::from_config(http)?)
    }

    /// Create a client with an already built header profile.
    pub fn with_profile(api_base: &str, headers: HeaderProfile) -> Result<Self> {
        let client = Client::builder()
            .user_agent(headers.user_agent())
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            headers,
        })
    }

    /// Issue a GET request. Anything but `200 OK` is an error.
    async fn get(&self, url: &str, headers: &HeaderMap, timeout: Duration) -> Result<Response> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status != StatusCode::OK {
            return Err(Error::http_status(url, status.as_u16()));
        }

        Ok(response)
    }

    /// Fetch a complete response body.
    async fn get_bytes(&self, url: &str, headers: &HeaderMap, timeout: Duration) -> Result<Vec<u8>> {
        let response = self.get(url, headers, timeout).await?;

        let mut body = Vec::with_capacity(body_capacity(response.content_length()));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            body.extend_from_slice(&chunk?);
        }

        Ok(body)
    }

    /// Fetch a metadata document and decode it as JSON.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let text = self.get_text(url).await?;
        tracing::debug!("{} response length: {} bytes", what, text.len());

        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                what,
                e,
                truncate(&text, 500)
            ))
        })
    }

    /// Fetch a text document with the metadata headers.
    ///
    /// Invalid UTF-8 sequences are dropped.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let body = self
            .get_bytes(url, self.headers.metadata(), METADATA_TIMEOUT)
            .await?;
        Ok(to_valid_utf8(&body))
    }

    /// Get the raw episode information.
    pub async fn get_episode_info(&self, id: &str) -> Result<EpisodeInfo> {
        let url = format!("{}/v1/video/info?episode={}", self.api_base, id);
        self.get_json(&url, "episode info").await
    }

    /// Get the URL of the episode's master playlist.
    pub async fn get_playlist_url(&self, id: &str) -> Result<String> {
        let url = format!("{}/v1/video/playlist?episode={}", self.api_base, id);
        let info: PlaylistInfo = self.get_json(&url, "playlist info").await?;
        Ok(info.playlist_url)
    }

    /// Get an episode with its chapters and available formats.
    pub async fn get_episode(&self, id: &str) -> Result<Episode> {
        let info = self.get_episode_info(id).await?;
        let playlist_url = self.get_playlist_url(id).await?;
        let master = self.get_text(&playlist_url).await?;
        let formats = parse_formats(&playlist_url, &master)?;

        tracing::debug!(
            "Episode {}: {} chapters, {} formats",
            id,
            info.chapters.len(),
            formats.len()
        );

        Ok(Episode::from_info(id, info, formats))
    }

    /// Get the segment list of a format.
    pub async fn get_segment_list(&self, format: &Format) -> Result<SegmentList> {
        let content = self.get_text(&format.url).await?;
        parse_segment_list(&format.url, &content)
    }

    /// Get a single segment body.
    pub async fn get_segment(&self, url: &str) -> Result<Vec<u8>> {
        self.get_bytes(url, self.headers.segment(), SEGMENT_TIMEOUT)
            .await
    }
}

#[async_trait]
impl MediaSource for GtvApi {
    async fn segment_list(&self, format: &Format) -> Result<SegmentList> {
        self.get_segment_list(format).await
    }

    async fn segment(&self, url: &str) -> Result<Vec<u8>> {
        self.get_segment(url).await
    }
}

/// Decode bytes as UTF-8, dropping invalid sequences.
pub fn to_valid_utf8(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((pos, _)) => &text[..pos],
        None => text,
    }
}

/// Initial buffer size for a body of the announced length.
fn body_capacity(content_length: Option<u64>) -> usize {
    content_length.unwrap_or(0).min(MAX_PREALLOCATION) as usize
}
