//! Request header profile shared by all API and segment requests.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::config::HttpConfig;
use crate::error::{Error, Result};

const METADATA_ACCEPT: &str = "application/json, text/plain, */*";
const SEGMENT_ACCEPT: &str = "*/*";

/// Immutable header sets, built once from configuration.
#[derive(Debug, Clone)]
pub struct HeaderProfile {
    user_agent: String,
    metadata: HeaderMap,
    segment: HeaderMap,
}

impl HeaderProfile {
    /// Build the metadata and segment header sets.
    pub fn from_config(http: &HttpConfig) -> Result<Self> {
        let mut base = HeaderMap::new();
        insert(&mut base, header::ACCEPT_LANGUAGE, "accept_language", &http.accept_language)?;
        insert(&mut base, header::ORIGIN, "origin", &http.origin)?;
        insert(&mut base, header::REFERER, "referer", &http.referer)?;
        base.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("empty"),
        );
        base.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("cors"),
        );
        base.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static("same-site"),
        );
        base.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        base.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        // Validated here so the client builder never sees a bad value
        HeaderValue::from_str(&http.user_agent).map_err(|e| Error::ConfigValidation {
            field: "http.user_agent".to_string(),
            message: e.to_string(),
        })?;

        let mut metadata = base.clone();
        metadata.insert(header::ACCEPT, HeaderValue::from_static(METADATA_ACCEPT));

        let mut segment = base;
        segment.insert(header::ACCEPT, HeaderValue::from_static(SEGMENT_ACCEPT));

        Ok(Self {
            user_agent: http.user_agent.clone(),
            metadata,
            segment,
        })
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Headers for metadata and playlist requests.
    pub fn metadata(&self) -> &HeaderMap {
        &self.metadata
    }

    /// Headers for segment requests.
    pub fn segment(&self) -> &HeaderMap {
        &self.segment
    }
}

fn insert(headers: &mut HeaderMap, name: HeaderName, field: &str, value: &str) -> Result<()> {
    let value = HeaderValue::from_str(value).map_err(|e| Error::ConfigValidation {
        field: format!("http.{}", field),
        message: e.to_string(),
    })?;
    headers.insert(name, value);
    Ok(())
}
