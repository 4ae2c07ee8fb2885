//! gronkh.tv API module.
//!
//! This module provides:
//! - Video URL parsing
//! - Request header profiles
//! - HTTP client for the metadata API and video CDN
//! - API response types

pub mod client;
pub mod headers;
pub mod identity;
pub mod types;

pub use client::{GtvApi, METADATA_TIMEOUT, SEGMENT_TIMEOUT};
pub use headers::HeaderProfile;
pub use identity::{parse_video_url, VideoRef, SUPPORTED_CLASS};
pub use types::*;
