//! M3U8 playlist parsing.

use m3u8_rs::{Playlist, QuotedOrUnquoted, VariantStream};

use crate::error::{Error, Result};
use crate::media::episode::Format;
use crate::media::segments::SegmentList;

/// Name used when the playlist is a media playlist without variants.
const SINGLE_FORMAT_NAME: &str = "source";

/// Parse the master playlist into the list of available formats.
///
/// Variant order is preserved; the first variant is the best one.
pub fn parse_formats(master_url: &str, content: &str) -> Result<Vec<Format>> {
    let playlist = m3u8_rs::parse_playlist_res(content.as_bytes())
        .map_err(|e| Error::Playlist(format!("Failed to parse playlist: {:?}", e)))?;

    match playlist {
        Playlist::MasterPlaylist(master) => master
            .variants
            .iter()
            .filter(|variant| !variant.is_i_frame)
            .map(|variant| {
                Ok(Format {
                    name: variant_name(variant),
                    url: resolve_url(master_url, &variant.uri)?,
                })
            })
            .collect(),
        Playlist::MediaPlaylist(_) => Ok(vec![Format {
            name: SINGLE_FORMAT_NAME.to_string(),
            url: master_url.to_string(),
        }]),
    }
}

/// Parse a format's media playlist into its segment list.
pub fn parse_segment_list(format_url: &str, content: &str) -> Result<SegmentList> {
    let base_url = format_url
        .rfind('/')
        .map(|pos| format_url[..pos].to_string())
        .ok_or_else(|| Error::Playlist(format!("Invalid playlist URL: {}", format_url)))?;

    let playlist = m3u8_rs::parse_playlist_res(content.as_bytes())
        .map_err(|e| Error::Playlist(format!("Failed to parse media playlist: {:?}", e)))?;

    let media = match playlist {
        Playlist::MediaPlaylist(media) => media,
        Playlist::MasterPlaylist(_) => {
            return Err(Error::Playlist("Expected media playlist".into()));
        }
    };

    let mut segment_duration = media.target_duration as f64;
    if segment_duration <= 0.0 {
        segment_duration = media
            .segments
            .first()
            .map_or(0.0, |segment| segment.duration as f64);
    }

    Ok(SegmentList {
        base_url,
        segments: media.segments.iter().map(|s| s.uri.clone()).collect(),
        segment_duration,
    })
}

/// Display name of a variant: `NAME` attribute, else height, else bandwidth.
fn variant_name(variant: &VariantStream) -> String {
    let name = variant
        .other_attributes
        .as_ref()
        .and_then(|attributes| attributes.get("NAME"));

    match name {
        Some(QuotedOrUnquoted::Quoted(name)) | Some(QuotedOrUnquoted::Unquoted(name)) => {
            name.clone()
        }
        None => match &variant.resolution {
            Some(resolution) => format!("{}p", resolution.height),
            None => variant.bandwidth.to_string(),
        },
    }
}

/// Resolve a potentially relative URL against a base URL.
fn resolve_url(base: &str, path: &str) -> Result<String> {
    if path.starts_with("http://") || path.starts_with("https://") {
        return Ok(path.to_string());
    }

    let base_url = url::Url::parse(base)?;
    let resolved = base_url.join(path)?;
    Ok(resolved.to_string())
}
