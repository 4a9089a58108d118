//! Video title lookup through the public oEmbed endpoint.

use serde::Deserialize;

use crate::transport::{FetchRequest, HttpTransport};
use crate::{Result, TranscriptError};

const OEMBED_URL: &str = "https://www.youtube.com/oembed";

/// Title used when the metadata lookup fails
pub const PLACEHOLDER_TITLE: &str = "Untitled video";

#[derive(Debug, Deserialize)]
struct OEmbedResponse {
    title: Option<String>,
}

pub fn oembed_url(video_id: &str) -> String {
    let watch_url = format!("{}{}", crate::extractors::youtube::WATCH_URL, video_id);
    format!("{}?url={}&format=json", OEMBED_URL, urlencoding::encode(&watch_url))
}

/// Single attempt; the title is not worth the retry budget
pub async fn lookup_title(transport: &dyn HttpTransport, video_id: &str) -> Result<String> {
    let body = transport.get(FetchRequest::new(oembed_url(video_id))).await?;
    let response: OEmbedResponse = serde_json::from_str(&body)
        .map_err(|e| TranscriptError::ParseError(format!("invalid oEmbed response: {}", e)))?;

    response
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .ok_or_else(|| TranscriptError::FetchFailed("oEmbed response has no title".to_string()))
}

/// Title for `video_id`, or [`PLACEHOLDER_TITLE`] on any failure
pub async fn fetch_title(transport: &dyn HttpTransport, video_id: &str) -> String {
    match lookup_title(transport, video_id).await {
        Ok(title) => title,
        Err(err) => {
            tracing::warn!("Could not fetch title for {}: {}", video_id, err);
            PLACEHOLDER_TITLE.to_string()
        }
    }
}
