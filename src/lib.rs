//! tubescript - fetch synchronized caption transcripts from YouTube videos
//!
//! This library resolves a video URL or identifier, discovers the caption tracks
//! embedded in the watch page, negotiates a content format that actually yields
//! data, and normalizes the timed segments into prose or paragraphs.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod normalizer;
pub mod output;
pub mod parsers;
pub mod transcript;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{CaptionTrack, FetchCandidate};
pub use normalizer::FormattingOptions;
pub use transcript::{TimedSegment, TranscriptFetcher, TranscriptResult};
pub use transport::{HttpTransport, ReqwestTransport, RetryPolicy};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, TranscriptError>;

/// Classified failures surfaced to callers
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid video ID or URL: {0}")]
    InvalidInput(String),

    #[error("Video {0} is unavailable")]
    VideoUnavailable(String),

    #[error("No transcript data found for video {0}")]
    NoTranscriptData(String),

    #[error(
        "Language '{requested}' is not available; available languages: {}",
        .available.join(", ")
    )]
    LanguageNotAvailable {
        requested: String,
        available: Vec<String>,
    },

    #[error(
        "YouTube is rate limiting requests ({0}). Wait a while before retrying, \
         switch to a different network or IP address, or route traffic through a VPN."
    )]
    RateLimited(String),

    #[error("Failed to parse transcript payload: {0}")]
    ParseError(String),

    #[error(
        "No usable transcript for video {video_id} (tried formats: {}); last payload: {snippet:?}",
        .tried_formats.join(", ")
    )]
    NoUsableTranscript {
        video_id: String,
        tried_formats: Vec<String>,
        snippet: String,
    },

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Failed to fetch transcript: {0}")]
    FetchFailed(String),
}

impl TranscriptError {
    /// Whether the transport layer may retry after this failure
    pub fn is_retryable(&self) -> bool {
        matches!(self, TranscriptError::NetworkFailure(_))
    }
}

/// Request shape accepted from the host orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptRequest {
    pub video_id_or_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// Fetch a transcript with the default HTTP stack
pub async fn fetch_transcript(request: &TranscriptRequest) -> Result<TranscriptResult> {
    let fetcher = TranscriptFetcher::new()?;
    fetcher
        .fetch_transcript(&request.video_id_or_url, request.lang.as_deref())
        .await
}
