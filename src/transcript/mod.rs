use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod metadata;

use crate::config::Config;
use crate::extractors::{negotiate_candidates, resolve_video_id, CaptionTrack, YoutubeExtractor};
use crate::parsers::parse_payload;
use crate::transport::{fetch_with_retry, FetchRequest, HttpTransport, ReqwestTransport, RetryPolicy};
use crate::{Result, TranscriptError};

/// Characters of the last payload kept for diagnostics
const SNIPPET_LEN: usize = 200;

/// One timed caption utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedSegment {
    /// Decoded plain text, never blank
    pub text: String,

    /// Language of the track the segment came from
    pub language_code: Option<String>,

    /// Offset from the start of the video
    pub start_seconds: f64,

    pub duration_seconds: f64,
}

impl TimedSegment {
    pub fn new(
        text: impl Into<String>,
        language_code: Option<String>,
        start_seconds: f64,
        duration_seconds: f64,
    ) -> Self {
        Self {
            text: text.into(),
            language_code,
            start_seconds,
            duration_seconds,
        }
    }

    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }
}

/// Transcript with metadata, as returned to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptResult {
    pub video_id: String,

    /// Video title, or a placeholder when metadata was unavailable
    pub title: String,

    /// Language of the selected caption track
    pub language_code: Option<String>,

    /// Non-empty, ordered by start time
    pub segments: Vec<TimedSegment>,

    /// When the transcript was retrieved
    pub fetched_at: DateTime<Utc>,
}

/// Segments retrieved for one caption track
struct TrackContent {
    language_code: String,
    segments: Vec<TimedSegment>,
}

/// End-to-end transcript retrieval
pub struct TranscriptFetcher {
    transport: Arc<dyn HttpTransport>,
    extractor: YoutubeExtractor,
    retry: RetryPolicy,
}

impl TranscriptFetcher {
    /// Create a fetcher with the default HTTP stack
    pub fn new() -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_transport(transport, RetryPolicy::default()))
    }

    /// Create a fetcher honouring the HTTP settings in `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::from_config(&config.http)?);
        Ok(Self::with_transport(transport, RetryPolicy::from_config(&config.http)))
    }

    pub fn with_transport(transport: Arc<dyn HttpTransport>, retry: RetryPolicy) -> Self {
        Self {
            extractor: YoutubeExtractor::new(Arc::clone(&transport), retry),
            transport,
            retry,
        }
    }

    /// Fetch the transcript and title for a video URL or ID
    pub async fn fetch_transcript(&self, input: &str, language: Option<&str>) -> Result<TranscriptResult> {
        let video_id = resolve_video_id(input)?;
        tracing::info!("Fetching transcript for {}", video_id);

        let (content, title) = tokio::join!(
            self.fetch_content(&video_id, language),
            metadata::fetch_title(self.transport.as_ref(), &video_id),
        );
        let TrackContent {
            language_code,
            mut segments,
        } = content?;

        crate::parsers::sort_by_start(&mut segments);
        tracing::info!("Retrieved {} segments for {}", segments.len(), video_id);

        Ok(TranscriptResult {
            video_id,
            title,
            language_code: Some(language_code),
            segments,
            fetched_at: Utc::now(),
        })
    }

    /// List the caption tracks a video advertises
    pub async fn list_tracks(&self, input: &str) -> Result<Vec<CaptionTrack>> {
        let video_id = resolve_video_id(input)?;
        self.extractor.list_tracks(&video_id, None).await
    }

    async fn fetch_content(&self, video_id: &str, language: Option<&str>) -> Result<TrackContent> {
        let track = self.extractor.discover_track(video_id, language).await?;
        let candidates = negotiate_candidates(&track.content_url)?;

        let mut tried_formats = Vec::with_capacity(candidates.len());
        let mut last_payload = String::new();

        for candidate in candidates {
            tracing::debug!("Trying {} format for {}", candidate.format_tag, video_id);
            tried_formats.push(candidate.format_tag.clone());

            let request = FetchRequest::new(&candidate.url).with_language(language);
            let payload = match fetch_with_retry(self.transport.as_ref(), &request, &self.retry).await {
                Ok(payload) => payload,
                Err(TranscriptError::NetworkFailure(message)) => {
                    tracing::warn!("{} format failed for {}: {}", candidate.format_tag, video_id, message);
                    last_payload = format!("{}: {}", candidate.format_tag, message);
                    continue;
                }
                Err(e) => return Err(e),
            };
            let segments = parse_payload(&payload, Some(&track.language_code))?;

            if !segments.is_empty() {
                tracing::debug!(
                    "{} format yielded {} segments",
                    candidate.format_tag,
                    segments.len()
                );
                return Ok(TrackContent {
                    language_code: track.language_code,
                    segments,
                });
            }
            last_payload = payload;
        }

        Err(TranscriptError::NoUsableTranscript {
            video_id: video_id.to_string(),
            tried_formats,
            snippet: last_payload.chars().take(SNIPPET_LEN).collect(),
        })
    }
}
