use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

use super::CaptionTrack;
use crate::transport::{fetch_with_retry, rate_limit, FetchRequest, HttpTransport, RetryPolicy};
use crate::{Result, TranscriptError};

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const YOUTUBE_ORIGIN: &str = "https://www.youtube.com";

/// Field marker the primary strategy splits on
const CAPTIONS_MARKER: &str = "\"captions\":";

/// Field that follows the captions object in the player response
const CAPTIONS_BOUNDARY: &str = ",\"videoDetails";

/// Present on every page that carries a player, even one without captions
const PLAYABILITY_MARKER: &str = "\"playabilityStatus\":";

/// Bytes after the renderer marker handed to the JSON parser
const RENDERER_WINDOW: usize = 256 * 1024;

static RENDERER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""playerCaptionsTracklistRenderer"\s*:\s*"#).unwrap());

/// Pure manifest extraction strategy over the watch page HTML
type ManifestStrategy = fn(&str) -> Option<Vec<CaptionTrack>>;

/// Strategies in the order they are tried
const STRATEGIES: &[(&str, ManifestStrategy)] = &[
    ("captions-split", extract_from_captions_field),
    ("renderer-regex", extract_from_renderer),
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionsJson {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    base_url: Option<String>,
    language_code: Option<String>,
    kind: Option<String>,
    name: Option<TrackName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackName {
    simple_text: Option<String>,
    #[serde(default)]
    runs: Vec<TextRun>,
}

#[derive(Debug, Deserialize)]
struct TextRun {
    text: String,
}

impl TrackName {
    fn text(self) -> Option<String> {
        self.simple_text.or_else(|| {
            let joined: String = self.runs.into_iter().map(|run| run.text).collect();
            (!joined.is_empty()).then_some(joined)
        })
    }
}

impl RawTrack {
    fn into_track(self) -> Option<CaptionTrack> {
        let base_url = self.base_url?;
        let language_code = self.language_code?;
        let content_url = if base_url.starts_with('/') {
            format!("{}{}", YOUTUBE_ORIGIN, base_url)
        } else {
            base_url
        };

        Some(CaptionTrack {
            language_code,
            content_url,
            name: self.name.and_then(TrackName::text),
            is_generated: self.kind.as_deref() == Some("asr"),
        })
    }
}

fn tracks_from_renderer(renderer: TracklistRenderer) -> Option<Vec<CaptionTrack>> {
    let tracks: Vec<CaptionTrack> = renderer
        .caption_tracks
        .into_iter()
        .filter_map(RawTrack::into_track)
        .collect();
    (!tracks.is_empty()).then_some(tracks)
}

/// Split on the `"captions":` field and parse up to the next known field
fn extract_from_captions_field(html: &str) -> Option<Vec<CaptionTrack>> {
    let (_, after) = html.split_once(CAPTIONS_MARKER)?;
    let json = after.split(CAPTIONS_BOUNDARY).next()?;
    let captions: CaptionsJson = serde_json::from_str(json.trim()).ok()?;
    tracks_from_renderer(captions.player_captions_tracklist_renderer?)
}

/// Locate the renderer object directly and parse the first JSON value after it
fn extract_from_renderer(html: &str) -> Option<Vec<CaptionTrack>> {
    let found = RENDERER_PATTERN.find(html)?;
    let rest = &html[found.end()..];

    let mut end = rest.len().min(RENDERER_WINDOW);
    while !rest.is_char_boundary(end) {
        end -= 1;
    }

    let renderer = serde_json::Deserializer::from_str(&rest[..end])
        .into_iter::<TracklistRenderer>()
        .next()?
        .ok()?;
    tracks_from_renderer(renderer)
}

/// Run the extraction strategies in order
pub fn extract_caption_tracks(html: &str) -> Option<Vec<CaptionTrack>> {
    STRATEGIES.iter().find_map(|(name, strategy)| {
        let tracks = strategy(html)?;
        tracing::debug!("Found {} caption tracks via {}", tracks.len(), name);
        Some(tracks)
    })
}

/// Pick the track for `language`, or the first listed track when none was requested
pub fn select_track(tracks: Vec<CaptionTrack>, language: Option<&str>) -> Result<CaptionTrack> {
    let Some(requested) = language else {
        return tracks.into_iter().next().ok_or_else(|| {
            TranscriptError::LanguageNotAvailable {
                requested: "default".to_string(),
                available: Vec::new(),
            }
        });
    };

    let available: Vec<String> = tracks.iter().map(|t| t.language_code.clone()).collect();
    tracks
        .into_iter()
        .find(|track| track.language_code == requested)
        .ok_or_else(|| TranscriptError::LanguageNotAvailable {
            requested: requested.to_string(),
            available,
        })
}

/// Caption track discovery from the watch page
pub struct YoutubeExtractor {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl YoutubeExtractor {
    pub fn new(transport: Arc<dyn HttpTransport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// Fetch the watch page, failing fast on rate-limit interstitials
    pub async fn fetch_watch_page(&self, video_id: &str, language: Option<&str>) -> Result<String> {
        let request = FetchRequest::new(format!("{}{}", WATCH_URL, video_id)).with_language(language);
        let html = fetch_with_retry(self.transport.as_ref(), &request, &self.retry).await?;
        rate_limit::ensure_not_rate_limited(&html, &format!("watch page for {}", video_id))?;
        Ok(html)
    }

    /// Every caption track advertised for `video_id`, in page order
    pub async fn list_tracks(&self, video_id: &str, language: Option<&str>) -> Result<Vec<CaptionTrack>> {
        let html = self.fetch_watch_page(video_id, language).await?;

        match extract_caption_tracks(&html) {
            Some(tracks) => Ok(tracks),
            None if !html.contains(PLAYABILITY_MARKER) => {
                Err(TranscriptError::VideoUnavailable(video_id.to_string()))
            }
            None => Err(TranscriptError::NoTranscriptData(video_id.to_string())),
        }
    }

    /// Discover tracks and select the one matching `language`
    pub async fn discover_track(&self, video_id: &str, language: Option<&str>) -> Result<CaptionTrack> {
        let tracks = self.list_tracks(video_id, language).await?;
        let track = select_track(tracks, language)?;
        tracing::info!(
            "Selected {} caption track{} for {}",
            track.language_code,
            if track.is_generated { " (auto-generated)" } else { "" },
            video_id
        );
        Ok(track)
    }
}
