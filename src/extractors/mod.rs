use serde::{Deserialize, Serialize};

pub mod candidates;
pub mod identifier;
pub mod youtube;

pub use candidates::negotiate_candidates;
pub use identifier::resolve_video_id;
pub use youtube::YoutubeExtractor;

/// A caption track advertised by the watch page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionTrack {
    /// Language tag such as `en` or `pt-BR`
    pub language_code: String,

    /// Timedtext URL; its `fmt` parameter selects the payload format
    pub content_url: String,

    /// Display name shown by the player, e.g. "English (auto-generated)"
    pub name: Option<String>,

    /// Speech-recognition track rather than uploaded captions
    pub is_generated: bool,
}

/// One format variant of a track's content URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCandidate {
    pub url: String,
    pub format_tag: String,
}
