//! Resolution of free-form user input into an 11-character video ID.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::{Result, TranscriptError};

const VIDEO_ID_LEN: usize = 11;

/// Path prefixes on the main domain that are followed by the video ID
const ID_PATH_PREFIXES: &[&str] = &["shorts", "embed", "live", "v"];

static FALLBACK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:youtube(?:-nocookie)?\.com/(?:watch\?(?:.*&)?v=|embed/|v/|shorts/|live/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    )
    .unwrap()
});

/// True for exactly 11 characters of `[A-Za-z0-9_-]`
pub fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Resolve a bare ID or any of the common YouTube URL shapes to a video ID
pub fn resolve_video_id(input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TranscriptError::InvalidInput("input is empty".to_string()));
    }

    if is_video_id(input) {
        return Ok(input.to_string());
    }

    if let Some(id) = parse_as_url(input).and_then(|url| id_from_url(&url)) {
        return Ok(id);
    }

    FALLBACK_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            TranscriptError::InvalidInput(format!(
                "{} (expected an 11-character video ID or a YouTube URL)",
                input
            ))
        })
}

fn parse_as_url(input: &str) -> Option<Url> {
    if input.starts_with("http://") || input.starts_with("https://") {
        return Url::parse(input).ok();
    }
    if input.contains("youtube.com") || input.contains("youtu.be") {
        return Url::parse(&format!("https://{}", input)).ok();
    }
    None
}

fn id_from_url(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    let id: Option<String> = if host == "youtu.be" || host.ends_with(".youtu.be") {
        url.path_segments()?.next().map(str::to_string)
    } else if host.contains("youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .or_else(|| {
                let mut segments = url.path_segments()?;
                let prefix = segments.next()?;
                let id = segments.next()?;
                ID_PATH_PREFIXES.contains(&prefix).then(|| id.to_string())
            })
    } else {
        None
    };

    id.filter(|id| is_video_id(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_bare_id() {
        assert_eq!(resolve_video_id(ID).unwrap(), ID);
        assert_eq!(resolve_video_id("  dQw4w9WgXcQ \n").unwrap(), ID);
        assert_eq!(resolve_video_id("_NuH3D4SN-c").unwrap(), "_NuH3D4SN-c");
    }

    #[test]
    fn test_short_link() {
        assert_eq!(resolve_video_id("https://youtu.be/dQw4w9WgXcQ").unwrap(), ID);
        assert_eq!(resolve_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc&t=42").unwrap(), ID);
        assert_eq!(resolve_video_id("youtu.be/dQw4w9WgXcQ").unwrap(), ID);
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(resolve_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), ID);
        assert_eq!(
            resolve_video_id("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120").unwrap(),
            ID
        );
        assert_eq!(resolve_video_id("www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(), ID);
    }

    #[test]
    fn test_path_urls() {
        assert_eq!(resolve_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ").unwrap(), ID);
        assert_eq!(resolve_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ?start=5").unwrap(), ID);
        assert_eq!(resolve_video_id("https://www.youtube.com/live/dQw4w9WgXcQ").unwrap(), ID);
    }

    #[test]
    fn test_regex_fallback() {
        assert_eq!(
            resolve_video_id("https://www.youtube-nocookie.com/embed/dQw4w9WgXcQ").unwrap(),
            ID
        );
        assert_eq!(
            resolve_video_id("<iframe src=\"//www.youtube.com/embed/dQw4w9WgXcQ\"></iframe>").unwrap(),
            ID
        );
    }

    #[test]
    fn test_invalid_input() {
        for input in ["", "   ", "not-a-valid-id", "https://example.com/watch?v=dQw4w9WgXcQ", "https://www.youtube.com/watch?v=short"] {
            assert!(
                matches!(resolve_video_id(input), Err(TranscriptError::InvalidInput(_))),
                "input: {:?}",
                input
            );
        }
    }
}
