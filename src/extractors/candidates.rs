//! Derivation of the ordered format variants tried for one caption track.
//!
//! YouTube does not honour every `fmt` value for every track or region, so
//! instead of guessing, the original URL is tried first and then a fixed
//! priority list of alternates.

use url::Url;

use super::FetchCandidate;
use crate::{Result, TranscriptError};

/// Query parameter selecting the payload format
pub const FORMAT_PARAM: &str = "fmt";

/// Tag used when the URL carries no `fmt` parameter
pub const AUTO_FORMAT: &str = "auto";

/// Alternate formats in the order they are attempted
pub const ALTERNATE_FORMATS: &[&str] = &["srv3", "json3", "srv1"];

/// Current format tag of `url`, or [`AUTO_FORMAT`]
pub fn format_tag(url: &Url) -> String {
    url.query_pairs()
        .find(|(key, _)| key == FORMAT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| AUTO_FORMAT.to_string())
}

/// Copy of `url` with only the `fmt` parameter replaced (or appended)
pub fn with_format(url: &Url, format: &str) -> Url {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    match pairs.iter_mut().find(|(key, _)| key == FORMAT_PARAM) {
        Some(pair) => pair.1 = format.to_string(),
        None => pairs.push((FORMAT_PARAM.to_string(), format.to_string())),
    }

    let mut rewritten = url.clone();
    rewritten.query_pairs_mut().clear().extend_pairs(pairs);
    rewritten
}

/// Ordered, de-duplicated candidates for a track's content URL.
///
/// The unmodified URL always comes first, followed by each of
/// [`ALTERNATE_FORMATS`] that differs from the URL's own tag.
pub fn negotiate_candidates(content_url: &str) -> Result<Vec<FetchCandidate>> {
    let url = Url::parse(content_url).map_err(|e| {
        TranscriptError::FetchFailed(format!("invalid caption URL {:?}: {}", content_url, e))
    })?;
    let current = format_tag(&url);

    let mut candidates = vec![FetchCandidate {
        url: content_url.to_string(),
        format_tag: current.clone(),
    }];

    for format in ALTERNATE_FORMATS.iter().filter(|f| **f != current) {
        let rewritten = with_format(&url, format).to_string();
        if candidates.iter().any(|c| c.url == rewritten) {
            continue;
        }
        candidates.push(FetchCandidate {
            url: rewritten,
            format_tag: format.to_string(),
        });
    }

    Ok(candidates)
}
