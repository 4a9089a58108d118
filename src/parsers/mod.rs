//! Decoders turning a raw timedtext payload into ordered segments.
//!
//! The payload kind is sniffed from its first meaningful character: JSON
//! documents go to [`json3`], anything else is scanned as timed markup by
//! [`markup`]. An empty result is not an error; it tells the caller to try the
//! next format candidate.

pub mod json3;
pub mod markup;

use crate::transcript::TimedSegment;
use crate::Result;

/// Anti-JSON-hijacking guard some endpoints prepend to JSON bodies
const HIJACK_PREFIX: &str = ")]}'";

/// Payload families understood by [`parse_payload`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Json3,
    Markup,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadKind::Json3 => "json3",
            PayloadKind::Markup => "markup",
        }
    }
}

/// Trim the payload and drop a leading hijack guard if present
pub fn strip_hijack_prefix(payload: &str) -> &str {
    let trimmed = payload.trim_start();
    trimmed
        .strip_prefix(HIJACK_PREFIX)
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

pub fn classify_payload(payload: &str) -> PayloadKind {
    match strip_hijack_prefix(payload).chars().next() {
        Some('{') | Some('[') => PayloadKind::Json3,
        _ => PayloadKind::Markup,
    }
}

/// Decode `payload` with the matching decoder, tagging segments with `language_code`
pub fn parse_payload(payload: &str, language_code: Option<&str>) -> Result<Vec<TimedSegment>> {
    let body = strip_hijack_prefix(payload);
    let kind = classify_payload(body);
    tracing::debug!("Parsing {} byte payload as {}", body.len(), kind.as_str());

    match kind {
        PayloadKind::Json3 => json3::parse(body, language_code),
        PayloadKind::Markup => Ok(markup::parse(body, language_code)),
    }
}

/// Sort segments by start time, keeping the original order for ties
pub(crate) fn sort_by_start(segments: &mut [TimedSegment]) {
    segments.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
}
