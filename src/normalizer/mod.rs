//! Pure text helpers: entity decoding, whitespace cleanup, paragraph
//! segmentation and timestamp formatting. Nothing in here performs I/O.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::transcript::TimedSegment;

/// Entities decoded by [`decode_entities`]. Anything else passes through.
const ENTITIES: &[(&str, &str)] = &[
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#34;", "\""),
    ("&#39;", "'"),
    ("&apos;", "'"),
    ("&#x27;", "'"),
    ("&#x2F;", "/"),
    ("&#47;", "/"),
    ("&nbsp;", " "),
];

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());
static REPEATED_TERMINATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{2,}|!{2,}|\?{2,}").unwrap());
static MISSING_SPACE_AFTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([?!])([[:alnum:]])").unwrap());

/// Options controlling how a segment sequence is rendered as prose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingOptions {
    /// Split into paragraphs instead of one flat block
    pub enable_paragraphs: bool,

    /// Silence (seconds) between segments that starts a new paragraph
    pub time_gap_threshold: f64,

    /// Maximum number of fragments collected into one paragraph
    pub max_sentences_per_paragraph: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_paragraphs: false,
            time_gap_threshold: 2.0,
            max_sentences_per_paragraph: 5,
        }
    }
}

/// Decode the common HTML entities found in caption payloads.
///
/// Decoding is a single left-to-right pass, so `&amp;lt;` becomes `&lt;`
/// rather than `<`. Non-breaking spaces, raw or as a literal `\u00a0`
/// escape, are turned into plain spaces.
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let matched = ENTITIES.iter().find(|(entity, _)| {
            rest.get(..entity.len())
                .is_some_and(|candidate| candidate.eq_ignore_ascii_case(entity))
        });

        match matched {
            Some((entity, replacement)) => {
                out.push_str(replacement);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);

    out.replace('\u{a0}', " ").replace("\\u00a0", " ")
}

/// Flatten text into a single clean line. Idempotent.
pub fn normalize_text(input: &str) -> String {
    let text = input.replace(['\r', '\n'], " ");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    let text = SPACE_BEFORE_PUNCT.replace_all(&text, "$1");
    let text = REPEATED_TERMINATORS.replace_all(&text, |caps: &regex::Captures| {
        caps[0][..1].to_string()
    });
    let text = MISSING_SPACE_AFTER.replace_all(&text, "$1 $2");
    text.trim().to_string()
}

/// Render segments as one normalized block of prose
pub fn flatten_segments(segments: &[TimedSegment]) -> String {
    let joined = segments
        .iter()
        .map(|segment| decode_entities(&segment.text))
        .collect::<Vec<_>>()
        .join(" ");
    normalize_text(&joined)
}

/// Group segments into paragraphs separated by a blank line.
///
/// A paragraph is closed before the current segment when the silence since the
/// previous segment ended exceeds `time_gap_threshold`, when the previous
/// fragment ends a sentence and the current one starts with a capital, or when
/// the paragraph already holds `max_sentences_per_paragraph` fragments.
pub fn segment_paragraphs(segments: &[TimedSegment], options: &FormattingOptions) -> String {
    let max_fragments = options.max_sentences_per_paragraph.max(1);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut previous_end: Option<f64> = None;

    for segment in segments {
        let text = decode_entities(&segment.text).trim().to_string();
        if text.is_empty() {
            continue;
        }

        if let Some(last) = current.last() {
            let gap = previous_end.map_or(0.0, |end| segment.start_seconds - end);
            let sentence_break = last.ends_with('.')
                && text.chars().next().is_some_and(char::is_uppercase);

            if gap > options.time_gap_threshold || sentence_break || current.len() >= max_fragments {
                paragraphs.push(normalize_text(&current.join(" ")));
                current.clear();
            }
        }

        current.push(text);
        previous_end = Some(segment.end_seconds());
    }

    if !current.is_empty() {
        paragraphs.push(normalize_text(&current.join(" ")));
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs.join("\n\n")
}

/// Render segments according to `options`
pub fn format_transcript(segments: &[TimedSegment], options: &FormattingOptions) -> String {
    if options.enable_paragraphs {
        segment_paragraphs(segments, options)
    } else {
        flatten_segments(segments)
    }
}

/// `M:SS`, or `H:MM:SS` once past the hour
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// `HH:MM:SS,mmm` as used by SubRip
pub fn format_srt_time(seconds: f64) -> String {
    clock_time(seconds, ',')
}

/// `HH:MM:SS.mmm` as used by WebVTT
pub fn format_vtt_time(seconds: f64) -> String {
    clock_time(seconds, '.')
}

fn clock_time(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, millis)
}
