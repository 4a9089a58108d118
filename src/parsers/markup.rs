//! Best-effort decoder for timed markup payloads.
//!
//! Handles the classic `<text start="s" dur="s">` layout (default, `srv1`) and
//! the `srv3` layout of `<p t="ms" d="ms">` paragraphs with nested `<s>` runs.
//! Elements that cannot be read are skipped; this decoder never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::sort_by_start;
use crate::normalizer::decode_entities;
use crate::transcript::TimedSegment;

static TEXT_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<text\b([^>]*)>(.*?)</text>").unwrap());
static P_ELEMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<p\b([^>]*)>(.*?)</p>").unwrap());
static ATTRIBUTE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z_][\w-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap());
static INNER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Element shape and time unit of one markup layout
struct Layout {
    element: &'static Lazy<Regex>,
    start_attr: &'static str,
    duration_attr: &'static str,
    scale: f64,
}

static LAYOUTS: [Layout; 2] = [
    Layout {
        element: &TEXT_ELEMENT,
        start_attr: "start",
        duration_attr: "dur",
        scale: 1.0,
    },
    Layout {
        element: &P_ELEMENT,
        start_attr: "t",
        duration_attr: "d",
        scale: 1000.0,
    },
];

fn attributes(raw: &str) -> HashMap<&str, &str> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some((name, value))
        })
        .collect()
}

fn parse_time(value: Option<&&str>, scale: f64) -> Option<f64> {
    let parsed: f64 = value?.trim().parse().ok()?;
    (parsed.is_finite() && parsed >= 0.0).then(|| parsed / scale)
}

fn parse_layout(payload: &str, layout: &Layout, language_code: Option<&str>) -> Vec<TimedSegment> {
    layout
        .element
        .captures_iter(payload)
        .filter_map(|caps| {
            let attrs = attributes(caps.get(1)?.as_str());
            let start = parse_time(attrs.get(layout.start_attr), layout.scale)?;
            let duration = parse_time(attrs.get(layout.duration_attr), layout.scale).unwrap_or(0.0);

            let inner = INNER_TAG.replace_all(caps.get(2)?.as_str(), "");
            let text = decode_entities(&inner).trim().to_string();
            if text.is_empty() {
                return None;
            }

            Some(TimedSegment::new(text, language_code.map(str::to_string), start, duration))
        })
        .collect()
}

/// Decode every timed element in `payload`, sorted by start time
pub fn parse(payload: &str, language_code: Option<&str>) -> Vec<TimedSegment> {
    for layout in &LAYOUTS {
        let mut segments = parse_layout(payload, layout, language_code);
        if !segments.is_empty() {
            sort_by_start(&mut segments);
            return segments;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_element() {
        let payload = r#"<text start="1.5" dur="2.25">Hi&amp;there</text>"#;
        let segments = parse(payload, Some("en"));
        assert_eq!(
            segments,
            vec![TimedSegment::new("Hi&there", Some("en".to_string()), 1.5, 2.25)]
        );
    }

    #[test]
    fn test_skips_malformed_and_blank_elements() {
        let payload = r#"<?xml version="1.0" encoding="utf-8" ?><transcript>
            <text start="abc" dur="1">bad start</text>
            <text dur="1">no start</text>
            <text start="2" dur="1">   </text>
            <text start="3">no duration</text>
            <text start="0.5" dur="1">first &#39;quoted&#39;</text>
        </transcript>"#;
        let segments = parse(payload, None);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "first 'quoted'");
        assert_eq!(segments[1].text, "no duration");
        assert_eq!(segments[1].duration_seconds, 0.0);
    }

    #[test]
    fn test_multiline_text_and_single_quotes() {
        let payload = "<text start='4' dur='1'>line one\nline two</text>";
        let segments = parse(payload, None);
        assert_eq!(segments[0].text, "line one\nline two");
        assert_eq!(segments[0].start_seconds, 4.0);
    }

    #[test]
    fn test_srv3_paragraphs() {
        let payload = r#"<timedtext format="3"><body>
            <p t="2000" d="1000"><s>second</s></p>
            <p t="1000" d="1500"><s ac="0">Hello</s><s t="400"> there</s></p>
        </body></timedtext>"#;
        let segments = parse(payload, Some("de"));
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello there");
        assert_eq!(segments[0].start_seconds, 1.0);
        assert_eq!(segments[0].duration_seconds, 1.5);
        assert_eq!(segments[1].text, "second");
    }

    #[test]
    fn test_no_elements_is_empty() {
        assert!(parse("<html><body>Sorry</body></html>", None).is_empty());
        assert!(parse("", None).is_empty());
    }
}
