//! Decoder for the structured-event (`fmt=json3`) payload.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::sort_by_start;
use crate::normalizer::decode_entities;
use crate::transcript::TimedSegment;
use crate::{Result, TranscriptError};

/// Top level of a json3 document. Either `{"events": [...]}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDocument {
    Object {
        #[serde(default)]
        events: Vec<RawEvent>,
    },
    Events(Vec<RawEvent>),
}

/// An event we understand, or anything else (skipped)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawEvent {
    Caption(CaptionEvent),
    Other(Value),
}

/// Every field is optional and a wrong-typed value reads as absent,
/// so one odd field never costs the event its text.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionEvent {
    #[serde(default, deserialize_with = "lenient")]
    t_start_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    d_duration_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    t_duration_ms: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    segs: Option<Vec<RawSeg>>,
    #[serde(default, deserialize_with = "lenient")]
    utf8: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| serde_json::from_value(value).ok()))
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSeg {
    Text { utf8: String },
    Other(Value),
}

impl CaptionEvent {
    /// Concatenated `segs` text, or the flat `utf8` field when the segments carry none
    fn text(&self) -> Option<String> {
        let joined: String = self
            .segs
            .iter()
            .flatten()
            .filter_map(|seg| match seg {
                RawSeg::Text { utf8 } => Some(utf8.as_str()),
                RawSeg::Other(_) => None,
            })
            .collect();

        if joined.is_empty() {
            self.utf8.clone()
        } else {
            Some(joined)
        }
    }

    fn into_segment(self, language_code: Option<&str>) -> Option<TimedSegment> {
        let text = decode_entities(&self.text()?).trim().to_string();
        if text.is_empty() {
            return None;
        }

        let start = millis_to_seconds(self.t_start_ms);
        let duration = millis_to_seconds(self.d_duration_ms.or(self.t_duration_ms));
        Some(TimedSegment::new(text, language_code.map(str::to_string), start, duration))
    }
}

/// Non-finite or negative values count as absent
fn millis_to_seconds(millis: Option<f64>) -> f64 {
    match millis {
        Some(ms) if ms.is_finite() && ms >= 0.0 => ms / 1000.0,
        _ => 0.0,
    }
}

/// Decode a json3 payload. Fails only when the payload is not valid JSON.
pub fn parse(payload: &str, language_code: Option<&str>) -> Result<Vec<TimedSegment>> {
    let value: Value = serde_json::from_str(payload)
        .map_err(|e| TranscriptError::ParseError(format!("invalid json3 payload: {}", e)))?;

    let events = match serde_json::from_value::<RawDocument>(value) {
        Ok(RawDocument::Object { events }) | Ok(RawDocument::Events(events)) => events,
        Err(_) => return Ok(Vec::new()),
    };

    let mut segments: Vec<TimedSegment> = events
        .into_iter()
        .filter_map(|event| match event {
            RawEvent::Caption(caption) => caption.into_segment(language_code),
            RawEvent::Other(_) => None,
        })
        .collect();

    sort_by_start(&mut segments);
    Ok(segments)
}
