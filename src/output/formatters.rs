use anyhow::Result;

use crate::normalizer::{
    decode_entities, format_srt_time, format_timestamp, format_transcript, format_vtt_time, normalize_text,
    FormattingOptions,
};
use crate::transcript::TranscriptResult;

/// Prose rendering, or one `[M:SS] text` line per segment
pub fn format_as_text(result: &TranscriptResult, options: &FormattingOptions, timestamps: bool) -> String {
    if timestamps {
        return result
            .segments
            .iter()
            .map(|segment| {
                format!(
                    "[{}] {}",
                    format_timestamp(segment.start_seconds),
                    normalize_text(&decode_entities(&segment.text))
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
    }

    format!("{}\n\n{}", result.title, format_transcript(&result.segments, options))
}

pub fn format_as_json(result: &TranscriptResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

pub fn format_as_srt(result: &TranscriptResult) -> String {
    result
        .segments
        .iter()
        .enumerate()
        .map(|(index, segment)| {
            format!(
                "{}\n{} --> {}\n{}\n",
                index + 1,
                format_srt_time(segment.start_seconds),
                format_srt_time(segment.end_seconds()),
                segment.text.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_as_vtt(result: &TranscriptResult) -> String {
    let mut out = String::from("WEBVTT\n");
    if let Some(language) = &result.language_code {
        out.push_str(&format!("Language: {}\n", language));
    }

    for segment in &result.segments {
        out.push_str(&format!(
            "\n{} --> {}\n{}\n",
            format_vtt_time(segment.start_seconds),
            format_vtt_time(segment.end_seconds()),
            segment.text.trim()
        ));
    }
    out
}
