use anyhow::Result;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::normalizer::FormattingOptions;
use crate::transcript::TranscriptResult;

pub mod formatters;

pub use formatters::*;

/// Render `result` in the requested format
pub fn render(
    result: &TranscriptResult,
    format: OutputFormat,
    options: &FormattingOptions,
    timestamps: bool,
) -> Result<String> {
    let content = match format {
        OutputFormat::Text => format_as_text(result, options, timestamps),
        OutputFormat::Json => format_as_json(result)?,
        OutputFormat::Srt => format_as_srt(result),
        OutputFormat::Vtt => format_as_vtt(result),
    };
    Ok(content)
}

/// Save transcript to file
pub fn save_to_file(
    result: &TranscriptResult,
    path: &Path,
    format: OutputFormat,
    options: &FormattingOptions,
    timestamps: bool,
) -> Result<()> {
    let content = render(result, format, options, timestamps)?;
    fs_err::write(path, content)?;
    Ok(())
}

/// Print transcript to console
pub fn print_to_console(
    result: &TranscriptResult,
    format: OutputFormat,
    options: &FormattingOptions,
    timestamps: bool,
) -> Result<()> {
    let content = render(result, format, options, timestamps)?;
    println!("{}", content);
    Ok(())
}
