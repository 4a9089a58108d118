use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tubescript",
    about = "tubescript - Fetch YouTube caption transcripts as clean text, JSON, SRT or WebVTT",
    version,
    long_about = "Fetches the caption transcript of a YouTube video from a URL or video ID. Caption tracks are discovered from the watch page and several payload formats are tried until one yields text."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./tubescript.yaml or the user config dir)
    #[arg(long, global = true, env = "TUBESCRIPT_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the transcript of a video
    Fetch {
        /// Video URL or 11-character video ID
        #[arg(value_name = "URL_OR_ID")]
        input: String,

        /// Caption language code (platform default track if not specified)
        #[arg(short, long, value_name = "LANG")]
        lang: Option<String>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Group text output into paragraphs
        #[arg(long)]
        paragraphs: bool,

        /// Silence in seconds that starts a new paragraph
        #[arg(long, value_name = "SECONDS")]
        time_gap: Option<f64>,

        /// Maximum caption fragments per paragraph
        #[arg(long, value_name = "COUNT")]
        max_sentences: Option<usize>,

        /// Print one timestamped line per segment in text output
        #[arg(long)]
        timestamps: bool,
    },

    /// List the caption tracks a video offers
    Tracks {
        /// Video URL or 11-character video ID
        #[arg(value_name = "URL_OR_ID")]
        input: String,
    },

    /// Show or initialize the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Write a default configuration file
        #[arg(long, conflicts_with = "show")]
        init: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON with timestamps
    Json,
    /// SRT subtitle format
    Srt,
    /// WebVTT format
    Vtt,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::parse_from([
            "tubescript",
            "fetch",
            "dQw4w9WgXcQ",
            "--lang",
            "fr",
            "--paragraphs",
            "--time-gap",
            "3",
            "-f",
            "srt",
        ]);
        match cli.command {
            Commands::Fetch {
                input,
                lang,
                paragraphs,
                time_gap,
                format,
                ..
            } => {
                assert_eq!(input, "dQw4w9WgXcQ");
                assert_eq!(lang.as_deref(), Some("fr"));
                assert!(paragraphs);
                assert_eq!(time_gap, Some(3.0));
                assert_eq!(format, Some(OutputFormat::Srt));
            }
            _ => panic!("expected fetch"),
        }
    }

    #[test]
    fn test_output_format_from_config_string() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("csv".parse::<OutputFormat>().is_err());
    }
}
