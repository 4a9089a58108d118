use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubescript::cli::{Cli, Commands, OutputFormat};
use tubescript::{output, Config, FormattingOptions, TranscriptFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose { "tubescript=debug" } else { "tubescript=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = if matches!(cli.command, Commands::Config { init: true, .. }) {
        Config::default()
    } else {
        Config::load(cli.config.as_deref())?
    };

    match cli.command {
        Commands::Fetch {
            input,
            lang,
            output,
            format,
            paragraphs,
            time_gap,
            max_sentences,
            timestamps,
        } => {
            let format = match format {
                Some(format) => format,
                None => config
                    .app
                    .default_output_format
                    .parse::<OutputFormat>()
                    .map_err(|e| anyhow::anyhow!("Invalid default_output_format in config: {}", e))?,
            };

            let options = FormattingOptions {
                enable_paragraphs: paragraphs || config.formatting.enable_paragraphs,
                time_gap_threshold: time_gap.unwrap_or(config.formatting.time_gap_threshold),
                max_sentences_per_paragraph: max_sentences
                    .unwrap_or(config.formatting.max_sentences_per_paragraph),
            };
            let language = lang.or_else(|| config.app.default_language.clone());

            let fetcher = TranscriptFetcher::from_config(&config)?;

            let progress = spinner(cli.quiet);
            progress.set_message("Fetching transcript...");
            let result = fetcher.fetch_transcript(&input, language.as_deref()).await;
            progress.finish_and_clear();
            let result = result?;

            match output {
                Some(path) => {
                    output::save_to_file(&result, &path, format, &options, timestamps)
                        .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => {
                    output::print_to_console(&result, format, &options, timestamps)?;
                }
            }
        }
        Commands::Tracks { input } => {
            let fetcher = TranscriptFetcher::from_config(&config)?;

            let progress = spinner(cli.quiet);
            progress.set_message("Discovering caption tracks...");
            let tracks = fetcher.list_tracks(&input).await;
            progress.finish_and_clear();

            println!("Available caption tracks:");
            for track in tracks? {
                println!(
                    "  • {:<8} {}{}",
                    track.language_code,
                    track.name.as_deref().unwrap_or(""),
                    if track.is_generated { " [auto-generated]" } else { "" }
                );
            }
        }
        Commands::Config { show, init } => {
            if init {
                let path = config.save(cli.config.as_deref())?;
                println!("Default configuration written to: {}", path.display());
            } else if show {
                config.display();
            } else {
                println!("Use --show to print the configuration or --init to write a default file.");
            }
        }
    }

    Ok(())
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        progress.set_style(style);
    }
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
