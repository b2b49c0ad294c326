use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use subsync::config::{Config, OutputFormat};
use subsync::pipeline;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "subsync")]
#[command(version, about = "Broadcast-compliant subtitles for YouTube videos")]
#[command(
    long_about = "Generate broadcast-compliant subtitles for YouTube videos using the local Whisper CLI. Accepts a YouTube URL or a pre-transcribed Whisper JSON file."
)]
struct Cli {
    /// YouTube URL or path to a Whisper JSON transcript
    input: String,

    /// Output subtitle file (defaults to the video id with the format's extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: srt, vtt, json
    #[arg(short, long)]
    format: Option<String>,

    /// Spoken language hint for Whisper (e.g., en, ja, es)
    #[arg(short, long)]
    language: Option<String>,

    /// Whisper model to use (e.g., tiny, base, turbo)
    #[arg(short, long)]
    model: Option<String>,

    /// Apply the reading-speed limit for children's content
    #[arg(long)]
    children: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let mut config = Config::load().context("Failed to load configuration")?;

    // CLI flags override file and environment configuration
    if let Some(format_str) = cli.format {
        let format: OutputFormat = format_str.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        config.output.format = format;
    }
    if let Some(output) = cli.output {
        config.output.output_path = Some(output);
    }
    if let Some(language) = cli.language {
        config.transcription.language = Some(language);
    }
    if let Some(model) = cli.model {
        config.transcription.model = model;
    }
    if cli.children {
        config.processing.is_children_content = true;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    info!("Input:  {}", cli.input);
    info!("Format: {}", config.output.format);
    info!("Model:  {}", config.transcription.model);
    if let Some(ref language) = config.transcription.language {
        info!("Language: {}", language);
    }

    let result = pipeline::generate_subtitles(&cli.input, &config, true)
        .await
        .context("Subtitle generation failed")?;

    pipeline::print_summary(&result);

    if !result.report.is_compliant {
        anyhow::bail!(
            "{} segment(s) could not be processed; see report above",
            result.report.errors.len()
        );
    }

    Ok(())
}
