use crate::config::{Config, OutputFormat};
use crate::error::Result;
use crate::subtitle::processor::{ComplianceReport, SubtitleProcessor};
use crate::subtitle::{create_formatter, json::JsonFormatter, Subtitle, SubtitleFormatter};
use crate::transcribe::{whisper, TranscriptionResult, Transcriber, WhisperCommand};
use crate::youtube::{self, VideoMetadata};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, info};

/// Statistics from one subtitle generation run.
#[derive(Debug, Clone)]
pub struct PipelineStats {
    /// Total time taken for the entire pipeline.
    pub total_time: Duration,
    /// Time taken to download the audio track.
    pub download_time: Duration,
    /// Time taken for transcription.
    pub transcription_time: Duration,
    /// Number of transcript segments produced.
    pub segments_transcribed: usize,
    /// Number of subtitle cues written.
    pub subtitles_generated: usize,
    /// Duration of the source video.
    pub video_duration: Duration,
    /// Name of the transcription backend used.
    pub transcriber: String,
}

/// Result of the subtitle generation pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    /// Path to the output subtitle file.
    pub output_path: PathBuf,
    /// Generated subtitle cues.
    pub subtitles: Vec<Subtitle>,
    /// Compliance report from processing.
    pub report: ComplianceReport,
    /// Pipeline statistics.
    pub stats: PipelineStats,
}

/// Generate broadcast-compliant subtitles for the given input.
///
/// The input is either a YouTube URL or a path to a Whisper JSON transcript
/// produced earlier. A URL runs the full pipeline:
/// 1. Fetches video metadata
/// 2. Downloads the audio track
/// 3. Transcribes with the Whisper CLI
/// 4. Applies compliance rules and writes the subtitle file
///
/// A transcript path skips straight to the compliance stage.
pub async fn generate_subtitles(
    input: &str,
    config: &Config,
    show_progress: bool,
) -> Result<PipelineResult> {
    let start_time = Instant::now();

    let input_path = Path::new(input);
    if input_path.extension().and_then(|e| e.to_str()) == Some("json") {
        return generate_from_transcript(input_path, config, show_progress, start_time);
    }

    generate_from_url(input, config, show_progress, start_time).await
}

async fn generate_from_url(
    url: &str,
    config: &Config,
    show_progress: bool,
    start_time: Instant,
) -> Result<PipelineResult> {
    let video_id = youtube::parse_video_id(url)?;
    let multi_progress = if show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 1: Video Metadata
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 1/4: Fetching metadata for video {video_id}");

    let metadata_pb = add_spinner(&multi_progress, "Fetching video metadata...");
    let metadata: VideoMetadata = youtube::fetch_metadata(&video_id).await?;
    if let Some(pb) = metadata_pb {
        pb.finish_with_message(format!(
            "✓ {} ({:.0}s)",
            metadata.title,
            metadata.duration.as_secs_f64()
        ));
    }

    info!(
        "Video: '{}' by {} ({:.0}s)",
        metadata.title,
        metadata.uploader.as_deref().unwrap_or("unknown"),
        metadata.duration.as_secs_f64()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 2: Audio Download
    // ═══════════════════════════════════════════════════════════════════════
    info!("Stage 2/4: Downloading audio");
    let download_start = Instant::now();

    let temp_dir = TempDir::new()?;
    debug!("Using temp directory: {:?}", temp_dir.path());

    let download_pb = add_spinner(&multi_progress, "Downloading audio track...");
    let audio_path = youtube::download_audio(&video_id, temp_dir.path()).await?;
    if let Some(pb) = download_pb {
        pb.finish_with_message("✓ Audio downloaded".to_string());
    }

    let download_time = download_start.elapsed();
    info!(
        "Audio downloaded to {:?} in {:.2}s",
        audio_path,
        download_time.as_secs_f64()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 3: Transcription
    // ═══════════════════════════════════════════════════════════════════════
    let transcriber = WhisperCommand::new(&config.transcription);
    info!("Stage 3/4: Transcribing with {}", transcriber.name());
    let transcription_start = Instant::now();

    let transcription_pb = add_spinner(&multi_progress, "Transcribing audio...");
    let transcript = transcriber.transcribe(&audio_path).await?;
    if let Some(pb) = transcription_pb {
        pb.finish_with_message(format!("✓ Transcribed {} segments", transcript.segments.len()));
    }

    let transcription_time = transcription_start.elapsed();
    info!(
        "Transcription complete: {} segments in {:.2}s",
        transcript.segments.len(),
        transcription_time.as_secs_f64()
    );

    // ═══════════════════════════════════════════════════════════════════════
    // Stage 4: Compliance Processing
    // ═══════════════════════════════════════════════════════════════════════
    info!(
        "Stage 4/4: Applying compliance rules and writing {}",
        config.output.format
    );

    let subtitle_pb = add_spinner(&multi_progress, "Processing subtitles...");
    let (output_path, subtitles, report) =
        process_transcript(&transcript, Some(&video_id), config)?;
    if let Some(pb) = subtitle_pb {
        pb.finish_with_message(format!("✓ Wrote {} subtitles", subtitles.len()));
    }

    info!("Wrote {} subtitles to {:?}", subtitles.len(), output_path);

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        download_time,
        transcription_time,
        segments_transcribed: transcript.segments.len(),
        subtitles_generated: subtitles.len(),
        video_duration: metadata.duration,
        transcriber: transcriber.name().to_string(),
    };

    Ok(PipelineResult {
        output_path,
        subtitles,
        report,
        stats,
    })
}

fn generate_from_transcript(
    transcript_path: &Path,
    config: &Config,
    show_progress: bool,
    start_time: Instant,
) -> Result<PipelineResult> {
    let multi_progress = if show_progress {
        Some(MultiProgress::new())
    } else {
        None
    };

    info!("Stage 1/2: Loading transcript from {:?}", transcript_path);
    let transcript = whisper::load_whisper_json(transcript_path)?;
    info!("Loaded {} segments", transcript.segments.len());

    info!(
        "Stage 2/2: Applying compliance rules and writing {}",
        config.output.format
    );
    let subtitle_pb = add_spinner(&multi_progress, "Processing subtitles...");
    let (output_path, subtitles, report) = process_transcript(&transcript, None, config)?;
    if let Some(pb) = subtitle_pb {
        pb.finish_with_message(format!("✓ Wrote {} subtitles", subtitles.len()));
    }

    info!("Wrote {} subtitles to {:?}", subtitles.len(), output_path);

    let stats = PipelineStats {
        total_time: start_time.elapsed(),
        download_time: Duration::ZERO,
        transcription_time: Duration::ZERO,
        segments_transcribed: transcript.segments.len(),
        subtitles_generated: subtitles.len(),
        video_duration: transcript.duration,
        transcriber: "pre-transcribed JSON".to_string(),
    };

    Ok(PipelineResult {
        output_path,
        subtitles,
        report,
        stats,
    })
}

/// Run the compliance processor over a transcript and write the subtitle
/// file. Returns the output path, the cues and the compliance report.
pub fn process_transcript(
    transcript: &TranscriptionResult,
    video_id: Option<&str>,
    config: &Config,
) -> Result<(PathBuf, Vec<Subtitle>, ComplianceReport)> {
    let processor = SubtitleProcessor::new(config.processing.clone())?;
    let outcome = processor.process(&transcript.segments);

    let formatter: Box<dyn SubtitleFormatter> = match config.output.format {
        OutputFormat::Json => Box::new(JsonFormatter {
            video_id: video_id.map(str::to_string),
            language: transcript.language.clone(),
        }),
        format => create_formatter(format),
    };

    let mut content = formatter.format(&outcome.subtitles);
    if config.output.include_bom {
        content.insert(0, '\u{feff}');
    }

    let output_path = resolve_output_path(video_id, config);
    fs::write(&output_path, &content)?;

    Ok((output_path, outcome.subtitles, outcome.report))
}

fn resolve_output_path(video_id: Option<&str>, config: &Config) -> PathBuf {
    match config.output.output_path {
        Some(ref path) => path.clone(),
        None => {
            let stem = video_id.unwrap_or("subtitles");
            PathBuf::from(format!("{stem}.{}", config.output.format.extension()))
        }
    }
}

fn add_spinner(multi_progress: &Option<MultiProgress>, message: &str) -> Option<ProgressBar> {
    multi_progress.as_ref().map(|mp| {
        let pb = mp.add(ProgressBar::new_spinner());
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap(),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    })
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let report = &result.report;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                  Subtitle Generation Complete                  ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:      {}", result.output_path.display());
    println!("  Subtitles:   {}", result.stats.subtitles_generated);
    println!("  Transcriber: {}", result.stats.transcriber);
    println!(
        "  Video:       {:.1}s",
        result.stats.video_duration.as_secs_f64()
    );
    println!();
    println!(
        "  Compliance:  {}",
        if report.is_compliant {
            "passed"
        } else {
            "FAILED"
        }
    );
    if report.timing_issues > 0 {
        println!("    Timing issues:    {}", report.timing_issues);
    }
    if report.cps_warnings > 0 {
        println!("    Reading speed:    {}", report.cps_warnings);
    }
    if report.line_length_issues > 0 {
        println!("    Truncated lines:  {}", report.line_length_issues);
    }
    for warning in report.warnings.iter().take(5) {
        println!("    ⚠ {warning}");
    }
    if report.warnings.len() > 5 {
        println!("    ... and {} more warnings", report.warnings.len() - 5);
    }
    for error in &report.errors {
        println!("    ✗ {error}");
    }
    println!();
    println!("  Timing:");
    println!(
        "    Download:    {:.2}s",
        result.stats.download_time.as_secs_f64()
    );
    println!(
        "    Transcribe:  {:.2}s ({} segments)",
        result.stats.transcription_time.as_secs_f64(),
        result.stats.segments_transcribed
    );
    println!(
        "    Total:       {:.2}s",
        result.stats.total_time.as_secs_f64()
    );
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}
