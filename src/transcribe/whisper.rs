use crate::config::TranscriptionConfig;
use crate::error::{Result, SubsyncError};
use crate::transcribe::{TranscriptSegment, TranscriptionResult, Transcriber, Word};
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};

/// Driver for the local `whisper` command-line tool.
pub struct WhisperCommand {
    model: String,
    language: Option<String>,
    word_timestamps: bool,
    device: String,
}

impl WhisperCommand {
    pub fn new(config: &TranscriptionConfig) -> Self {
        Self {
            model: config.model.clone(),
            language: config.language.clone(),
            word_timestamps: config.word_timestamps,
            device: config.device.clone(),
        }
    }

    fn build_args(&self, audio_path: &Path, output_dir: &Path) -> Vec<String> {
        let mut args = vec![
            audio_path.display().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.display().to_string(),
            "--model".to_string(),
            self.model.clone(),
        ];

        if self.word_timestamps {
            args.push("--word_timestamps".to_string());
            args.push("True".to_string());
        }

        if let Some(ref language) = self.language {
            args.push("--language".to_string());
            args.push(language.clone());
        }

        if self.device != "auto" {
            args.push("--device".to_string());
            args.push(self.device.clone());
        }

        args
    }

    fn run_whisper(&self, audio_path: &Path, output_dir: &Path) -> Result<PathBuf> {
        info!(
            "Transcribing {} with Whisper model '{}'",
            audio_path.display(),
            self.model
        );

        let output = Command::new("whisper")
            .args(self.build_args(audio_path, output_dir))
            .output()
            .map_err(|e| SubsyncError::Transcription(format!("Failed to run whisper: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubsyncError::Transcription(format!(
                "Whisper failed: {}",
                stderr.trim()
            )));
        }

        let stem = audio_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        Ok(output_dir.join(format!("{stem}.json")))
    }
}

/// Check that the whisper CLI is installed and accessible.
pub fn check_whisper() -> Result<()> {
    let output = Command::new("whisper")
        .arg("--help")
        .output()
        .map_err(|e| {
            SubsyncError::Transcription(format!(
                "Whisper not found. Please install it with 'pip install openai-whisper'. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(SubsyncError::Transcription(
            "Whisper check failed".to_string(),
        ));
    }

    debug!("Whisper is available");
    Ok(())
}

/// Load a transcription from a Whisper JSON file.
///
/// Works both for files produced by [`WhisperCommand`] and for
/// pre-transcribed JSON supplied directly by the user.
pub fn load_whisper_json(path: &Path) -> Result<TranscriptionResult> {
    if !path.exists() {
        return Err(SubsyncError::FileNotFound(path.display().to_string()));
    }

    let contents = fs::read_to_string(path)?;
    let output: WhisperOutput = serde_json::from_str(&contents)?;
    Ok(convert_output(output))
}

fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value.max(0.0))
}

fn convert_output(output: WhisperOutput) -> TranscriptionResult {
    let segments: Vec<TranscriptSegment> = output
        .segments
        .into_iter()
        .map(|seg| TranscriptSegment {
            start: secs(seg.start),
            end: secs(seg.end),
            text: seg.text.trim().to_string(),
            words: seg
                .words
                .into_iter()
                .map(|w| Word {
                    text: w.word.trim().to_string(),
                    start: secs(w.start),
                    end: secs(w.end),
                })
                .collect(),
        })
        .collect();

    let duration = segments.last().map(|s| s.end).unwrap_or_default();

    TranscriptionResult {
        language: output.language,
        duration,
        segments,
    }
}

#[async_trait]
impl Transcriber for WhisperCommand {
    async fn transcribe(&self, audio_path: &Path) -> Result<TranscriptionResult> {
        if !audio_path.exists() {
            return Err(SubsyncError::FileNotFound(
                audio_path.display().to_string(),
            ));
        }

        check_whisper()?;

        let output_dir = audio_path.parent().unwrap_or_else(|| Path::new("."));
        let json_path = self.run_whisper(audio_path, output_dir)?;
        let result = load_whisper_json(&json_path)?;

        debug!(
            "Whisper produced {} segments covering {:.1}s",
            result.segments.len(),
            result.duration.as_secs_f64()
        );

        Ok(result)
    }

    fn name(&self) -> &'static str {
        "Whisper CLI"
    }
}

// Whisper JSON output types

#[derive(Debug, Deserialize)]
struct WhisperOutput {
    #[allow(dead_code)]
    #[serde(default)]
    text: String,
    #[serde(default)]
    language: Option<String>,
    segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
struct WhisperSegment {
    start: f64,
    end: f64,
    text: String,
    #[serde(default)]
    words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
struct WhisperWord {
    word: String,
    start: f64,
    end: f64,
}
