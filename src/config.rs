use crate::error::{Result, SubsyncError};
use crate::subtitle::processor::ProcessingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Srt,
    Vtt,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Srt => write!(f, "srt"),
            OutputFormat::Vtt => write!(f, "vtt"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "vtt" => Ok(OutputFormat::Vtt),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'srt', 'vtt', or 'json'",
                s
            )),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
            OutputFormat::Json => "json",
        }
    }
}

/// Options passed to the Whisper transcriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Whisper model name (default: "turbo").
    pub model: String,
    /// Spoken language hint; autodetected when unset.
    pub language: Option<String>,
    /// Ask for word-level timestamps (default: true).
    pub word_timestamps: bool,
    /// Inference device: "auto", "cpu" or "cuda".
    pub device: String,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "turbo".to_string(),
            language: None,
            word_timestamps: true,
            device: "auto".to_string(),
        }
    }
}

/// Where and how the subtitle file is written.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Output path; derived from the video id and format when unset.
    pub output_path: Option<PathBuf>,
    /// Prepend a UTF-8 BOM to the written file.
    pub include_bom: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub transcription: TranscriptionConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        // Override with environment variables
        if let Ok(model) = std::env::var("SUBSYNC_MODEL") {
            config.transcription.model = model;
        }
        if let Ok(language) = std::env::var("SUBSYNC_LANGUAGE") {
            config.transcription.language = Some(language);
        }
        if let Ok(device) = std::env::var("SUBSYNC_DEVICE") {
            config.transcription.device = device;
        }
        if let Ok(format) = std::env::var("SUBSYNC_FORMAT") {
            if let Ok(f) = format.parse() {
                config.output.format = f;
            }
        }
        if let Ok(children) = std::env::var("SUBSYNC_CHILDREN") {
            if let Ok(c) = children.parse() {
                config.processing.is_children_content = c;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transcription.model.trim().is_empty() {
            return Err(SubsyncError::Config(
                "Whisper model name must not be empty".to_string(),
            ));
        }
        self.processing.validate()
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("subsync").join("config.toml"))
    }
}
