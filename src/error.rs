use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubsyncError {
    #[error("Invalid YouTube URL: {0}")]
    UrlParse(String),

    #[error("Video unavailable: {0}")]
    VideoUnavailable(String),

    #[error("Video is age-restricted: {0}")]
    AgeRestricted(String),

    #[error("Live streams are not supported: {0}")]
    LiveStream(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SubsyncError>;
