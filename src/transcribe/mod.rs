pub mod whisper;

pub use whisper::WhisperCommand;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

/// One recognized word with its time range, as reported by the transcriber.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub start: Duration,
    pub end: Duration,
}

/// One speech-recognized unit of transcript text. `words` is empty when the
/// transcriber did not produce word-level timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub start: Duration,
    pub end: Duration,
    pub text: String,
    pub words: Vec<Word>,
}

impl TranscriptSegment {
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub language: Option<String>,
    pub duration: Duration,
    pub segments: Vec<TranscriptSegment>,
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<TranscriptionResult>;
    fn name(&self) -> &'static str;
}
