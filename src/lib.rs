pub mod config;
pub mod error;
pub mod pipeline;
pub mod subtitle;
pub mod transcribe;
pub mod youtube;

pub use config::Config;
pub use error::{Result, SubsyncError};
pub use pipeline::{generate_subtitles, print_summary, PipelineResult, PipelineStats};
