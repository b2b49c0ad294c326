pub mod json;
pub mod linebreak;
pub mod processor;
pub mod reading_speed;
pub mod srt;
pub mod timing;
pub mod vtt;

use crate::config::OutputFormat;
use std::time::Duration;

/// One displayed subtitle event: a time range and one or two lines of text.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    pub index: usize,
    pub start: Duration,
    pub end: Duration,
    pub lines: Vec<String>,
}

impl Subtitle {
    /// Characters across all lines, counted as user-perceived characters.
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|line| line.chars().count()).sum()
    }

    pub fn duration_ms(&self) -> u64 {
        self.end.saturating_sub(self.start).as_millis() as u64
    }

    /// Reading speed in characters per second; 0 for a zero-length cue.
    pub fn cps(&self) -> f64 {
        let seconds = self.end.saturating_sub(self.start).as_secs_f64();
        if seconds == 0.0 {
            return 0.0;
        }
        self.char_count() as f64 / seconds
    }

    /// Display text with lines joined by a newline.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

pub trait SubtitleFormatter {
    fn format(&self, subtitles: &[Subtitle]) -> String;
    fn extension(&self) -> &'static str;
}

pub fn create_formatter(format: OutputFormat) -> Box<dyn SubtitleFormatter> {
    match format {
        OutputFormat::Srt => Box::new(srt::SrtFormatter),
        OutputFormat::Vtt => Box::new(vtt::VttFormatter),
        OutputFormat::Json => Box::new(json::JsonFormatter::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subtitle(lines: &[&str], start_ms: u64, end_ms: u64) -> Subtitle {
        Subtitle {
            index: 1,
            start: Duration::from_millis(start_ms),
            end: Duration::from_millis(end_ms),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_char_count_single_line() {
        let sub = subtitle(&["Hello world"], 0, 1000);
        assert_eq!(sub.char_count(), 11);
    }

    #[test]
    fn test_char_count_two_lines() {
        let sub = subtitle(&["Hello world,", "how are you?"], 0, 1000);
        assert_eq!(sub.char_count(), 24);
    }

    #[test]
    fn test_duration_ms() {
        let sub = subtitle(&["text"], 1000, 3500);
        assert_eq!(sub.duration_ms(), 2500);
    }

    #[test]
    fn test_cps() {
        let sub = subtitle(&["Hello world"], 0, 2000);
        assert_eq!(sub.cps(), 5.5);
    }

    #[test]
    fn test_cps_zero_duration() {
        let sub = subtitle(&["Hello"], 1000, 1000);
        assert_eq!(sub.cps(), 0.0);
    }

    #[test]
    fn test_text_joins_lines() {
        let sub = subtitle(&["first", "second"], 0, 1000);
        assert_eq!(sub.text(), "first\nsecond");
    }
}
