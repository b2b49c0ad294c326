//! Reading-speed checks. Advisory only: a too-fast cue is reported, never
//! dropped, and fixes only ever lengthen the cue.

use super::processor::ProcessingConfig;
use super::Subtitle;
use std::time::Duration;

/// Checks cues against a characters-per-second ceiling and proposes
/// non-destructive duration extensions.
#[derive(Debug, Clone)]
pub struct ReadingSpeedValidator {
    max_cps: f64,
    max_duration: Duration,
    min_gap: Duration,
}

impl ReadingSpeedValidator {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            max_cps: config.max_cps(),
            max_duration: Duration::from_millis(config.max_duration_ms),
            min_gap: Duration::from_millis(config.min_gap_ms),
        }
    }

    pub fn reading_speed(&self, subtitle: &Subtitle) -> f64 {
        subtitle.cps()
    }

    /// Returns a warning message when the cue reads faster than the ceiling.
    pub fn validate(&self, subtitle: &Subtitle) -> Option<String> {
        let cps = subtitle.cps();
        if cps > self.max_cps {
            Some(format!(
                "Reading speed too high: {:.1} CPS (max: {:.1})",
                cps, self.max_cps
            ))
        } else {
            None
        }
    }

    /// The end time that would bring the cue's reading speed exactly to the
    /// ceiling, if it can be applied without breaking the other bounds.
    pub fn suggest_extension(
        &self,
        subtitle: &Subtitle,
        next_start: Option<Duration>,
    ) -> Option<Duration> {
        let chars = subtitle.char_count();
        if chars == 0 || self.max_cps <= 0.0 {
            return None;
        }

        let required = Duration::from_secs_f64(chars as f64 / self.max_cps);
        if required > self.max_duration {
            return None;
        }

        let new_end = subtitle.start + required;
        if new_end <= subtitle.end {
            return None;
        }
        if let Some(next_start) = next_start {
            if new_end + self.min_gap > next_start {
                return None;
            }
        }
        Some(new_end)
    }
}
