//! The compliance processor: drives timing adjustment, line breaking and
//! reading-speed validation over a transcription and aggregates the result
//! into a report.

use super::linebreak::LineBreaker;
use super::reading_speed::ReadingSpeedValidator;
use super::timing::TimingProcessor;
use super::Subtitle;
use crate::error::{Result, SubsyncError};
use crate::transcribe::TranscriptSegment;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::debug;

/// Style-guide limits applied to every cue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Hard wrap width per line (default: 42).
    pub max_chars_per_line: usize,
    /// Lines per cue (default: 2).
    pub max_lines: usize,
    /// Cues shorter than this are extended (default: 833).
    pub min_duration_ms: u64,
    /// Segments longer than this are split (default: 7000).
    pub max_duration_ms: u64,
    /// Minimum silence between consecutive cues (default: 83).
    pub min_gap_ms: u64,
    /// Reading-speed ceiling for general content (default: 20.0).
    pub max_cps_adult: f64,
    /// Reading-speed ceiling for children's content (default: 17.0).
    pub max_cps_children: f64,
    /// Apply the children's reading-speed ceiling.
    pub is_children_content: bool,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_chars_per_line: 42,
            max_lines: 2,
            min_duration_ms: 833,
            max_duration_ms: 7000,
            min_gap_ms: 83,
            max_cps_adult: 20.0,
            max_cps_children: 17.0,
            is_children_content: false,
        }
    }
}

impl ProcessingConfig {
    /// The reading-speed ceiling for the configured audience.
    pub fn max_cps(&self) -> f64 {
        if self.is_children_content {
            self.max_cps_children
        } else {
            self.max_cps_adult
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chars_per_line == 0 {
            return Err(SubsyncError::Config(
                "max_chars_per_line must be at least 1".to_string(),
            ));
        }
        if self.max_lines == 0 || self.max_lines > 2 {
            return Err(SubsyncError::Config(
                "max_lines must be 1 or 2".to_string(),
            ));
        }
        if self.max_duration_ms == 0 {
            return Err(SubsyncError::Config(
                "max_duration_ms must be positive".to_string(),
            ));
        }
        if self.min_duration_ms > self.max_duration_ms {
            return Err(SubsyncError::Config(format!(
                "min_duration_ms ({}) exceeds max_duration_ms ({})",
                self.min_duration_ms, self.max_duration_ms
            )));
        }
        if self.max_cps_adult <= 0.0 || self.max_cps_children <= 0.0 {
            return Err(SubsyncError::Config(
                "reading-speed limits must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Aggregate count and classification of every rule deviation found while
/// processing. Warnings never block compliance; errors do.
#[derive(Debug, Clone, Default)]
pub struct ComplianceReport {
    pub total_subtitles: usize,
    pub timing_issues: usize,
    pub cps_warnings: usize,
    pub line_length_issues: usize,
    pub is_compliant: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Cues plus the compliance report for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    pub subtitles: Vec<Subtitle>,
    pub report: ComplianceReport,
}

/// Turns transcript segments into compliant subtitle cues.
pub struct SubtitleProcessor {
    config: ProcessingConfig,
    timing: TimingProcessor,
    breaker: LineBreaker,
    speed: ReadingSpeedValidator,
}

impl SubtitleProcessor {
    /// Fails on a nonsensical configuration before touching any segment.
    pub fn new(config: ProcessingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            timing: TimingProcessor::new(&config),
            breaker: LineBreaker::new(config.max_chars_per_line, config.max_lines),
            speed: ReadingSpeedValidator::new(&config),
            config,
        })
    }

    /// Process segments in order into numbered cues plus a report.
    ///
    /// Malformed segments are excluded and reported; everything else
    /// degrades to warnings, so this always produces a full cue list.
    pub fn process(&self, segments: &[TranscriptSegment]) -> ProcessingOutcome {
        let mut subtitles: Vec<Subtitle> = Vec::new();
        let mut report = ComplianceReport::default();
        let mut previous_end: Option<Duration> = None;
        let max_duration = Duration::from_millis(self.config.max_duration_ms);

        for (position, segment) in segments.iter().enumerate() {
            if segment.text.trim().is_empty() {
                continue;
            }
            if segment.end <= segment.start {
                report.errors.push(format!(
                    "Segment {}: end ({}ms) is not after start ({}ms)",
                    position + 1,
                    segment.end.as_millis(),
                    segment.start.as_millis()
                ));
                continue;
            }

            let next_segment_start = segments.get(position + 1).map(|s| s.start);

            let mut queue: VecDeque<TranscriptSegment> = VecDeque::new();
            queue.push_back(segment.clone());

            while let Some(candidate) = queue.pop_front() {
                if candidate.duration() > max_duration || self.breaker.needs_split(&candidate.text)
                {
                    let pieces = self.timing.split_segment(&candidate);
                    if pieces.len() > 1 {
                        debug!(
                            "Split segment {} into {} pieces",
                            position + 1,
                            pieces.len()
                        );
                        for piece in pieces.into_iter().rev() {
                            queue.push_front(piece);
                        }
                        continue;
                    }
                }

                let segmented = self.breaker.segment(&candidate.text);
                if !segmented.fits {
                    // The text has no eligible break that keeps both lines
                    // legal; carry it as two cues instead.
                    let halves = self.timing.split_in_half(&candidate);
                    if halves.len() > 1 {
                        for piece in halves.into_iter().rev() {
                            queue.push_front(piece);
                        }
                        continue;
                    }
                }

                let next_start = queue.front().map(|s| s.start).or(next_segment_start);

                let (start, end) =
                    self.timing
                        .extend_to_minimum(candidate.start, candidate.end, next_start);
                let (start, end) = match previous_end {
                    Some(previous) => self.timing.enforce_gap(start, end, previous),
                    None => (start, end),
                };

                let mut subtitle = Subtitle {
                    index: subtitles.len() + 1,
                    start,
                    end,
                    lines: segmented.lines,
                };

                if segmented.truncated {
                    report.line_length_issues += 1;
                    report.warnings.push(format!(
                        "Subtitle {}: token longer than {} characters was truncated",
                        subtitle.index, self.config.max_chars_per_line
                    ));
                }

                if let Some(message) = self.speed.validate(&subtitle) {
                    match self.speed.suggest_extension(&subtitle, next_start) {
                        Some(new_end) => {
                            debug!(
                                "Subtitle {}: extended to {}ms to meet reading speed",
                                subtitle.index,
                                new_end.as_millis()
                            );
                            subtitle.end = new_end;
                        }
                        None => {
                            report.cps_warnings += 1;
                            report
                                .warnings
                                .push(format!("Subtitle {}: {}", subtitle.index, message));
                        }
                    }
                }

                let check = self.timing.check_timing(subtitle.start, subtitle.end, previous_end);
                if !check.is_valid {
                    report.timing_issues += 1;
                    for issue in check.issues {
                        report
                            .warnings
                            .push(format!("Subtitle {}: {}", subtitle.index, issue));
                    }
                }

                previous_end = Some(subtitle.end);
                subtitles.push(subtitle);
            }
        }

        report.total_subtitles = subtitles.len();
        report.is_compliant = report.errors.is_empty();
        ProcessingOutcome { subtitles, report }
    }
}
