//! Cue timing rules: duration bounds, inter-cue gaps, and splitting of
//! over-long transcript segments.

use super::linebreak::{select_boundary, tokenize, TokenBoundary};
use super::processor::ProcessingConfig;
use crate::transcribe::TranscriptSegment;
use std::time::Duration;

/// Result of checking one candidate cue against the timing rules.
#[derive(Debug, Clone)]
pub struct TimingCheck {
    pub is_valid: bool,
    pub duration_ok: bool,
    pub gap_ok: bool,
    pub issues: Vec<String>,
}

/// Enforces duration and gap bounds and splits segments that cannot satisfy
/// the maximum-duration bound as a single cue.
#[derive(Debug, Clone)]
pub struct TimingProcessor {
    config: ProcessingConfig,
}

impl TimingProcessor {
    pub fn new(config: &ProcessingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Check a candidate's duration and its gap from the previous cue.
    pub fn check_timing(
        &self,
        start: Duration,
        end: Duration,
        previous_end: Option<Duration>,
    ) -> TimingCheck {
        let duration_ms = ms(end.saturating_sub(start));
        let mut issues = Vec::new();

        let mut duration_ok = true;
        if duration_ms < self.config.min_duration_ms {
            duration_ok = false;
            issues.push(format!(
                "Duration too short: {}ms < {}ms",
                duration_ms, self.config.min_duration_ms
            ));
        } else if duration_ms > self.config.max_duration_ms {
            duration_ok = false;
            issues.push(format!(
                "Duration too long: {}ms > {}ms",
                duration_ms, self.config.max_duration_ms
            ));
        }

        let mut gap_ok = true;
        if let Some(previous_end) = previous_end {
            let required = previous_end + Duration::from_millis(self.config.min_gap_ms);
            if start < required {
                gap_ok = false;
                let gap_ms = ms(start.saturating_sub(previous_end));
                issues.push(format!(
                    "Gap too small: {}ms < {}ms",
                    gap_ms, self.config.min_gap_ms
                ));
            }
        }

        TimingCheck {
            is_valid: duration_ok && gap_ok,
            duration_ok,
            gap_ok,
            issues,
        }
    }

    /// Extend a too-short cue to the minimum duration, without running into
    /// the next segment.
    pub fn extend_to_minimum(
        &self,
        start: Duration,
        end: Duration,
        next_start: Option<Duration>,
    ) -> (Duration, Duration) {
        let min = Duration::from_millis(self.config.min_duration_ms);
        if end.saturating_sub(start) >= min {
            return (start, end);
        }

        let mut new_end = start + min;
        if let Some(next_start) = next_start {
            if new_end > next_start {
                // Extend only up to the next segment; never shrink.
                new_end = next_start.max(end);
            }
        }
        (start, new_end)
    }

    /// Push a cue forward so it leaves the minimum gap after the previous
    /// cue, preserving its duration where the maximum bound allows.
    pub fn enforce_gap(
        &self,
        start: Duration,
        end: Duration,
        previous_end: Duration,
    ) -> (Duration, Duration) {
        let earliest = previous_end + Duration::from_millis(self.config.min_gap_ms);
        if start >= earliest {
            return (start, end);
        }

        let delta = earliest - start;
        let new_start = earliest;
        let mut new_end = end + delta;

        let max = Duration::from_millis(self.config.max_duration_ms);
        if new_end.saturating_sub(new_start) > max {
            new_end = new_start + max;
        }
        (new_start, new_end)
    }

    /// Split a segment into enough pieces that each can satisfy the
    /// maximum-duration bound and carry its text in a single cue.
    ///
    /// Returns the segment unchanged when no split is possible (single
    /// token) or needed.
    pub fn split_segment(&self, segment: &TranscriptSegment) -> Vec<TranscriptSegment> {
        let duration_ms = ms(segment.duration());
        let max_ms = self.config.max_duration_ms.max(1);
        let by_time = (duration_ms + max_ms - 1) / max_ms;

        let char_count = segment.text.trim().chars().count() as u64;
        let max_chars = (self.config.max_chars_per_line * self.config.max_lines).max(1) as u64;
        let by_text = (char_count + max_chars - 1) / max_chars;

        let pieces = by_time.max(by_text).max(1) as usize;
        self.split_into(segment, pieces)
    }

    /// Force a two-way split, used when a piece's text cannot be wrapped
    /// within the line limits at any eligible break point.
    pub fn split_in_half(&self, segment: &TranscriptSegment) -> Vec<TranscriptSegment> {
        self.split_into(segment, 2)
    }

    fn split_into(&self, segment: &TranscriptSegment, pieces: usize) -> Vec<TranscriptSegment> {
        if pieces < 2 {
            return vec![segment.clone()];
        }

        let text = segment.text.trim();
        let tokenized = tokenize(text);
        if tokenized.tokens.len() < 2 {
            return vec![segment.clone()];
        }

        let duration_ms = ms(segment.duration());
        let char_count = text.chars().count().max(1) as u64;
        // Word timestamps are usable only when they line up one-to-one with
        // the whitespace tokens of the text.
        let aligned = segment.words.len() == tokenized.tokens.len();

        // Position of every token boundary along the segment's duration.
        let positions: Vec<u64> = tokenized
            .boundaries
            .iter()
            .map(|b| {
                if aligned {
                    ms(segment.words[b.left_token]
                        .end
                        .saturating_sub(segment.start))
                } else {
                    duration_ms * b.char_offset as u64 / char_count
                }
            })
            .collect();

        let slice_ms = duration_ms / pieces as u64;
        let window = slice_ms * 2 / 5;

        let mut cuts: Vec<usize> = Vec::new();
        for k in 1..pieces {
            let ideal = duration_ms * k as u64 / pieces as u64;
            let from = cuts.last().map(|i| i + 1).unwrap_or(0);

            let candidates: Vec<(TokenBoundary, u64)> = (from..tokenized.boundaries.len())
                .filter(|&i| positions[i].abs_diff(ideal) <= window)
                .map(|i| (tokenized.boundaries[i], positions[i]))
                .collect();

            // Boundary index i sits between tokens i and i+1, so the chosen
            // boundary's left token doubles as its index.
            let chosen = select_boundary(&candidates, ideal)
                .map(|b| b.left_token)
                .or_else(|| {
                    // Nothing classified inside the window: nearest remaining
                    // boundary regardless of class.
                    (from..tokenized.boundaries.len())
                        .min_by_key(|&i| positions[i].abs_diff(ideal))
                });

            match chosen {
                Some(i) => cuts.push(i),
                None => break,
            }
        }

        if cuts.is_empty() {
            return vec![segment.clone()];
        }

        let mut result = Vec::with_capacity(cuts.len() + 1);
        let mut token_from = 0usize;
        let mut byte_from = 0usize;
        let mut time_from = segment.start;

        for &cut in &cuts {
            let boundary = tokenized.boundaries[cut];
            let piece_end = if aligned {
                segment.words[cut].end
            } else {
                segment.start + Duration::from_millis(positions[cut])
            };
            let piece_start = if aligned {
                segment.words[token_from].start
            } else {
                time_from
            };

            result.push(TranscriptSegment {
                start: piece_start,
                end: piece_end,
                text: text[byte_from..boundary.byte_offset].trim().to_string(),
                words: if aligned {
                    segment.words[token_from..=cut].to_vec()
                } else {
                    Vec::new()
                },
            });

            token_from = cut + 1;
            byte_from = boundary.byte_offset;
            time_from = piece_end;
        }

        let piece_start = if aligned {
            segment.words[token_from].start
        } else {
            time_from
        };
        let piece_end = if aligned {
            segment.words[segment.words.len() - 1].end
        } else {
            segment.end
        };
        result.push(TranscriptSegment {
            start: piece_start,
            end: piece_end,
            text: text[byte_from..].trim().to_string(),
            words: if aligned {
                segment.words[token_from..].to_vec()
            } else {
                Vec::new()
            },
        });

        result
    }
}

fn ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}
