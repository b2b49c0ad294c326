//! Integration tests for subsync
//!
//! These tests exercise URL parsing, transcript loading, compliance
//! processing and formatting end to end, without touching the network or
//! external binaries.

use std::fs;
use std::time::Duration;
use subsync::config::{Config, OutputFormat};
use subsync::pipeline::{generate_subtitles, process_transcript};
use subsync::subtitle::processor::{ProcessingConfig, SubtitleProcessor};
use subsync::subtitle::{
    create_formatter, json::JsonFormatter, srt::SrtFormatter, vtt::VttFormatter, Subtitle,
    SubtitleFormatter,
};
use subsync::transcribe::{whisper, TranscriptSegment, TranscriptionResult, Word};
use subsync::youtube::parse_video_id;
use tempfile::TempDir;

fn segment(start_ms: u64, end_ms: u64, text: &str) -> TranscriptSegment {
    TranscriptSegment {
        start: Duration::from_millis(start_ms),
        end: Duration::from_millis(end_ms),
        text: text.to_string(),
        words: Vec::new(),
    }
}

fn word(text: &str, start_ms: u64, end_ms: u64) -> Word {
    Word {
        text: text.to_string(),
        start: Duration::from_millis(start_ms),
        end: Duration::from_millis(end_ms),
    }
}

fn processor() -> SubtitleProcessor {
    SubtitleProcessor::new(ProcessingConfig::default()).unwrap()
}

/// A short monologue with the usual rough edges: a blip, an overlong
/// narration, and text in more than one script.
fn messy_transcript() -> Vec<TranscriptSegment> {
    vec![
        segment(0, 400, "Hey."),
        segment(1500, 3500, "Welcome back to the channel, everyone watching."),
        segment(
            5000,
            16_000,
            "Today we are looking at how broadcasters keep subtitles readable, and why the rules exist at all.",
        ),
        segment(17_000, 18_200, "Let's dive in."),
        segment(19_000, 21_000, "日本語のテキストも正しく扱います。"),
        segment(22_000, 24_500, "That's all for now, thanks for watching!"),
    ]
}

// ============================================================================
// Config Integration Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();

        assert_eq!(config.output.format, OutputFormat::Srt);
        assert_eq!(config.transcription.model, "turbo");
        assert!(config.transcription.word_timestamps);
        assert_eq!(config.processing.max_chars_per_line, 42);
        assert_eq!(config.processing.max_lines, 2);
        assert_eq!(config.processing.min_duration_ms, 833);
        assert_eq!(config.processing.max_duration_ms, 7000);
        assert_eq!(config.processing.min_gap_ms, 83);
        assert_eq!(config.processing.max_cps_adult, 20.0);
        assert_eq!(config.processing.max_cps_children, 17.0);
        assert!(!config.processing.is_children_content);
    }

    #[test]
    fn test_output_format_extensions() {
        assert_eq!(OutputFormat::Srt.extension(), "srt");
        assert_eq!(OutputFormat::Vtt.extension(), "vtt");
        assert_eq!(OutputFormat::Json.extension(), "json");
    }

    #[test]
    fn test_config_rejects_empty_model() {
        let mut config = Config::default();
        config.transcription.model = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_rejects_bad_processing_limits() {
        let mut config = Config::default();
        config.processing.max_lines = 3;
        assert!(config.validate().is_err());
    }
}

// ============================================================================
// YouTube URL Tests
// ============================================================================

mod url_tests {
    use super::*;

    #[test]
    fn test_parse_common_url_forms() {
        let id = "dQw4w9WgXcQ";

        assert_eq!(
            parse_video_id(&format!("https://www.youtube.com/watch?v={id}")).unwrap(),
            id
        );
        assert_eq!(parse_video_id(&format!("https://youtu.be/{id}")).unwrap(), id);
        assert_eq!(
            parse_video_id(&format!("youtube.com/embed/{id}")).unwrap(),
            id
        );
    }

    #[test]
    fn test_parse_rejects_non_youtube() {
        assert!(parse_video_id("https://vimeo.com/123456").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_id() {
        assert!(parse_video_id("https://youtu.be/tooshort").is_err());
    }
}

// ============================================================================
// Whisper Transcript Loading Tests
// ============================================================================

const WHISPER_FIXTURE: &str = r#"{
    "text": " We finished the job. Tomorrow we start again.",
    "language": "en",
    "segments": [
        {
            "start": 0.0,
            "end": 2.4,
            "text": " We finished the job.",
            "words": [
                {"word": " We", "start": 0.0, "end": 0.4},
                {"word": " finished", "start": 0.5, "end": 1.1},
                {"word": " the", "start": 1.2, "end": 1.4},
                {"word": " job.", "start": 1.5, "end": 2.4}
            ]
        },
        {
            "start": 2.8,
            "end": 5.0,
            "text": " Tomorrow we start again."
        }
    ]
}"#;

mod transcript_loading_tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_load_whisper_json_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("video.json");
        fs::write(&path, WHISPER_FIXTURE).unwrap();

        let result = whisper::load_whisper_json(&path).unwrap();

        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.segments.len(), 2);
        assert_eq!(result.segments[0].text, "We finished the job.");
        assert_eq!(result.segments[0].words.len(), 4);
        assert_eq!(result.segments[0].words[0].text, "We");
        assert!(result.segments[1].words.is_empty());
        assert_eq!(result.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_load_missing_transcript() {
        assert!(whisper::load_whisper_json(Path::new("/no/such/file.json")).is_err());
    }
}

// ============================================================================
// Compliance Processing Tests
// ============================================================================

mod compliance_tests {
    use super::*;

    #[test]
    fn test_short_cue_extended() {
        let outcome = processor().process(&[segment(0, 500, "Hi")]);

        assert_eq!(outcome.subtitles.len(), 1);
        assert_eq!(outcome.subtitles[0].duration_ms(), 833);
        assert!(outcome.report.is_compliant);
    }

    #[test]
    fn test_tight_gap_shifts_later_cue() {
        let outcome = processor().process(&[
            segment(0, 2000, "First cue"),
            segment(2020, 4020, "Second cue"),
        ]);

        assert_eq!(outcome.subtitles[0].end, Duration::from_millis(2000));
        assert_eq!(outcome.subtitles[1].start, Duration::from_millis(2083));
        assert_eq!(outcome.subtitles[1].end, Duration::from_millis(4083));
    }

    #[test]
    fn test_split_follows_word_timestamps() {
        let words: Vec<Word> = [
            "We", "finished", "the", "job.", "Tomorrow", "we", "start", "again", "early",
            "morning",
        ]
        .iter()
        .enumerate()
        .map(|(i, w)| word(w, i as u64 * 1200, i as u64 * 1200 + 1000))
        .collect();

        let input = TranscriptSegment {
            start: Duration::ZERO,
            end: Duration::from_millis(12_000),
            text: "We finished the job. Tomorrow we start again early morning".to_string(),
            words,
        };

        let outcome = processor().process(&[input]);

        assert_eq!(outcome.subtitles.len(), 2);
        assert_eq!(outcome.subtitles[0].text(), "We finished the job.");
        // The cut lands on the recognized end of "job.", not a proportional guess.
        assert_eq!(outcome.subtitles[0].end, Duration::from_millis(4600));
        assert_eq!(outcome.subtitles[1].start, Duration::from_millis(4800));
    }

    #[test]
    fn test_reading_speed_fixed_when_room_allows() {
        let text = format!("{} {}", "a".repeat(20), "b".repeat(19));
        let outcome = processor().process(&[segment(0, 1000, &text)]);

        assert_eq!(outcome.subtitles[0].end, Duration::from_secs(2));
        assert_eq!(outcome.report.cps_warnings, 0);
    }

    #[test]
    fn test_reading_speed_warned_when_blocked() {
        let text = format!("{} {}", "a".repeat(20), "b".repeat(19));
        let outcome = processor().process(&[
            segment(0, 1000, &text),
            segment(1050, 2050, "Next cue follows closely"),
        ]);

        assert_eq!(outcome.report.cps_warnings, 1);
        assert_eq!(outcome.subtitles[0].end, Duration::from_millis(1000));
        // Advisory only: the run is still compliant.
        assert!(outcome.report.is_compliant);
    }

    #[test]
    fn test_two_line_break_lands_after_punctuation() {
        let outcome = processor().process(&[segment(
            0,
            4000,
            "Hello, world. This is a longer test for breaking lines.",
        )]);

        let subtitle = &outcome.subtitles[0];
        assert_eq!(subtitle.lines.len(), 2);
        assert_eq!(subtitle.lines[0], "Hello, world.");
        assert_eq!(subtitle.lines[1], "This is a longer test for breaking lines.");
    }

    #[test]
    fn test_indices_contiguous_after_splits() {
        let long = "Today we are looking at how broadcasters keep subtitles readable, and why the rules exist at all.";
        let outcome = processor().process(&[
            segment(0, 2000, "Intro line"),
            segment(3000, 14_000, long),
            segment(15_000, 17_000, "Outro line"),
        ]);

        let indices: Vec<usize> = outcome.subtitles.iter().map(|s| s.index).collect();
        let expected: Vec<usize> = (1..=outcome.subtitles.len()).collect();
        assert_eq!(indices, expected);
        assert!(outcome.subtitles.len() > 3);
    }

    #[test]
    fn test_malformed_segment_reported() {
        let outcome = processor().process(&[
            segment(1000, 1000, "Zero length"),
            segment(2000, 3000, "Fine"),
        ]);

        assert_eq!(outcome.subtitles.len(), 1);
        assert_eq!(outcome.report.errors.len(), 1);
        assert!(!outcome.report.is_compliant);
    }

    #[test]
    fn test_all_style_limits_hold_on_messy_input() {
        let outcome = processor().process(&messy_transcript());
        assert!(outcome.report.is_compliant);
        assert!(!outcome.subtitles.is_empty());

        for subtitle in &outcome.subtitles {
            assert!(subtitle.lines.len() <= 2, "cue {} has too many lines", subtitle.index);
            for line in &subtitle.lines {
                assert!(
                    line.chars().count() <= 42,
                    "cue {} line too long: {line:?}",
                    subtitle.index
                );
            }
            assert!(subtitle.duration_ms() >= 833, "cue {} too short", subtitle.index);
            assert!(subtitle.duration_ms() <= 7000, "cue {} too long", subtitle.index);
        }

        for pair in outcome.subtitles.windows(2) {
            let gap = pair[1].start.saturating_sub(pair[0].end);
            assert!(
                gap >= Duration::from_millis(83),
                "gap between cues {} and {} is only {:?}",
                pair[0].index,
                pair[1].index,
                gap
            );
        }
    }

    #[test]
    fn test_processing_is_idempotent() {
        let first = processor().process(&messy_transcript());

        let refed: Vec<TranscriptSegment> = first
            .subtitles
            .iter()
            .map(|s| TranscriptSegment {
                start: s.start,
                end: s.end,
                text: s.lines.join(" "),
                words: Vec::new(),
            })
            .collect();
        let second = processor().process(&refed);

        assert_eq!(second.subtitles.len(), first.subtitles.len());
        for (a, b) in first.subtitles.iter().zip(&second.subtitles) {
            assert_eq!(a.start, b.start);
            assert_eq!(a.end, b.end);
            assert_eq!(a.lines, b.lines);
        }
        assert!(second.report.is_compliant);
    }
}

// ============================================================================
// Subtitle Formatter Tests
// ============================================================================

mod formatter_tests {
    use super::*;

    fn sample_subtitles() -> Vec<Subtitle> {
        vec![
            Subtitle {
                index: 1,
                start: Duration::from_millis(1500),
                end: Duration::from_millis(4000),
                lines: vec!["Hello, welcome to this video.".to_string()],
            },
            Subtitle {
                index: 2,
                start: Duration::from_millis(4500),
                end: Duration::from_millis(7000),
                lines: vec![
                    "Today we're going to learn".to_string(),
                    "about subtitle compliance.".to_string(),
                ],
            },
        ]
    }

    #[test]
    fn test_srt_formatter_integration() {
        let output = SrtFormatter.format(&sample_subtitles());

        assert!(output.starts_with("1\n"));
        assert!(output.contains("00:00:01,500 --> 00:00:04,000"));
        assert!(output.contains("Hello, welcome to this video."));
        assert!(output.contains("Today we're going to learn\nabout subtitle compliance."));
        assert_eq!(SrtFormatter.extension(), "srt");
    }

    #[test]
    fn test_vtt_formatter_integration() {
        let output = VttFormatter.format(&sample_subtitles());

        assert!(output.starts_with("WEBVTT\n"));
        assert!(output.contains("00:00:01.500 --> 00:00:04.000"));
        assert!(output.contains("Hello, welcome to this video."));
        assert_eq!(VttFormatter.extension(), "vtt");
    }

    #[test]
    fn test_json_formatter_integration() {
        let formatter = JsonFormatter {
            video_id: Some("dQw4w9WgXcQ".to_string()),
            language: Some("en".to_string()),
        };
        let output = formatter.format(&sample_subtitles());

        assert!(output.contains("\"metadata\""));
        assert!(output.contains("\"video_id\": \"dQw4w9WgXcQ\""));
        assert!(output.contains("\"language\": \"en\""));
        assert!(output.contains("\"subtitle_count\": 2"));
        assert!(output.contains("\"subtitles\""));
        assert_eq!(formatter.extension(), "json");
    }

    #[test]
    fn test_create_formatter_factory() {
        assert_eq!(create_formatter(OutputFormat::Srt).extension(), "srt");
        assert_eq!(create_formatter(OutputFormat::Vtt).extension(), "vtt");
        assert_eq!(create_formatter(OutputFormat::Json).extension(), "json");
    }
}

// ============================================================================
// Pipeline Tests
// ============================================================================

mod pipeline_tests {
    use super::*;

    #[test]
    fn test_process_transcript_writes_srt() {
        let temp = TempDir::new().unwrap();
        let transcript = TranscriptionResult {
            language: Some("en".to_string()),
            duration: Duration::from_millis(4500),
            segments: vec![
                segment(500, 3000, "Welcome to the tutorial."),
                segment(3500, 4500, "Let's begin."),
            ],
        };

        let mut config = Config::default();
        config.output.output_path = Some(temp.path().join("out.srt"));

        let (path, subtitles, report) =
            process_transcript(&transcript, Some("dQw4w9WgXcQ"), &config).unwrap();

        assert_eq!(subtitles.len(), 2);
        assert!(report.is_compliant);

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("00:00:00,500 --> 00:00:03,000"));
        assert!(content.contains("Welcome to the tutorial."));
    }

    #[tokio::test]
    async fn test_generate_from_whisper_json() {
        let temp = TempDir::new().unwrap();
        let transcript_path = temp.path().join("video.json");
        fs::write(&transcript_path, WHISPER_FIXTURE).unwrap();

        let mut config = Config::default();
        config.output.output_path = Some(temp.path().join("out.srt"));

        let result = generate_subtitles(transcript_path.to_str().unwrap(), &config, false)
            .await
            .unwrap();

        assert!(result.output_path.exists());
        assert_eq!(result.subtitles.len(), 2);
        assert!(result.report.is_compliant);
        assert_eq!(result.stats.segments_transcribed, 2);

        let content = fs::read_to_string(&result.output_path).unwrap();
        assert!(content.contains(" --> "));
        assert!(content.contains("We finished the job."));
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_url() {
        let config = Config::default();
        let result = generate_subtitles("https://example.com/video", &config, false).await;
        assert!(result.is_err());
    }
}

// ============================================================================
// Edge Case Tests
// ============================================================================

mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_transcript() {
        let outcome = processor().process(&[]);

        assert!(outcome.subtitles.is_empty());
        assert!(outcome.report.is_compliant);

        let output = SrtFormatter.format(&outcome.subtitles);
        assert!(output.is_empty());
    }

    #[test]
    fn test_whitespace_only_segments_skipped() {
        let outcome = processor().process(&[
            segment(0, 1000, "   "),
            segment(1500, 2500, "Real text"),
        ]);

        assert_eq!(outcome.subtitles.len(), 1);
        assert_eq!(outcome.subtitles[0].text(), "Real text");
    }

    #[test]
    fn test_unicode_text_survives_formatting() {
        let outcome = processor().process(&[
            segment(0, 2000, "日本語テスト"),
            segment(3000, 5000, "🎬 Emoji support"),
        ]);
        let output = SrtFormatter.format(&outcome.subtitles);

        assert!(output.contains("日本語テスト"));
        assert!(output.contains("🎬 Emoji support"));
    }

    #[test]
    fn test_unbreakable_token_truncated_not_dropped() {
        let outcome = processor().process(&[segment(0, 3000, &"x".repeat(60))]);

        assert_eq!(outcome.subtitles.len(), 1);
        assert_eq!(outcome.subtitles[0].lines[0].chars().count(), 42);
        assert!(outcome.subtitles[0].lines[0].ends_with('…'));
        assert_eq!(outcome.report.line_length_issues, 1);
    }

    #[test]
    fn test_overlong_unsplittable_cue_keeps_warning() {
        let outcome = processor().process(&[segment(0, 10_000, "mmmmmmmm")]);

        assert_eq!(outcome.subtitles.len(), 1);
        assert_eq!(outcome.report.timing_issues, 1);
        assert!(outcome.report.is_compliant);
    }
}
