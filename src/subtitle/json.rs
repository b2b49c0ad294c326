// JSON subtitle format
use super::{Subtitle, SubtitleFormatter};
use serde::Serialize;

#[derive(Default)]
pub struct JsonFormatter {
    pub video_id: Option<String>,
    pub language: Option<String>,
}

#[derive(Serialize)]
struct JsonOutput {
    metadata: JsonMetadata,
    subtitles: Vec<JsonSubtitle>,
}

#[derive(Serialize)]
struct JsonMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    subtitle_count: usize,
}

#[derive(Serialize)]
struct JsonSubtitle {
    index: usize,
    start: f64,
    end: f64,
    start_formatted: String,
    end_formatted: String,
    lines: Vec<String>,
}

impl SubtitleFormatter for JsonFormatter {
    fn format(&self, subtitles: &[Subtitle]) -> String {
        let output = JsonOutput {
            metadata: JsonMetadata {
                video_id: self.video_id.clone(),
                language: self.language.clone(),
                subtitle_count: subtitles.len(),
            },
            subtitles: subtitles
                .iter()
                .map(|s| JsonSubtitle {
                    index: s.index,
                    start: s.start.as_secs_f64(),
                    end: s.end.as_secs_f64(),
                    start_formatted: format_timestamp(s.start),
                    end_formatted: format_timestamp(s.end),
                    lines: s.lines.clone(),
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

fn format_timestamp(d: std::time::Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}
