// SRT subtitle format
use super::{Subtitle, SubtitleFormatter};

pub struct SrtFormatter;

impl SubtitleFormatter for SrtFormatter {
    fn format(&self, subtitles: &[Subtitle]) -> String {
        subtitles
            .iter()
            .map(|subtitle| {
                format!(
                    "{}\n{} --> {}\n{}\n",
                    subtitle.index,
                    format_timestamp(subtitle.start),
                    format_timestamp(subtitle.end),
                    subtitle.text()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn extension(&self) -> &'static str {
        "srt"
    }
}

fn format_timestamp(d: std::time::Duration) -> String {
    let total_secs = d.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = d.subsec_millis();
    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}
