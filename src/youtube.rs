//! YouTube URL handling and media acquisition via yt-dlp.

use crate::error::{Result, SubsyncError};
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "www.youtube.com", "youtu.be"];

/// Metadata for one video, as reported by yt-dlp.
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub duration: Duration,
    pub uploader: Option<String>,
    pub upload_date: Option<String>,
}

/// Extract and validate the 11-character video id from a YouTube URL.
///
/// Accepts `youtu.be/<id>`, `youtube.com/watch?v=<id>`,
/// `youtube.com/embed/<id>` and `youtube.com/v/<id>`, with or without a
/// scheme.
pub fn parse_video_id(url: &str) -> Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(SubsyncError::UrlParse("URL is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let parsed = Url::parse(&with_scheme)
        .map_err(|e| SubsyncError::UrlParse(format!("Invalid URL format: {e}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| SubsyncError::UrlParse("Invalid URL format: missing host".to_string()))?;
    if !YOUTUBE_HOSTS.contains(&host) {
        return Err(SubsyncError::UrlParse(format!(
            "{host} is not a YouTube URL"
        )));
    }

    let candidate = if host == "youtu.be" {
        parsed
            .path()
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string()
    } else if parsed.path() == "/watch" {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
            .ok_or_else(|| {
                SubsyncError::UrlParse("Missing v parameter in watch URL".to_string())
            })?
    } else if let Some(rest) = parsed.path().strip_prefix("/embed/") {
        rest.split('/').next().unwrap_or_default().to_string()
    } else if let Some(rest) = parsed.path().strip_prefix("/v/") {
        rest.split('/').next().unwrap_or_default().to_string()
    } else {
        return Err(SubsyncError::UrlParse(format!(
            "Unsupported YouTube URL path: {}",
            parsed.path()
        )));
    };

    let id_pattern = Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("Invalid regex");
    if !id_pattern.is_match(&candidate) {
        return Err(SubsyncError::UrlParse(format!(
            "Invalid video id '{candidate}': expected 11 characters of [A-Za-z0-9_-]"
        )));
    }

    Ok(candidate)
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Check that yt-dlp is installed and accessible.
pub fn check_ytdlp() -> Result<()> {
    let output = Command::new("yt-dlp")
        .arg("--version")
        .output()
        .map_err(|e| {
            SubsyncError::Download(format!(
                "yt-dlp not found. Please install yt-dlp and ensure it's in your PATH. Error: {e}"
            ))
        })?;

    if !output.status.success() {
        return Err(SubsyncError::Download("yt-dlp check failed".to_string()));
    }

    debug!("yt-dlp is available");
    Ok(())
}

#[derive(Debug, Deserialize)]
struct YtDlpMetadata {
    id: String,
    title: String,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    uploader: Option<String>,
    #[serde(default)]
    upload_date: Option<String>,
    #[serde(default)]
    is_live: Option<bool>,
}

/// Fetch video metadata without downloading anything.
pub async fn fetch_metadata(video_id: &str) -> Result<VideoMetadata> {
    check_ytdlp()?;

    info!("Fetching metadata for video {video_id}");
    let output = Command::new("yt-dlp")
        .args(["--dump-json", "--no-playlist", "--no-warnings"])
        .arg(watch_url(video_id))
        .output()
        .map_err(|e| SubsyncError::Download(format!("Failed to run yt-dlp: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_download_error(video_id, &stderr));
    }

    let metadata: YtDlpMetadata = serde_json::from_slice(&output.stdout)?;
    if metadata.is_live.unwrap_or(false) {
        return Err(SubsyncError::LiveStream(video_id.to_string()));
    }

    Ok(VideoMetadata {
        id: metadata.id,
        title: metadata.title,
        duration: metadata
            .duration
            .map(Duration::from_secs_f64)
            .unwrap_or_default(),
        uploader: metadata.uploader,
        upload_date: metadata.upload_date,
    })
}

/// Download the video's audio track as WAV into `dest_dir`.
pub async fn download_audio(video_id: &str, dest_dir: &Path) -> Result<PathBuf> {
    check_ytdlp()?;

    let output_path = dest_dir.join(format!("{video_id}.wav"));
    info!("Downloading audio for video {video_id}");

    let output = Command::new("yt-dlp")
        .args([
            "--no-playlist",
            "--no-warnings",
            "-x",
            "--audio-format",
            "wav",
            "-o",
        ])
        .arg(dest_dir.join(format!("{video_id}.%(ext)s")))
        .arg(watch_url(video_id))
        .output()
        .map_err(|e| SubsyncError::Download(format!("Failed to run yt-dlp: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_download_error(video_id, &stderr));
    }

    if !output_path.exists() {
        return Err(SubsyncError::Download(
            "yt-dlp did not produce an audio file".to_string(),
        ));
    }

    debug!("Audio downloaded to {}", output_path.display());
    Ok(output_path)
}

/// Map yt-dlp's stderr onto the availability error taxonomy.
fn classify_download_error(video_id: &str, stderr: &str) -> SubsyncError {
    let lower = stderr.to_lowercase();

    if lower.contains("private video")
        || lower.contains("video unavailable")
        || lower.contains("has been removed")
        || lower.contains("not available in your country")
    {
        SubsyncError::VideoUnavailable(video_id.to_string())
    } else if lower.contains("age-restricted") || lower.contains("confirm your age") {
        SubsyncError::AgeRestricted(video_id.to_string())
    } else if lower.contains("live event") || lower.contains("this video is live") {
        SubsyncError::LiveStream(video_id.to_string())
    } else {
        let reason = stderr.lines().last().unwrap_or("unknown error").trim();
        SubsyncError::Download(format!("{video_id}: {reason}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIDEO_ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn test_parse_watch_url() {
        let url = format!("https://www.youtube.com/watch?v={VIDEO_ID}");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_short_url() {
        let url = format!("https://youtu.be/{VIDEO_ID}");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_embed_url() {
        let url = format!("https://www.youtube.com/embed/{VIDEO_ID}");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_v_url() {
        let url = format!("https://youtube.com/v/{VIDEO_ID}");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_without_scheme() {
        let url = format!("youtube.com/watch?v={VIDEO_ID}");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_with_extra_query_params() {
        let url = format!("https://www.youtube.com/watch?v={VIDEO_ID}&t=42s");
        assert_eq!(parse_video_id(&url).unwrap(), VIDEO_ID);

        let short = format!("https://youtu.be/{VIDEO_ID}?t=42");
        assert_eq!(parse_video_id(&short).unwrap(), VIDEO_ID);
    }

    #[test]
    fn test_parse_empty_url() {
        let err = parse_video_id("  ").unwrap_err();
        assert!(err.to_string().contains("URL is empty"));
    }

    #[test]
    fn test_parse_rejects_other_hosts() {
        let err = parse_video_id("https://vimeo.com/123456").unwrap_err();
        assert!(err.to_string().contains("not a YouTube URL"));
    }

    #[test]
    fn test_parse_rejects_short_id() {
        let err = parse_video_id("https://youtu.be/shortid").unwrap_err();
        assert!(err.to_string().contains("11 characters"));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert!(parse_video_id("https://youtu.be/bad*chars!!").is_err());
    }

    #[test]
    fn test_parse_missing_v_parameter() {
        let err = parse_video_id("https://www.youtube.com/watch?list=PL123").unwrap_err();
        assert!(err.to_string().contains("v parameter"));
    }

    #[test]
    fn test_classify_private_video() {
        let err = classify_download_error(VIDEO_ID, "ERROR: Private video");
        assert!(matches!(err, SubsyncError::VideoUnavailable(_)));
    }

    #[test]
    fn test_classify_age_restricted() {
        let err = classify_download_error(VIDEO_ID, "ERROR: Sign in to confirm your age");
        assert!(matches!(err, SubsyncError::AgeRestricted(_)));
    }

    #[test]
    fn test_classify_live_stream() {
        let err = classify_download_error(VIDEO_ID, "ERROR: This live event will begin shortly");
        assert!(matches!(err, SubsyncError::LiveStream(_)));
    }

    #[test]
    fn test_classify_other_errors() {
        let err = classify_download_error(VIDEO_ID, "ERROR: network timeout");
        assert!(matches!(err, SubsyncError::Download(_)));
    }
}
