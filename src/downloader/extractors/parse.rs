// yt-dlp `--dump-json` parsing shared by both extractors

use serde_json::Value;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{StreamDescriptor, SubtitleTrack, VideoMetadata};

/// Parse JSON output into VideoMetadata
pub fn parse_json(stdout: &[u8]) -> Result<VideoMetadata, DownloadError> {
    let json: Value = serde_json::from_slice(stdout)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

    Ok(VideoMetadata {
        id: json["id"].as_str().unwrap_or("unknown").to_string(),
        title: json["title"].as_str().unwrap_or("video").to_string(),
        uploader: str_field(&json, "uploader"),
        thumbnail: str_field(&json, "thumbnail"),
        duration: json["duration"].as_f64(),
        formats: parse_formats(&json)?,
        subtitles: parse_subtitles(&json["subtitles"]),
        automatic_captions: parse_subtitles(&json["automatic_captions"]),
    })
}

/// Parse formats array from JSON.
///
/// Single-file extractions (generic extractor) carry no `formats` array, only
/// a top-level `url`; that document is treated as its own single format.
fn parse_formats(json: &Value) -> Result<Vec<StreamDescriptor>, DownloadError> {
    match json["formats"].as_array() {
        Some(formats) => Ok(formats.iter().map(parse_format).collect()),
        None if json["url"].is_string() => Ok(vec![parse_format(json)]),
        None => Err(DownloadError::ParseError(
            "No formats array in JSON".to_string(),
        )),
    }
}

fn parse_format(f: &Value) -> StreamDescriptor {
    StreamDescriptor {
        id: f["format_id"].as_str().unwrap_or("").to_string(),
        container: f["ext"].as_str().unwrap_or("").to_string(),
        height: f["height"].as_u64().map(|h| h as u32),
        size_bytes: f["filesize"].as_u64(),
        vcodec: str_field(f, "vcodec"),
        acodec: str_field(f, "acodec"),
        url: str_field(f, "url"),
    }
}

fn parse_subtitles(map: &Value) -> Vec<(String, Vec<SubtitleTrack>)> {
    let Some(map) = map.as_object() else {
        return Vec::new();
    };

    map.iter()
        .map(|(lang, tracks)| {
            let tracks = tracks
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .map(|t| SubtitleTrack {
                            language: lang.clone(),
                            ext: str_field(t, "ext"),
                            url: str_field(t, "url"),
                        })
                        .collect()
                })
                .unwrap_or_default();
            (lang.clone(), tracks)
        })
        .collect()
}

fn str_field(v: &Value, key: &str) -> Option<String> {
    v[key].as_str().map(|s| s.to_string())
}
