// Common data models for extraction results and the download catalog

use serde::{Deserialize, Serialize};

/// One raw media stream reported by yt-dlp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Format ID (e.g., "137", "140")
    pub id: String,
    /// File extension (mp4, webm, m4a)
    pub container: String,
    /// Video height in pixels
    pub height: Option<u32>,
    /// Exact file size in bytes, when yt-dlp knows it
    pub size_bytes: Option<u64>,
    /// Video codec (avc1, vp9, av01, none)
    pub vcodec: Option<String>,
    /// Audio codec (mp4a, opus, none)
    pub acodec: Option<String>,
    /// Direct fetch URL
    pub url: Option<String>,
}

impl StreamDescriptor {
    /// A missing codec field counts as present; only an explicit "none"
    /// marks the stream as absent.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }

    pub fn kind(&self) -> Option<StreamKind> {
        match (self.has_video(), self.has_audio()) {
            (true, true) => Some(StreamKind::VideoAudio),
            (true, false) => Some(StreamKind::VideoOnly),
            (false, true) => Some(StreamKind::AudioOnly),
            (false, false) => None,
        }
    }
}

/// What a catalog entry carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamKind {
    #[serde(rename = "video+audio")]
    VideoAudio,
    #[serde(rename = "video-only")]
    VideoOnly,
    #[serde(rename = "audio-only")]
    AudioOnly,
}

/// A downloadable option, either a raw format or a synthesized merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(rename = "format_id")]
    pub id: String,
    #[serde(rename = "ext")]
    pub container: String,
    #[serde(rename = "resolution")]
    pub height: Option<u32>,
    #[serde(rename = "filesize")]
    pub size_bytes: Option<u64>,
    #[serde(rename = "type")]
    pub kind: StreamKind,
    #[serde(rename = "merged")]
    pub is_synthesized: bool,
}

/// How to produce the bytes of a synthesized entry
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub video: StreamDescriptor,
    pub audio: StreamDescriptor,
    pub output_container: String,
}

impl MergePlan {
    pub fn id(&self) -> String {
        format!("{}+{}", self.video.id, self.audio.id)
    }
}

/// One subtitle file, flattened out of yt-dlp's language map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleTrack {
    pub language: String,
    pub ext: Option<String>,
    pub url: Option<String>,
}

/// Parsed `--dump-json` document
#[derive(Debug, Clone, Default)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub formats: Vec<StreamDescriptor>,
    /// Manual subtitles, language -> tracks, in extractor order
    pub subtitles: Vec<(String, Vec<SubtitleTrack>)>,
    /// Automatic captions, language -> tracks, in extractor order
    pub automatic_captions: Vec<(String, Vec<SubtitleTrack>)>,
}

/// Response body of `POST /video-info`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfoResponse {
    pub video_id: String,
    pub title: String,
    pub uploader: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub formats: Vec<CatalogEntry>,
    pub subtitles: Vec<SubtitleTrack>,
    pub automatic_subtitles: Vec<SubtitleTrack>,
}

/// Response body for link delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadLink {
    pub download_url: String,
    pub filename: String,
    pub filesize: Option<u64>,
}
