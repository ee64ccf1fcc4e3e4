// FormatSelector - catalog building and merge planning
//
// Converts raw formats from the InfoExtractor into download options.
// Handles:
// - Classification into video+audio / video-only / audio-only
// - Synthesized "video+audio" entries pairing a video-only stream with an
//   m4a audio stream, produced later by ffmpeg
// - Resolving a requested id back to descriptors against a fresh extraction
//
// Audio pairing is first-match in extractor order, not best bitrate: the
// synthesized id must stay stable across repeated extractions.

use super::errors::DownloadError;
use super::models::{CatalogEntry, MergePlan, StreamDescriptor, StreamKind};

/// Audio container paired with video-only streams
pub const PREFERRED_AUDIO_CONTAINER: &str = "m4a";

/// Container of every synthesized entry
pub const MERGE_CONTAINER: &str = "mp4";

/// Separator between the video and audio id of a synthesized entry
pub const MERGE_SEPARATOR: char = '+';

/// Format selector over one extraction snapshot
pub struct FormatSelector;

impl FormatSelector {
    /// Direct entries for every descriptor carrying video and/or audio.
    /// Descriptors with neither are dropped.
    pub fn classify(formats: &[StreamDescriptor]) -> Vec<CatalogEntry> {
        formats
            .iter()
            .filter_map(|f| {
                let kind = f.kind()?;
                Some(CatalogEntry {
                    id: f.id.clone(),
                    container: f.container.clone(),
                    height: match kind {
                        StreamKind::AudioOnly => None,
                        _ => f.height,
                    },
                    size_bytes: f.size_bytes,
                    kind,
                    is_synthesized: false,
                })
            })
            .collect()
    }

    /// One synthesized entry per video-only descriptor that has an m4a
    /// partner.
    pub fn synthesize_merges(
        video_only: &[&StreamDescriptor],
        audio_only: &[&StreamDescriptor],
    ) -> Vec<CatalogEntry> {
        Self::pairs(video_only, audio_only)
            .into_iter()
            .map(|(v, a)| CatalogEntry {
                id: Self::composite_id(v, a),
                container: MERGE_CONTAINER.to_string(),
                height: v.height,
                size_bytes: Some(v.size_bytes.unwrap_or(0) + a.size_bytes.unwrap_or(0)),
                kind: StreamKind::VideoAudio,
                is_synthesized: true,
            })
            .collect()
    }

    /// Full catalog: direct entries first, then synthesized merges.
    pub fn build_catalog(formats: &[StreamDescriptor]) -> Vec<CatalogEntry> {
        let (video_only, audio_only) = Self::split(formats);

        let mut catalog = Self::classify(formats);
        catalog.extend(Self::synthesize_merges(&video_only, &audio_only));
        catalog
    }

    /// Resolve a synthesized id (e.g. "137+140") into a merge plan.
    ///
    /// `formats` must come from a fresh extraction: yt-dlp ids and URLs are
    /// not stable across calls. The id is matched against the pairs the
    /// catalog offers rather than split, so raw ids containing the separator
    /// still resolve.
    pub fn resolve_merge_plan(
        formats: &[StreamDescriptor],
        requested_id: &str,
    ) -> Result<MergePlan, DownloadError> {
        let not_found = || DownloadError::not_found(format!("Format not found: {}", requested_id));

        let (video_only, audio_only) = Self::split(formats);
        let (video, audio) = Self::pairs(&video_only, &audio_only)
            .into_iter()
            .find(|(v, a)| Self::composite_id(v, a) == requested_id)
            .ok_or_else(not_found)?;

        if video.url.is_none() || audio.url.is_none() {
            return Err(not_found());
        }

        Ok(MergePlan {
            video: video.clone(),
            audio: audio.clone(),
            output_container: MERGE_CONTAINER.to_string(),
        })
    }

    /// Raw format by exact id. Formats without a URL cannot be fetched and
    /// count as missing.
    pub fn find_format<'a>(
        formats: &'a [StreamDescriptor],
        format_id: &str,
    ) -> Result<&'a StreamDescriptor, DownloadError> {
        formats
            .iter()
            .find(|f| f.id == format_id)
            .filter(|f| f.url.is_some())
            .ok_or_else(|| DownloadError::not_found("Format not found"))
    }

    /// Audio to serve for `/download-audio`.
    ///
    /// yt-dlp lists formats from worst to best, so the last audio-only entry
    /// is its own best pick. Falls back to any audio-bearing format.
    pub fn select_audio(formats: &[StreamDescriptor]) -> Result<&StreamDescriptor, DownloadError> {
        let downloadable = || formats.iter().rev().filter(|f| f.url.is_some());

        downloadable()
            .find(|f| f.kind() == Some(StreamKind::AudioOnly))
            .or_else(|| downloadable().find(|f| f.has_audio()))
            .ok_or_else(|| DownloadError::not_found("Audio format not found"))
    }

    fn split(formats: &[StreamDescriptor]) -> (Vec<&StreamDescriptor>, Vec<&StreamDescriptor>) {
        let video_only = formats
            .iter()
            .filter(|f| f.kind() == Some(StreamKind::VideoOnly))
            .collect();
        let audio_only = formats
            .iter()
            .filter(|f| f.kind() == Some(StreamKind::AudioOnly))
            .collect();
        (video_only, audio_only)
    }

    fn composite_id(video: &StreamDescriptor, audio: &StreamDescriptor) -> String {
        format!("{}{}{}", video.id, MERGE_SEPARATOR, audio.id)
    }

    fn pairs<'a>(
        video_only: &[&'a StreamDescriptor],
        audio_only: &[&'a StreamDescriptor],
    ) -> Vec<(&'a StreamDescriptor, &'a StreamDescriptor)> {
        let partner = audio_only
            .iter()
            .find(|a| a.container == PREFERRED_AUDIO_CONTAINER)
            .copied();

        match partner {
            Some(a) => video_only.iter().map(|v| (*v, a)).collect(),
            None => Vec::new(),
        }
    }
}
