// Subtitle tracks from yt-dlp's `subtitles` / `automatic_captions` maps

use super::errors::DownloadError;
use super::models::{SubtitleTrack, VideoMetadata};

/// Flatten a language map into a track list, language-major.
pub fn flatten_tracks(map: &[(String, Vec<SubtitleTrack>)]) -> Vec<SubtitleTrack> {
    map.iter().flat_map(|(_, tracks)| tracks.iter().cloned()).collect()
}

/// First downloadable track for `language`.
///
/// `auto` selects the automatic captions map, otherwise only manual
/// subtitles are searched.
pub fn find_subtitle<'a>(
    info: &'a VideoMetadata,
    language: &str,
    auto: bool,
) -> Result<&'a SubtitleTrack, DownloadError> {
    let map = if auto {
        &info.automatic_captions
    } else {
        &info.subtitles
    };

    map.iter()
        .find(|(lang, _)| lang == language)
        .and_then(|(_, tracks)| tracks.iter().find(|t| t.url.is_some()))
        .ok_or_else(|| DownloadError::not_found("Subtitle not found"))
}
