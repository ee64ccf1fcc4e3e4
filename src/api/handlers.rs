// Handlers - one per route, each extracting afresh before answering

use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use super::delivery::{deliver_merged, deliver_remote, RemoteMedia};
use super::error::{ApiError, ApiResult};
use super::params::{
    flag_set, parse_body, required, DownloadAudioParams, DownloadSubtitleParams,
    DownloadVideoParams, VideoInfoParams,
};
use super::state::AppState;
use crate::downloader::format_selector::MERGE_SEPARATOR;
use crate::downloader::subtitles::{find_subtitle, flatten_tracks};
use crate::downloader::tools::ToolInfo;
use crate::downloader::utils::{normalize_video_url, safe_filename};
use crate::downloader::{DownloadError, FormatSelector, VideoInfoResponse};

const SUBTITLE_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the video download API. Use /video-info to get video information."
    }))
}

pub async fn tools(State(state): State<AppState>) -> ApiResult<Json<Vec<ToolInfo>>> {
    let manager = state.tools.clone();
    let tools = tokio::task::spawn_blocking(move || manager.get_all_tools())
        .await
        .map_err(|e| DownloadError::ExecutionError(e.to_string()))?;
    Ok(Json(tools))
}

pub async fn video_info(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<VideoInfoResponse>> {
    let params: VideoInfoParams = parse_body(&body)?;
    let url = required(params.url.as_deref())
        .ok_or_else(|| DownloadError::invalid("Missing \"url\""))?;
    let url = normalize_video_url(url)?;

    info!(%url, "video info requested");
    let info = state.extract(&url).await?;

    Ok(Json(VideoInfoResponse {
        video_id: info.id.clone(),
        formats: FormatSelector::build_catalog(&info.formats),
        subtitles: flatten_tracks(&info.subtitles),
        automatic_subtitles: flatten_tracks(&info.automatic_captions),
        title: info.title,
        uploader: info.uploader,
        thumbnail: info.thumbnail,
        duration: info.duration,
    }))
}

pub async fn download_video_query(
    State(state): State<AppState>,
    Query(params): Query<DownloadVideoParams>,
) -> ApiResult<Response> {
    download_video(&state, params).await
}

pub async fn download_video_body(
    State(state): State<AppState>,
    Query(query): Query<DownloadVideoParams>,
    body: Bytes,
) -> ApiResult<Response> {
    let params = body_or_query(&body, query)?;
    download_video(&state, params).await
}

async fn download_video(state: &AppState, params: DownloadVideoParams) -> ApiResult<Response> {
    let (url, format_id) = match (
        required(params.url.as_deref()),
        required(params.format_id.as_deref()),
    ) {
        (Some(url), Some(format_id)) => (url, format_id),
        _ => return Err(DownloadError::invalid("Missing \"url\" or \"format_id\"").into()),
    };
    let url = normalize_video_url(url)?;
    let merged_hint = flag_set(&params.merged);

    info!(%url, format_id, merged_hint, "video download requested");
    let info = state.extract(&url).await?;

    // A direct catalog id is always served as-is; `merged` is only a hint.
    // Composite ids that are not raw formats go through the merger.
    let format = match FormatSelector::find_format(&info.formats, format_id) {
        Ok(format) => format,
        Err(_) if format_id.contains(MERGE_SEPARATOR) => {
            let plan = FormatSelector::resolve_merge_plan(&info.formats, format_id)?;

            let file = {
                let _slot = state
                    .merge_slots
                    .acquire()
                    .await
                    .map_err(|e| DownloadError::MergeFailed(e.to_string()))?;
                state.merger.merge(&plan, &info.id).await?
            };

            let filename = safe_filename(&format!("{}.{}", info.title, plan.output_container));
            return Ok(deliver_merged(state, file, filename).await?);
        }
        Err(e) => return Err(e.into()),
    };

    let media = RemoteMedia {
        url: format.url.clone().unwrap_or_default(),
        filename: safe_filename(&format!("{}.{}", info.title, format.container)),
        filesize: format.size_bytes,
        content_type: None,
    };
    Ok(deliver_remote(state, media).await?)
}

pub async fn download_audio_query(
    State(state): State<AppState>,
    Query(params): Query<DownloadAudioParams>,
) -> ApiResult<Response> {
    download_audio(&state, params).await
}

pub async fn download_audio_body(
    State(state): State<AppState>,
    Query(query): Query<DownloadAudioParams>,
    body: Bytes,
) -> ApiResult<Response> {
    let params = body_or_query(&body, query)?;
    download_audio(&state, params).await
}

async fn download_audio(state: &AppState, params: DownloadAudioParams) -> ApiResult<Response> {
    let url = required(params.url.as_deref())
        .ok_or_else(|| DownloadError::invalid("Missing \"url\""))?;
    let url = normalize_video_url(url)?;

    info!(%url, "audio download requested");
    let info = state.extract(&url).await?;
    let audio = FormatSelector::select_audio(&info.formats)?;

    let media = RemoteMedia {
        url: audio.url.clone().unwrap_or_default(),
        filename: safe_filename(&format!("{}.{}", info.title, audio.container)),
        filesize: audio.size_bytes,
        content_type: None,
    };
    Ok(deliver_remote(state, media).await?)
}

pub async fn download_subtitle_query(
    State(state): State<AppState>,
    Query(params): Query<DownloadSubtitleParams>,
) -> ApiResult<Response> {
    download_subtitle(&state, params).await
}

pub async fn download_subtitle_body(
    State(state): State<AppState>,
    Query(query): Query<DownloadSubtitleParams>,
    body: Bytes,
) -> ApiResult<Response> {
    let params = body_or_query(&body, query)?;
    download_subtitle(&state, params).await
}

async fn download_subtitle(
    state: &AppState,
    params: DownloadSubtitleParams,
) -> ApiResult<Response> {
    let (url, language) = match (
        required(params.url.as_deref()),
        required(params.language.as_deref()),
    ) {
        (Some(url), Some(language)) => (url, language),
        _ => return Err(DownloadError::invalid("Missing \"url\" or \"language\"").into()),
    };
    let url = normalize_video_url(url)?;
    let auto = flag_set(&params.auto);

    info!(%url, language, auto, "subtitle download requested");
    let info = state.extract(&url).await?;
    let track = find_subtitle(&info, language, auto)?;

    let suffix = if auto { "_auto" } else { "" };
    let ext = track.ext.as_deref().unwrap_or("vtt");
    let media = RemoteMedia {
        url: track.url.clone().unwrap_or_default(),
        filename: safe_filename(&format!("{}_{}{}.{}", info.title, language, suffix, ext)),
        filesize: None,
        content_type: Some(SUBTITLE_CONTENT_TYPE),
    };
    Ok(deliver_remote(state, media).await?)
}

/// POST accepts either a JSON body or the same fields in the query string.
fn body_or_query<T>(body: &Bytes, query: T) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        Ok(query)
    } else {
        Ok(parse_body(body)?)
    }
}
