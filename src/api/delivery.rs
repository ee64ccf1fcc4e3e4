// Hands media to the client according to the configured delivery mode

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use futures_util::StreamExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use super::state::AppState;
use crate::config::DeliveryMode;
use crate::downloader::utils::content_disposition;
use crate::downloader::{DownloadError, DownloadLink, MergedFile};

const CHUNK_SIZE: usize = 64 * 1024;
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A file that lives at a direct upstream URL
#[derive(Debug, Clone)]
pub struct RemoteMedia {
    pub url: String,
    pub filename: String,
    pub filesize: Option<u64>,
    /// Forced content type; the upstream's is used otherwise
    pub content_type: Option<&'static str>,
}

pub async fn deliver_remote(state: &AppState, media: RemoteMedia) -> Result<Response, DownloadError> {
    match state.delivery {
        DeliveryMode::Stream => stream_upstream(state, media).await,
        DeliveryMode::Redirect => Ok(Redirect::temporary(&media.url).into_response()),
        DeliveryMode::Link => Ok(Json(DownloadLink {
            download_url: media.url,
            filename: media.filename,
            filesize: media.filesize,
        })
        .into_response()),
    }
}

async fn stream_upstream(state: &AppState, media: RemoteMedia) -> Result<Response, DownloadError> {
    let upstream = state
        .http
        .get(&media.url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| DownloadError::Upstream(e.to_string()))?;

    let content_type = media
        .content_type
        .map(str::to_string)
        .or_else(|| {
            upstream
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        })
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

    debug!(filename = %media.filename, content_length = ?upstream.content_length(), "proxying upstream body");

    let mut response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&media.filename));
    if let Some(len) = upstream.content_length() {
        response = response.header(header::CONTENT_LENGTH, len);
    }

    response
        .body(Body::from_stream(upstream.bytes_stream()))
        .map_err(|e| DownloadError::ExecutionError(e.to_string()))
}

/// Deliver a merged file. Streamed files are removed once the body is done
/// (or dropped); redirect and link modes keep them under `/static` for the
/// retention period.
pub async fn deliver_merged(
    state: &AppState,
    merged: MergedFile,
    filename: String,
) -> Result<Response, DownloadError> {
    match state.delivery {
        DeliveryMode::Stream => stream_file(merged, &filename).await,
        DeliveryMode::Redirect => {
            let location = static_location(merged, state);
            Ok(Redirect::temporary(&location).into_response())
        }
        DeliveryMode::Link => {
            let filesize = Some(merged.size());
            let location = static_location(merged, state);
            Ok(Json(DownloadLink {
                download_url: location,
                filename,
                filesize,
            })
            .into_response())
        }
    }
}

fn static_location(merged: MergedFile, state: &AppState) -> String {
    let name = merged.file_name();
    merged.persist(state.merge_retention);
    info!(file = %name, retention = ?state.merge_retention, "merged file kept for static delivery");
    format!("/static/{}", urlencoding::encode(&name))
}

async fn stream_file(merged: MergedFile, filename: &str) -> Result<Response, DownloadError> {
    let file = tokio::fs::File::open(merged.path())
        .await
        .map_err(|e| DownloadError::ExecutionError(format!("cannot open merged file: {}", e)))?;
    let size = merged.size();

    // The guard rides along with the stream and deletes the file when the
    // body is dropped.
    let stream = ReaderStream::with_capacity(file, CHUNK_SIZE).map(move |chunk| {
        let _guard = &merged;
        chunk
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "video/mp4")
        .header(header::CONTENT_DISPOSITION, content_disposition(filename))
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(stream))
        .map_err(|e| DownloadError::ExecutionError(e.to_string()))
}
