// ApiError - maps DownloadError onto HTTP status codes and JSON bodies

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

use crate::downloader::extractors::BlockingReason;
use crate::downloader::DownloadError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<BlockingReason>,
}

/// Handler boundary error: every failure leaves as a JSON body
#[derive(Debug)]
pub struct ApiError(pub DownloadError);

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        Self(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn status_code(err: &DownloadError) -> StatusCode {
    match err {
        DownloadError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        DownloadError::NotFound(_) => StatusCode::NOT_FOUND,
        DownloadError::ExtractionFailed { reason, .. } => match reason {
            Some(r) if r.is_content_restriction() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        DownloadError::Upstream(_) => StatusCode::BAD_GATEWAY,
        DownloadError::MergeFailed(_)
        | DownloadError::ToolNotFound(_)
        | DownloadError::ParseError(_)
        | DownloadError::ExecutionError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_code(&self.0);

        let body = match self.0 {
            DownloadError::ExtractionFailed { message, reason } => ErrorBody {
                error: message,
                reason,
            },
            // Details stay in the log; no partial file is ever offered
            DownloadError::MergeFailed(detail) => {
                error!("merge failed: {}", detail);
                ErrorBody {
                    error: "Failed to merge video and audio".to_string(),
                    reason: None,
                }
            }
            other => ErrorBody {
                error: other.to_string(),
                reason: None,
            },
        };

        if status.is_server_error() {
            warn!(status = status.as_u16(), "request failed: {}", body.error);
        }

        (status, Json(body)).into_response()
    }
}
