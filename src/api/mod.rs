// HTTP surface: routes, request handling and media delivery

pub mod delivery;
pub mod error;
pub mod handlers;
pub mod params;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

pub fn router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.scratch_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/tools", get(handlers::tools))
        .route("/video-info", post(handlers::video_info))
        .route(
            "/download-video",
            get(handlers::download_video_query).post(handlers::download_video_body),
        )
        .route(
            "/download-audio",
            get(handlers::download_audio_query).post(handlers::download_audio_body),
        )
        .route(
            "/download-subtitle",
            get(handlers::download_subtitle_query).post(handlers::download_subtitle_body),
        )
        .nest_service("/static", static_files)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
