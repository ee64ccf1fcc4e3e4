// Server entry point - config, logging, tool report, then serve

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use video_dl_api::api::{self, AppState};
use video_dl_api::config::Config;
use video_dl_api::downloader::extractors::{InfoExtractor, InfoExtractorOrchestrator};
use video_dl_api::downloader::FfmpegMerger;
use video_dl_api::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VIDEO_DL_CONFIG").ok())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));
    let config = Config::load(&config_path)?;

    logging::init(&config.logging);
    info!(config = %config_path.display(), "configuration loaded");

    let extractor = InfoExtractorOrchestrator::new(&config.extractor);
    if !extractor.is_available() {
        warn!("no yt-dlp installation found; extraction requests will fail");
    }

    let scratch_dir = config.merge.scratch_dir();
    tokio::fs::create_dir_all(&scratch_dir).await?;
    let merger = FfmpegMerger::new(
        config.merge.ffmpeg_path.as_deref(),
        scratch_dir.clone(),
        Some(config.extractor.user_agent.clone()),
        config.merge.timeout_seconds,
    );

    let state = AppState::new(&config, Arc::new(extractor), Arc::new(merger))?;

    let tools = state.tools.clone();
    for tool in tokio::task::spawn_blocking(move || tools.get_all_tools()).await? {
        match (tool.is_available, tool.version.as_deref()) {
            (true, Some(version)) => info!(tool = %tool.name, version, "tool available"),
            _ => warn!(tool = %tool.name, "tool not available"),
        }
    }
    info!(scratch_dir = %scratch_dir.display(), delivery = ?config.server.delivery, "merge output directory");

    let app = api::router(state);

    let address = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("video download API listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
