// AppState - extractor, merger and HTTP client shared by all handlers

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::config::{Config, DeliveryMode};
use crate::downloader::extractors::{ExtractorConfig, InfoExtractor};
use crate::downloader::tools::ToolManager;
use crate::downloader::{DownloadError, MergeExecutor, VideoMetadata};

/// Shared per-process handles. Nothing here is mutated by requests.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<dyn InfoExtractor>,
    pub extractor_config: Arc<ExtractorConfig>,
    pub merger: Arc<dyn MergeExecutor>,
    pub merge_slots: Arc<Semaphore>,
    pub merge_retention: Duration,
    pub scratch_dir: PathBuf,
    pub delivery: DeliveryMode,
    pub http: reqwest::Client,
    pub tools: Arc<ToolManager>,
}

impl AppState {
    pub fn new(
        config: &Config,
        extractor: Arc<dyn InfoExtractor>,
        merger: Arc<dyn MergeExecutor>,
    ) -> Result<Self, reqwest::Error> {
        let mut http = reqwest::Client::builder()
            .user_agent(config.extractor.user_agent.clone())
            .connect_timeout(Duration::from_secs(
                config.server.upstream_connect_timeout_seconds,
            ));
        if let Some(proxy) = &config.extractor.proxy {
            http = http.proxy(reqwest::Proxy::all(proxy)?);
        }

        Ok(Self {
            extractor,
            extractor_config: Arc::new(config.extractor.clone()),
            merger,
            merge_slots: Arc::new(Semaphore::new(config.merge.max_concurrent.max(1))),
            merge_retention: Duration::from_secs(config.merge.retention_seconds),
            scratch_dir: config.merge.scratch_dir(),
            delivery: config.server.delivery,
            http: http.build()?,
            tools: Arc::new(ToolManager::new(
                config.extractor.ytdlp_path.clone(),
                config.merge.ffmpeg_path.clone(),
                config.extractor.python.clone(),
            )),
        })
    }

    /// Fresh extraction; results are never cached between requests.
    pub async fn extract(&self, url: &str) -> Result<VideoMetadata, DownloadError> {
        self.extractor.extract(url, &self.extractor_config).await
    }
}
