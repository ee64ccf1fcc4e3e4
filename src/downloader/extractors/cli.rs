// CLI InfoExtractor - uses native `yt-dlp` binary
//
// Faster than Python mode and has no Python dependency.

use async_trait::async_trait;

use super::command::run_ytdlp;
use super::traits::{ExtractorConfig, InfoExtractor};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::tools::{find_binary, get_version};

/// CLI-based info extractor using yt-dlp binary
pub struct CliInfoExtractor {
    ytdlp_path: String,
    available: bool,
}

impl CliInfoExtractor {
    /// Probes the binary once; availability is not re-checked per request.
    pub fn new(ytdlp_path: Option<&str>) -> Self {
        let ytdlp_path = ytdlp_path
            .map(str::to_string)
            .unwrap_or_else(|| find_binary("yt-dlp"));
        let available = get_version(&ytdlp_path, "--version").is_some();

        Self {
            ytdlp_path,
            available,
        }
    }

    pub fn path(&self) -> &str {
        &self.ytdlp_path
    }
}

#[async_trait]
impl InfoExtractor for CliInfoExtractor {
    fn name(&self) -> &'static str {
        "cli-yt-dlp"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError> {
        if !self.available {
            return Err(DownloadError::ToolNotFound(
                "yt-dlp binary not found".to_string(),
            ));
        }

        run_ytdlp(self.name(), &self.ytdlp_path, &[], url, config).await
    }
}
