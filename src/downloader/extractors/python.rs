// Python InfoExtractor - uses `python3 -m yt_dlp`
//
// Tends to get through YouTube bot detection more often than the packaged
// binary; requires Python 3 with the yt-dlp module.

use async_trait::async_trait;

use super::command::run_ytdlp;
use super::traits::{ExtractorConfig, InfoExtractor};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::tools::{find_python, python_module_version};

/// Python-based info extractor using yt_dlp module
pub struct PythonInfoExtractor {
    python_cmd: String,
    available: bool,
}

impl PythonInfoExtractor {
    pub fn new(python: Option<&str>) -> Self {
        let python_cmd = python
            .map(str::to_string)
            .unwrap_or_else(find_python);
        let available = python_module_version(&python_cmd).is_some();

        Self {
            python_cmd,
            available,
        }
    }
}

#[async_trait]
impl InfoExtractor for PythonInfoExtractor {
    fn name(&self) -> &'static str {
        "python-yt-dlp"
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
                "Python yt_dlp module not installed".to_string(),
            ));
        }

        run_ytdlp(self.name(), &self.python_cmd, &["-m", "yt_dlp"], url, config).await
    }
}
