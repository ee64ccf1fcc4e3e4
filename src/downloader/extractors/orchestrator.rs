// InfoExtractor Orchestrator - mode selection and fallback
//
// Strategy in auto mode:
// 1. YouTube: Python first (better anti-bot), then CLI
// 2. Other sites: CLI first (faster), then Python
// Unavailable extractors are skipped.

use async_trait::async_trait;
use tracing::{info, warn};

use super::cli::CliInfoExtractor;
use super::python::PythonInfoExtractor;
use super::traits::{ExtractorConfig, ExtractorMode, InfoExtractor};
use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::utils::is_youtube;

/// Orchestrator that manages Python and CLI extractors
pub struct InfoExtractorOrchestrator {
    python: PythonInfoExtractor,
    cli: CliInfoExtractor,
}

impl InfoExtractorOrchestrator {
    pub fn new(config: &ExtractorConfig) -> Self {
        let orchestrator = Self {
            python: PythonInfoExtractor::new(config.python.as_deref()),
            cli: CliInfoExtractor::new(config.ytdlp_path.as_deref()),
        };

        info!(
            python_available = orchestrator.python.is_available(),
            cli_available = orchestrator.cli.is_available(),
            cli_path = orchestrator.cli.path(),
            mode = %config.mode,
            "info extractors ready"
        );

        orchestrator
    }

    /// Extractors to try for this URL, in order
    fn plan(&self, url: &str, mode: ExtractorMode) -> Vec<&dyn InfoExtractor> {
        let python: &dyn InfoExtractor = &self.python;
        let cli: &dyn InfoExtractor = &self.cli;

        match mode {
            ExtractorMode::Python => vec![python],
            ExtractorMode::Cli => vec![cli],
            ExtractorMode::Auto if is_youtube(url) => vec![python, cli],
            ExtractorMode::Auto => vec![cli, python],
        }
    }
}

#[async_trait]
impl InfoExtractor for InfoExtractorOrchestrator {
    fn name(&self) -> &'static str {
        "orchestrator"
    }

    fn is_available(&self) -> bool {
        self.python.is_available() || self.cli.is_available()
    }

    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError> {
        let plan = self.plan(url, config.mode);
        let mut last_error = None;

        for extractor in plan.iter().filter(|e| e.is_available()) {
            match extractor.extract(url, config).await {
                Ok(info) => {
                    info!(extractor = extractor.name(), url, "extraction succeeded");
                    return Ok(info);
                }
                Err(e) => {
                    warn!(extractor = extractor.name(), url, "extraction failed: {}", e);
                    if let DownloadError::ExtractionFailed {
                        reason: Some(reason),
                        ..
                    } = &e
                    {
                        let hint = reason.cookies_might_help() && config.cookies_path.is_none();
                        warn!(
                            reason = reason.description(),
                            cookies_might_help = hint,
                            "diagnosed extraction failure"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            DownloadError::ToolNotFound(format!(
                "No yt-dlp available for mode '{}' (install the yt-dlp binary or `pip install yt-dlp`)",
                config.mode
            ))
        }))
    }
}
