// InfoExtractor trait and extraction settings

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;

/// Chrome UA sent to the extractor and to upstream media hosts
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36";

/// Cookie file looked up in the working directory; skipped when absent
pub const DEFAULT_COOKIE_FILE: &str = "cookies.txt";

/// Extraction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorMode {
    /// Python module yt_dlp
    Python,
    /// CLI binary yt-dlp
    Cli,
    /// Auto-select with fallback
    #[default]
    Auto,
}

impl fmt::Display for ExtractorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Python => write!(f, "python"),
            Self::Cli => write!(f, "cli"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Configuration passed to every extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Extraction mode (Python, CLI, or Auto)
    pub mode: ExtractorMode,
    /// Explicit yt-dlp binary; searched in common paths when unset
    pub ytdlp_path: Option<String>,
    /// Python interpreter for the yt_dlp module
    pub python: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<PathBuf>,
    /// Use cookies from browser (Chrome)
    pub cookies_from_browser: bool,
    /// User agent for yt-dlp and upstream fetches
    pub user_agent: String,
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// yt-dlp --socket-timeout
    pub socket_timeout_seconds: u32,
    /// Kill the extractor process after this long
    pub timeout_seconds: u64,
    /// YouTube player clients to try in order; empty uses yt-dlp's default
    pub player_clients: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            mode: ExtractorMode::Auto,
            ytdlp_path: None,
            python: None,
            cookies_path: Some(PathBuf::from(DEFAULT_COOKIE_FILE)),
            cookies_from_browser: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            socket_timeout_seconds: 30,
            timeout_seconds: 120,
            player_clients: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    pub fn with_cookies_path(mut self, path: Option<PathBuf>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_player_clients(mut self, clients: Vec<String>) -> Self {
        self.player_clients = clients;
        self
    }
}

/// Trait for info extractors
#[async_trait]
pub trait InfoExtractor: Send + Sync {
    /// Name of the extractor (for logging)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available
    fn is_available(&self) -> bool;

    /// Extract video metadata with formats and subtitles
    async fn extract(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError>;
}
