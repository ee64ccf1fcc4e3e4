// Configuration - TOML file with per-section defaults and env overrides

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::downloader::extractors::ExtractorConfig;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub extractor: ExtractorConfig,
    pub merge: MergeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How direct media is handed to clients
    pub delivery: DeliveryMode,
    /// Connect timeout for proxied upstream fetches
    pub upstream_connect_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 10000,
            delivery: DeliveryMode::Stream,
            upstream_connect_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Proxy the bytes through this server
    #[default]
    Stream,
    /// 307 to the direct URL
    Redirect,
    /// JSON body with the direct URL
    Link,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct MergeConfig {
    pub ffmpeg_path: Option<String>,
    /// Where merged files are written; defaults to the user cache dir
    pub scratch_dir: Option<PathBuf>,
    pub timeout_seconds: u64,
    pub max_concurrent: usize,
    /// How long merged files stay downloadable under /static
    pub retention_seconds: u64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            scratch_dir: None,
            timeout_seconds: 600,
            max_concurrent: 2,
            retention_seconds: 600,
        }
    }
}

impl MergeConfig {
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("video-dl-api")
                .join("merged")
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub filters: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

impl Config {
    /// Load `path` if it exists (defaults otherwise), then apply environment
    /// overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&raw)?
        } else {
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// HOST, PORT, COOKIE_FILE, YTDLP_PYTHON, FFMPEG_PATH
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST").filter(|h| !h.trim().is_empty()) {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "PORT",
                value: port.clone(),
            })?;
        }
        if let Some(cookies) = lookup("COOKIE_FILE") {
            self.extractor.cookies_path = Some(PathBuf::from(cookies));
        }
        if let Some(python) = lookup("YTDLP_PYTHON") {
            self.extractor.python = Some(python);
        }
        if let Some(ffmpeg) = lookup("FFMPEG_PATH") {
            self.merge.ffmpeg_path = Some(ffmpeg);
        }
        Ok(())
    }
}
