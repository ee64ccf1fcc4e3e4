// Error types for extraction, catalog lookups and merging

use thiserror::Error;

use super::extractors::{diagnose_error, BlockingReason};

#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    /// A required request field is missing or empty
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested format, subtitle or language is absent from a fresh catalog
    #[error("{0}")]
    NotFound(String),

    /// yt-dlp reported an error for this URL
    #[error("{message}")]
    ExtractionFailed {
        message: String,
        reason: Option<BlockingReason>,
    },

    /// ffmpeg could not produce the merged file
    #[error("Merge failed: {0}")]
    MergeFailed(String),

    /// yt-dlp, python or ffmpeg not found in system
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Failed to parse yt-dlp JSON output
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Command execution failed
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// Fetching the direct media URL failed
    #[error("Upstream request failed: {0}")]
    Upstream(String),
}

impl DownloadError {
    /// Build an extraction error from yt-dlp's stderr.
    ///
    /// The last `ERROR:` line is kept as the message (yt-dlp prints warnings
    /// before it) and the whole output is fed to the diagnostics.
    pub fn from_extractor_output(stderr: &str) -> Self {
        let message = stderr
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| l.starts_with("ERROR:"))
            .or_else(|| stderr.lines().rev().map(str::trim).find(|l| !l.is_empty()))
            .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
            .unwrap_or_else(|| "Extraction failed".to_string());

        Self::ExtractionFailed {
            message,
            reason: diagnose_error(stderr),
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidRequest(what.into())
    }
}
