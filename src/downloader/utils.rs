// Helper functions shared by extractors, the merger and the HTTP layer

use lazy_static::lazy_static;
use regex::Regex;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command as TokioCommand;
use tokio::time::{timeout, Duration};

use super::errors::DownloadError;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{0}")]
    Io(String),

    #[error("Timed out after {0}s")]
    TimedOut(u64),
}

/// Run command with timeout, collecting stdout and stderr.
///
/// The child is killed when the timeout elapses or when the returned future
/// is dropped.
pub async fn run_output_with_timeout(
    program: &str,
    args: &[String],
    timeout_secs: u64,
) -> Result<std::process::Output, CommandError> {
    let mut child = TokioCommand::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CommandError::Spawn {
            program: program.to_string(),
            source,
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| CommandError::Io(format!("Failed to capture stdout from {}", program)))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| CommandError::Io(format!("Failed to capture stderr from {}", program)))?;

    let stdout_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stdout_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });
    let stderr_task = tokio::spawn(async move {
        let mut buf = Vec::new();
        stderr_pipe.read_to_end(&mut buf).await.map(|_| buf)
    });

    match timeout(Duration::from_secs(timeout_secs), child.wait()).await {
        Ok(status_res) => {
            let status = status_res
                .map_err(|e| CommandError::Io(format!("Failed to wait for {}: {}", program, e)))?;
            let stdout = join_pipe(stdout_task, "stdout").await?;
            let stderr = join_pipe(stderr_task, "stderr").await?;
            Ok(std::process::Output {
                status,
                stdout,
                stderr,
            })
        }
        Err(_) => {
            let _ = child.kill().await;
            stdout_task.abort();
            stderr_task.abort();
            Err(CommandError::TimedOut(timeout_secs))
        }
    }
}

async fn join_pipe(
    task: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
    name: &str,
) -> Result<Vec<u8>, CommandError> {
    task.await
        .map_err(|e| CommandError::Io(format!("{} task failed: {}", name, e)))?
        .map_err(|e| CommandError::Io(format!("Failed to read {}: {}", name, e)))
}

lazy_static! {
    static ref YOUTU_BE_RE: Regex =
        Regex::new(r"youtu\.be/([^/?&#]+)").expect("static regex");
}

/// Normalize a user-supplied video URL.
///
/// - `youtu.be/<id>?si=..` becomes `https://www.youtube.com/watch?v=<id>`
/// - `youtube.com` URLs lose everything after the first `&` (playlist,
///   index, timestamps)
/// - anything else is passed through trimmed
pub fn normalize_video_url(url: &str) -> Result<String, DownloadError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(DownloadError::invalid("Missing \"url\""));
    }

    if let Some(caps) = YOUTU_BE_RE.captures(url) {
        return Ok(format!("https://www.youtube.com/watch?v={}", &caps[1]));
    }

    if url.contains("youtube.com") {
        return Ok(url.split('&').next().unwrap_or(url).to_string());
    }

    Ok(url.to_string())
}

pub fn is_youtube(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

/// File name safe for a Content-Disposition header and a local file system
pub fn safe_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_matches('.');
    if trimmed.is_empty() {
        "download".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `attachment; filename*=UTF-8''<percent-encoded>`
pub fn content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    )
}
