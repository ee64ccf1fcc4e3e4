// yt-dlp invocation shared by the CLI and Python extractors

use tracing::{debug, warn};

use super::parse::parse_json;
use super::traits::ExtractorConfig;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::VideoMetadata;
use crate::downloader::utils::{is_youtube, run_output_with_timeout, CommandError};

/// Build yt-dlp arguments (without the program or module prefix)
pub fn build_args(url: &str, config: &ExtractorConfig, client: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--dump-json".to_string(),
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--socket-timeout".to_string(),
        config.socket_timeout_seconds.to_string(),
        "--retries".to_string(),
        "2".to_string(),
        "--user-agent".to_string(),
        config.user_agent.clone(),
    ];

    // Player client for YouTube
    if let Some(client) = client {
        args.push("--extractor-args".to_string());
        args.push(format!("youtube:player_client={}", client));
    }

    // Cookies; a configured but missing file is ignored
    match &config.cookies_path {
        Some(path) if path.exists() => {
            args.push("--cookies".to_string());
            args.push(path.to_string_lossy().into_owned());
        }
        _ if config.cookies_from_browser => {
            args.push("--cookies-from-browser".to_string());
            args.push("chrome".to_string());
        }
        _ => {}
    }

    // Proxy
    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args.push(url.to_string());
    args
}

/// Player clients to try for this URL; `None` leaves yt-dlp's default
pub fn clients_for(url: &str, config: &ExtractorConfig) -> Vec<Option<String>> {
    if is_youtube(url) && !config.player_clients.is_empty() {
        config.player_clients.iter().cloned().map(Some).collect()
    } else {
        vec![None]
    }
}

/// Run `program [prefix..] <yt-dlp args>` once per player client until one
/// succeeds. The last failure is returned.
pub async fn run_ytdlp(
    extractor: &str,
    program: &str,
    prefix: &[&str],
    url: &str,
    config: &ExtractorConfig,
) -> Result<VideoMetadata, DownloadError> {
    let mut last_error = DownloadError::ExecutionError("No clients to try".to_string());

    for client in clients_for(url, config) {
        let args: Vec<String> = prefix
            .iter()
            .map(|s| s.to_string())
            .chain(build_args(url, config, client.as_deref()))
            .collect();
        debug!(extractor, client = ?client, "running {} {}", program, args.join(" "));

        match run_output_with_timeout(program, &args, config.timeout_seconds).await {
            Ok(out) if out.status.success() => return parse_json(&out.stdout),
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                warn!(extractor, client = ?client, "yt-dlp failed: {}", stderr.trim());
                last_error = DownloadError::from_extractor_output(&stderr);
            }
            Err(e @ CommandError::TimedOut(_)) => {
                warn!(extractor, client = ?client, "yt-dlp {}", e);
                last_error = DownloadError::from_extractor_output(&e.to_string());
            }
            Err(e) => {
                warn!(extractor, "yt-dlp could not run: {}", e);
                return Err(DownloadError::ExecutionError(e.to_string()));
            }
        }
    }

    Err(last_error)
}
