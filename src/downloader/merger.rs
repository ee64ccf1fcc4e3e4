// Merge execution - muxes a video-only and an audio-only stream with ffmpeg
//
// ffmpeg reads both inputs straight from their direct URLs, copies the video
// stream and transcodes audio to AAC into an MP4. Each merge writes to its
// own uniquely named file in the scratch directory.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::DownloadError;
use super::models::MergePlan;
use super::tools::find_binary;
use super::utils::{run_output_with_timeout, safe_filename};

/// Audio codec of the muxing target
pub const MERGE_AUDIO_CODEC: &str = "aac";

/// Merged output on disk.
///
/// The file is removed when this value is dropped, unless `persist` was
/// called to keep it for static delivery.
#[derive(Debug)]
pub struct MergedFile {
    path: PathBuf,
    size: u64,
    keep: bool,
}

impl MergedFile {
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            keep: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Keep the file on disk and schedule its removal after `retention`.
    pub fn persist(mut self, retention: Duration) -> PathBuf {
        self.keep = true;
        let path = self.path.clone();

        let expired = path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(retention).await;
            match tokio::fs::remove_file(&expired).await {
                Ok(()) => debug!(path = %expired.display(), "expired merged file removed"),
                Err(e) => debug!(path = %expired.display(), "merged file already gone: {}", e),
            }
        });

        path
    }
}

impl Drop for MergedFile {
    fn drop(&mut self) {
        if !self.keep {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Produces the bytes of a synthesized catalog entry
#[async_trait]
pub trait MergeExecutor: Send + Sync {
    /// Name of the executor (for logging)
    fn name(&self) -> &'static str;

    /// Merge the plan's streams into a new file named after `video_id`
    async fn merge(&self, plan: &MergePlan, video_id: &str) -> Result<MergedFile, DownloadError>;
}

/// ffmpeg-based merger
pub struct FfmpegMerger {
    ffmpeg_path: String,
    scratch_dir: PathBuf,
    user_agent: Option<String>,
    timeout_seconds: u64,
}

impl FfmpegMerger {
    pub fn new(
        ffmpeg_path: Option<&str>,
        scratch_dir: PathBuf,
        user_agent: Option<String>,
        timeout_seconds: u64,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path
                .map(str::to_string)
                .unwrap_or_else(|| find_binary("ffmpeg")),
            scratch_dir,
            user_agent,
            timeout_seconds,
        }
    }

    /// Unique output path for one merge request
    pub fn output_path(&self, video_id: &str, container: &str) -> PathBuf {
        self.scratch_dir.join(format!(
            "{}_{}_merged.{}",
            safe_filename(video_id),
            Uuid::new_v4().simple(),
            container
        ))
    }

    /// Build command arguments
    pub fn build_args(&self, plan: &MergePlan, output: &Path) -> Result<Vec<String>, DownloadError> {
        let video_url = plan
            .video
            .url
            .as_ref()
            .ok_or_else(|| DownloadError::MergeFailed(format!("format {} has no URL", plan.video.id)))?;
        let audio_url = plan
            .audio
            .url
            .as_ref()
            .ok_or_else(|| DownloadError::MergeFailed(format!("format {} has no URL", plan.audio.id)))?;

        let mut args = vec![
            "-y".to_string(),
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
        ];

        for input in [video_url, audio_url] {
            if let Some(ua) = &self.user_agent {
                args.push("-user_agent".to_string());
                args.push(ua.clone());
            }
            args.push("-i".to_string());
            args.push(input.clone());
        }

        args.extend(
            [
                "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", MERGE_AUDIO_CODEC,
                "-movflags", "+faststart",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.push(output.to_string_lossy().into_owned());

        Ok(args)
    }
}

#[async_trait]
impl MergeExecutor for FfmpegMerger {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn merge(&self, plan: &MergePlan, video_id: &str) -> Result<MergedFile, DownloadError> {
        tokio::fs::create_dir_all(&self.scratch_dir).await.map_err(|e| {
            DownloadError::MergeFailed(format!(
                "cannot create scratch dir {}: {}",
                self.scratch_dir.display(),
                e
            ))
        })?;

        let output = self.output_path(video_id, &plan.output_container);
        let args = self.build_args(plan, &output)?;

        // Owns the output from here on so every failure path cleans it up
        let mut merged = MergedFile::new(output.clone(), 0);

        info!(merge = %plan.id(), output = %output.display(), "starting ffmpeg merge");
        let result = run_output_with_timeout(&self.ffmpeg_path, &args, self.timeout_seconds).await;

        match result {
            Ok(out) if out.status.success() => {}
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                warn!(merge = %plan.id(), status = %out.status, "ffmpeg failed: {}", stderr.trim());
                return Err(DownloadError::MergeFailed(format!(
                    "ffmpeg exited with {}",
                    out.status
                )));
            }
            Err(e) => {
                warn!(merge = %plan.id(), "ffmpeg did not complete: {}", e);
                return Err(DownloadError::MergeFailed(e.to_string()));
            }
        }

        let size = tokio::fs::metadata(&output)
            .await
            .map(|m| m.len())
            .unwrap_or(0);
        if size == 0 {
            return Err(DownloadError::MergeFailed(
                "ffmpeg produced no output".to_string(),
            ));
        }

        merged.size = size;
        info!(merge = %plan.id(), size, "merge finished");
        Ok(merged)
    }
}
