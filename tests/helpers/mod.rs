#![allow(dead_code)]

use async_trait::async_trait;
use axum::{routing::get, Router};
use axum_test::TestServer;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use video_dl_api::api::{self, AppState};
use video_dl_api::config::{Config, DeliveryMode};
use video_dl_api::downloader::extractors::{ExtractorConfig, InfoExtractor};
use video_dl_api::downloader::{
    DownloadError, MergeExecutor, MergePlan, MergedFile, StreamDescriptor, SubtitleTrack,
    VideoMetadata,
};

pub const MERGED_BYTES: &[u8] = b"merged-video-bytes";
pub const UPSTREAM_BYTES: &[u8] = b"direct-format-bytes";

/// Extractor that returns a canned result and records what it was asked
pub struct FakeExtractor {
    result: Result<VideoMetadata, DownloadError>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeExtractor {
    pub fn new(result: Result<VideoMetadata, DownloadError>) -> Self {
        Self {
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InfoExtractor for FakeExtractor {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn extract(
        &self,
        url: &str,
        _config: &ExtractorConfig,
    ) -> Result<VideoMetadata, DownloadError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.result.clone()
    }
}

/// Merger that writes fixed bytes instead of running ffmpeg
pub struct FakeMerger {
    scratch_dir: PathBuf,
    fail: bool,
    pub merges: AtomicUsize,
    pub plans: Mutex<Vec<String>>,
}

impl FakeMerger {
    pub fn new(scratch_dir: PathBuf) -> Self {
        Self {
            scratch_dir,
            fail: false,
            merges: AtomicUsize::new(0),
            plans: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(scratch_dir: PathBuf) -> Self {
        Self {
            fail: true,
            ..Self::new(scratch_dir)
        }
    }
}

#[async_trait]
impl MergeExecutor for FakeMerger {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn merge(&self, plan: &MergePlan, video_id: &str) -> Result<MergedFile, DownloadError> {
        let n = self.merges.fetch_add(1, Ordering::SeqCst);
        self.plans.lock().unwrap().push(plan.id());

        if self.fail {
            return Err(DownloadError::MergeFailed("ffmpeg exited with 1".into()));
        }

        let path = self
            .scratch_dir
            .join(format!("{}_{}_merged.{}", video_id, n, plan.output_container));
        tokio::fs::write(&path, MERGED_BYTES)
            .await
            .map_err(|e| DownloadError::MergeFailed(e.to_string()))?;
        Ok(MergedFile::new(path, MERGED_BYTES.len() as u64))
    }
}

pub fn format(
    id: &str,
    ext: &str,
    vcodec: &str,
    acodec: &str,
    height: Option<u32>,
    size: Option<u64>,
    base_url: &str,
) -> StreamDescriptor {
    StreamDescriptor {
        id: id.to_string(),
        container: ext.to_string(),
        height,
        size_bytes: size,
        vcodec: Some(vcodec.to_string()),
        acodec: Some(acodec.to_string()),
        url: Some(format!("{}/media/{}", base_url, id)),
    }
}

fn track(language: &str, base_url: &str, kind: &str) -> SubtitleTrack {
    SubtitleTrack {
        language: language.to_string(),
        ext: Some("vtt".to_string()),
        url: Some(format!("{}/subs/{}/{}.vtt", base_url, kind, language)),
    }
}

/// 1080p video-only + m4a audio-only + a progressive 360p format
pub fn sample_metadata(base_url: &str) -> VideoMetadata {
    VideoMetadata {
        id: "abc123".to_string(),
        title: "Sample Video".to_string(),
        uploader: Some("Uploader".to_string()),
        thumbnail: Some("https://img.example/abc123.jpg".to_string()),
        duration: Some(212.0),
        formats: vec![
            format("18", "mp4", "avc1.42001E", "mp4a.40.2", Some(360), Some(5000), base_url),
            format("137", "mp4", "avc1.640028", "none", Some(1080), Some(1000), base_url),
            format("140", "m4a", "none", "mp4a.40.2", None, None, base_url),
        ],
        subtitles: vec![("en".to_string(), vec![track("en", base_url, "manual")])],
        automatic_captions: vec![
            ("en".to_string(), vec![track("en", base_url, "auto")]),
            ("fr".to_string(), vec![track("fr", base_url, "auto")]),
        ],
    }
}

/// Real HTTP server standing in for a media CDN
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/media/{id}", get(|| async { UPSTREAM_BYTES }))
        .route("/subs/{kind}/{lang}", get(|| async { "WEBVTT\n\n00:00.000 --> 00:01.000\nhello\n" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub struct TestApp {
    pub server: TestServer,
    pub extractor: Arc<FakeExtractor>,
    pub merger: Arc<FakeMerger>,
    pub scratch: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn scratch_files(&self) -> usize {
        std::fs::read_dir(self.scratch.path()).unwrap().count()
    }
}

pub struct TestAppBuilder {
    delivery: DeliveryMode,
    result: Result<VideoMetadata, DownloadError>,
    failing_merger: bool,
}

impl TestAppBuilder {
    pub fn new(metadata: VideoMetadata) -> Self {
        Self {
            delivery: DeliveryMode::Stream,
            result: Ok(metadata),
            failing_merger: false,
        }
    }

    pub fn failing_extraction(err: DownloadError) -> Self {
        Self {
            delivery: DeliveryMode::Stream,
            result: Err(err),
            failing_merger: false,
        }
    }

    pub fn delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn failing_merger(mut self) -> Self {
        self.failing_merger = true;
        self
    }

    pub fn build(self) -> TestApp {
        let scratch = tempfile::tempdir().expect("Failed to create scratch dir");

        let mut config = Config::default();
        config.server.delivery = self.delivery;
        config.merge.scratch_dir = Some(scratch.path().to_path_buf());

        let extractor = Arc::new(FakeExtractor::new(self.result));
        let merger = Arc::new(if self.failing_merger {
            FakeMerger::failing(scratch.path().to_path_buf())
        } else {
            FakeMerger::new(scratch.path().to_path_buf())
        });

        let state = AppState::new(&config, extractor.clone(), merger.clone())
            .expect("Failed to build app state");
        let server = TestServer::new(api::router(state)).expect("Failed to create test server");

        TestApp {
            server,
            extractor,
            merger,
            scratch,
        }
    }
}
