mod helpers;

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::sync::atomic::Ordering;

use helpers::{sample_metadata, spawn_upstream, TestAppBuilder, MERGED_BYTES, UPSTREAM_BYTES};
use video_dl_api::config::DeliveryMode;
use video_dl_api::downloader::DownloadError;

const BASE: &str = "https://cdn.example";
const VIDEO_URL: &str = "https://www.youtube.com/watch?v=abc123";

#[tokio::test]
async fn index_describes_the_api() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let response = app.client().get("/").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("/video-info"));
}

#[tokio::test]
async fn video_info_requires_url() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let empty = app.client().post("/video-info").await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = empty.json();
    assert!(body["error"].as_str().unwrap().contains("url"));

    let blank = app.client().post("/video-info").json(&json!({ "url": "  " })).await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);

    assert_eq!(app.extractor.call_count(), 0);
}

#[tokio::test]
async fn video_info_lists_catalog_and_subtitles() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let response = app
        .client()
        .post("/video-info")
        .json(&json!({ "url": VIDEO_URL }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["video_id"], "abc123");
    assert_eq!(body["title"], "Sample Video");
    assert_eq!(body["duration"], 212.0);

    let formats = body["formats"].as_array().unwrap();
    let ids: Vec<&str> = formats.iter().map(|f| f["format_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["18", "137", "140", "137+140"]);

    let merged = &formats[3];
    assert_eq!(merged["type"], "video+audio");
    assert_eq!(merged["ext"], "mp4");
    assert_eq!(merged["resolution"], 1080);
    assert_eq!(merged["filesize"], 1000);
    assert_eq!(merged["merged"], true);

    assert_eq!(formats[1]["type"], "video-only");
    assert_eq!(formats[2]["type"], "audio-only");
    assert_eq!(formats[0]["merged"], false);

    assert_eq!(body["subtitles"].as_array().unwrap().len(), 1);
    let auto = body["automatic_subtitles"].as_array().unwrap();
    assert_eq!(auto[0]["language"], "en");
    assert_eq!(auto[1]["language"], "fr");
}

#[tokio::test]
async fn short_links_are_normalized_before_extraction() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    app.client()
        .post("/video-info")
        .json(&json!({ "url": "https://youtu.be/abc123?si=tracking" }))
        .await;

    let calls = app.extractor.calls.lock().unwrap().clone();
    assert_eq!(calls, vec![VIDEO_URL.to_string()]);
}

#[tokio::test]
async fn content_restrictions_are_client_errors() {
    let err = DownloadError::from_extractor_output("ERROR: [youtube] abc123: Video unavailable");
    let app = TestAppBuilder::failing_extraction(err).build();

    let response = app
        .client()
        .post("/video-info")
        .json(&json!({ "url": VIDEO_URL }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["reason"], "video_unavailable");
    assert!(body["error"].as_str().unwrap().contains("Video unavailable"));
}

#[tokio::test]
async fn other_extraction_failures_are_server_errors() {
    let app = TestAppBuilder::failing_extraction(DownloadError::ToolNotFound("yt-dlp".into())).build();

    let response = app
        .client()
        .post("/video-info")
        .json(&json!({ "url": VIDEO_URL }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn download_video_requires_url_and_format() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], "Missing \"url\" or \"format_id\"");
}

#[tokio::test]
async fn unknown_format_is_not_found() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "999")
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unoffered_merge_is_not_found_without_merging() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    for id in ["137+999", "18+140", "140+137"] {
        let response = app
            .client()
            .get("/download-video")
            .add_query_param("url", VIDEO_URL)
            .add_query_param("format_id", id)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "{}", id);
    }

    assert_eq!(app.merger.merges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn merged_flag_on_direct_id_serves_the_format() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).delivery(DeliveryMode::Link).build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "18")
        .add_query_param("merged", "true")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["download_url"], "https://cdn.example/media/18");
    assert_eq!(body["filename"], "Sample Video.mp4");

    let response = app
        .client()
        .post("/download-video")
        .json(&json!({ "url": VIDEO_URL, "format_id": "137", "merged": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["download_url"], "https://cdn.example/media/137");

    assert_eq!(app.merger.merges.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn merged_download_streams_the_merged_file() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "137+140")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), MERGED_BYTES);

    let disposition = response.header("content-disposition");
    assert_eq!(
        disposition.to_str().unwrap(),
        "attachment; filename*=UTF-8''Sample%20Video.mp4"
    );
    assert_eq!(response.header("content-type").to_str().unwrap(), "video/mp4");

    assert_eq!(app.merger.plans.lock().unwrap().clone(), vec!["137+140".to_string()]);
}

#[tokio::test]
async fn every_request_extracts_afresh() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).delivery(DeliveryMode::Link).build();

    for _ in 0..2 {
        app.client()
            .get("/download-video")
            .add_query_param("url", VIDEO_URL)
            .add_query_param("format_id", "137")
            .await;
    }

    assert_eq!(app.extractor.call_count(), 2);
}

#[tokio::test]
async fn merged_link_points_at_static_copy() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).delivery(DeliveryMode::Link).build();

    let response = app
        .client()
        .post("/download-video")
        .json(&json!({ "url": VIDEO_URL, "format_id": "137+140", "merged": "1" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["filename"], "Sample Video.mp4");
    assert_eq!(body["filesize"], MERGED_BYTES.len());

    let download_url = body["download_url"].as_str().unwrap();
    assert!(download_url.starts_with("/static/"));
    assert_eq!(app.scratch_files(), 1);

    let file = app.client().get(download_url).await;
    assert_eq!(file.status_code(), StatusCode::OK);
    assert_eq!(file.as_bytes().as_ref(), MERGED_BYTES);
}

#[tokio::test]
async fn merged_redirect_points_at_static_copy() {
    let app = TestAppBuilder::new(sample_metadata(BASE))
        .delivery(DeliveryMode::Redirect)
        .build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "137+140")
        .await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    let location = response.header("location");
    assert!(location.to_str().unwrap().starts_with("/static/abc123_"));
}

#[tokio::test]
async fn merge_failure_is_reported_generically() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).failing_merger().build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "137+140")
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to merge video and audio");
    assert_eq!(app.scratch_files(), 0);
}

#[tokio::test]
async fn direct_format_is_proxied_from_upstream() {
    let upstream = spawn_upstream().await;
    let app = TestAppBuilder::new(sample_metadata(&upstream)).build();

    let response = app
        .client()
        .get("/download-video")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("format_id", "18")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.as_bytes().as_ref(), UPSTREAM_BYTES);
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename*=UTF-8''Sample%20Video.mp4"
    );
}

#[tokio::test]
async fn unreachable_upstream_is_bad_gateway() {
    let app = TestAppBuilder::new(sample_metadata("http://127.0.0.1:9")).build();

    let response = app
        .client()
        .get("/download-audio")
        .add_query_param("url", VIDEO_URL)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn audio_redirects_to_best_audio_only_format() {
    let app = TestAppBuilder::new(sample_metadata(BASE))
        .delivery(DeliveryMode::Redirect)
        .build();

    let response = app
        .client()
        .get("/download-audio")
        .add_query_param("url", VIDEO_URL)
        .await;

    assert_eq!(response.status_code(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location").to_str().unwrap(),
        "https://cdn.example/media/140"
    );
}

#[tokio::test]
async fn audio_link_uses_real_container() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).delivery(DeliveryMode::Link).build();

    let response = app
        .client()
        .post("/download-audio")
        .json(&json!({ "url": VIDEO_URL }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["filename"], "Sample Video.m4a");
    assert_eq!(body["download_url"], "https://cdn.example/media/140");
}

#[tokio::test]
async fn missing_subtitle_is_not_found() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).build();

    for auto in ["false", "true"] {
        let response = app
            .client()
            .get("/download-subtitle")
            .add_query_param("url", VIDEO_URL)
            .add_query_param("language", "de")
            .add_query_param("auto", auto)
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    // fr only exists as an automatic caption
    let response = app
        .client()
        .get("/download-subtitle")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("language", "fr")
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn automatic_subtitle_link() {
    let app = TestAppBuilder::new(sample_metadata(BASE)).delivery(DeliveryMode::Link).build();

    let response = app
        .client()
        .post("/download-subtitle")
        .json(&json!({ "url": VIDEO_URL, "language": "fr", "auto": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["filename"], "Sample Video_fr_auto.vtt");
    assert_eq!(body["download_url"], "https://cdn.example/subs/auto/fr.vtt");
}

#[tokio::test]
async fn subtitle_stream_is_plain_text() {
    let upstream = spawn_upstream().await;
    let app = TestAppBuilder::new(sample_metadata(&upstream)).build();

    let response = app
        .client()
        .get("/download-subtitle")
        .add_query_param("url", VIDEO_URL)
        .add_query_param("language", "en")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert!(response.text().starts_with("WEBVTT"));
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename*=UTF-8''Sample%20Video_en.vtt"
    );
}
