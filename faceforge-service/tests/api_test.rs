//! REST route tests against mock providers.

mod common;

use axum::http::StatusCode;
use common::{route, TestApp, API_KEY};
use serde_json::json;

#[tokio::test]
async fn avatar_theme_returns_envelope() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/avatar-theme"),
            &json!({"api_key": API_KEY, "image_url": "https://x/face.jpg", "theme": "Anime"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert!(body["error"].is_null());
    assert!(body["data"]["image_url"].as_str().unwrap().ends_with("anime.jpg"));
    assert_eq!(app.avatar.calls(), 1);
}

#[tokio::test]
async fn missing_api_key_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/avatar-theme"),
            &json!({"image_url": "https://x/face.jpg", "theme": "anime"}),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "API key is required");
    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn wrong_api_key_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/image-edit"),
            &json!({
                "api_key": "not-the-key",
                "image_url": "https://x/face.jpg",
                "section": "hair",
                "prompt": "pink hair"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid API key");
    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn invalid_theme_lists_allowed_values() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/avatar-theme"),
            &json!({"api_key": API_KEY, "image_url": "https://x/y.jpg", "theme": "bogus"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Invalid theme. Must be one of: ['realistic portrait', 'anime', 'cyberpunk', 'toy', 'ghibli', 'emoji']"
    );
    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn each_missing_field_is_reported_without_provider_calls() {
    let app = TestApp::new();
    let cases = [
        ("/avatar-theme", json!({"api_key": API_KEY, "theme": "toy"}), "image_url is required"),
        ("/avatar-theme", json!({"api_key": API_KEY, "image_url": "https://x/y.jpg"}), "theme is required"),
        (
            "/image-edit",
            json!({"api_key": API_KEY, "image_url": "https://x/y.jpg", "prompt": "p"}),
            "section is required",
        ),
        (
            "/image-edit",
            json!({"api_key": API_KEY, "image_url": "https://x/y.jpg", "section": "hair"}),
            "prompt is required",
        ),
        (
            "/video-generation",
            json!({"api_key": API_KEY, "image_url": "https://x/y.jpg", "text_prompt": "hi"}),
            "audio_url is required",
        ),
        (
            "/video-generation",
            json!({"api_key": API_KEY, "image_url": "https://x/y.jpg", "audio_url": "https://x/a.mp3"}),
            "text_prompt is required",
        ),
    ];

    for (path, payload, detail) in cases {
        let (status, body) = app.post_json(&route(path), &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["detail"], detail, "{}", path);
    }

    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn image_edit_returns_image_and_generated_mask() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/image-edit"),
            &json!({
                "api_key": API_KEY,
                "image_url": "https://x/face.jpg",
                "section": "Clothes",
                "prompt": "a leather jacket"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["image_url"].is_string());
    assert!(body["data"]["mask_url"]
        .as_str()
        .unwrap()
        .contains("mask_clothes"));
    assert_eq!(app.editor.mask_calls(), 1);
}

#[tokio::test]
async fn mask_route_returns_mask_url() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/image-edit/mask"),
            &json!({"api_key": API_KEY, "image_url": "https://x/face.jpg", "section": "background"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["mask_url"]
        .as_str()
        .unwrap()
        .ends_with("mask_background.png"));
    assert_eq!(app.editor.edit_calls(), 0);
}

#[tokio::test]
async fn video_generation_waits_for_completion() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/video-generation"),
            &json!({
                "api_key": API_KEY,
                "image_url": "https://x/face.jpg",
                "audio_url": "https://x/voice.mp3",
                "text_prompt": "A person speaking calmly"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "complete");
    assert_eq!(body["data"]["type"], "video");
    assert!(body["data"]["video_url"].as_str().unwrap().ends_with(".mp4"));
}

#[tokio::test]
async fn failed_generation_is_a_server_error() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/video-generation"),
            &json!({
                "api_key": API_KEY,
                "image_url": "https://x/face.jpg",
                "audio_url": "https://x/voice.mp3",
                "text_prompt": "this one should fail"
            }),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "Video generation failed: Mock generation failed");
}

#[tokio::test]
async fn submitted_job_moves_through_statuses() {
    let app = TestApp::new();

    let (status, body) = app
        .post_json(
            &route("/video-generation/submit"),
            &json!({
                "api_key": API_KEY,
                "image_url": "https://x/face.jpg",
                "audio_url": "https://x/voice.mp3",
                "text_prompt": "hello"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "queued");
    let job_id = body["data"]["job_id"].as_str().unwrap().to_string();

    let status_path = route(&format!("/video-generation/status/{}", job_id));

    let (status, body) = app.get(&status_path, Some(API_KEY)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "processing");

    let (_, body) = app.get(&status_path, Some(API_KEY)).await;
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["video_url"].is_string());
}

#[tokio::test]
async fn job_status_requires_header_key() {
    let app = TestApp::new();

    let (status, body) = app
        .get(&route("/video-generation/status/abc"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "API key is required");
}

#[tokio::test]
async fn encoded_path_in_job_id_is_rejected() {
    let app = TestApp::new();

    let (status, body) = app
        .get(
            &route("/video-generation/status/..%2F..%2Fassets%3Fx%3D"),
            Some(API_KEY),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("job_id must be"));
}

#[tokio::test]
async fn unknown_job_is_not_found() {
    let app = TestApp::new();

    let (status, body) = app
        .get(&route("/video-generation/status/unknown-job"), Some(API_KEY))
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Job unknown-job not found");
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = TestApp::new();

    let (status, body) = app.post_raw(&route("/avatar-theme"), "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
    assert_eq!(app.provider_calls(), 0);
}

#[tokio::test]
async fn routes_can_be_mounted_at_root() {
    let app = TestApp::with_prefix("");

    let (status, _) = app
        .post_json(
            "/avatar-theme",
            &json!({"api_key": API_KEY, "image_url": "https://x/face.jpg", "theme": "emoji"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn root_health_and_ready_respond() {
    let app = TestApp::new();

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome to FaceForge AI API");
    assert_eq!(body["docs_url"], "/api/v1/docs");

    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn advertised_docs_url_is_served() {
    let app = TestApp::new();

    let (_, root) = app.get("/", None).await;
    let docs_url = root["docs_url"].as_str().unwrap().to_string();

    let (status, _) = app.get(&docs_url, None).await;
    assert_ne!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get(&format!("{}/", docs_url), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, document) = app.get(&route("/openapi.json"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(document["paths"]["/api/v1/avatar-theme"]["post"].is_object());
    assert!(document["paths"]["/api/v1/video-generation/status/{job_id}"]["get"].is_object());
    assert!(document["paths"]["/health"]["get"].is_object());
}

#[tokio::test]
async fn docs_follow_an_empty_prefix() {
    let app = TestApp::with_prefix("");

    let (_, root) = app.get("/", None).await;
    assert_eq!(root["docs_url"], "/docs");

    let (status, document) = app.get("/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(document["paths"]["/avatar-theme"].is_object());
}
