//! Shared helpers for router-level tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use faceforge_service::services::providers::mock::{
    MockAvatarProvider, MockImageEditProvider, MockVideoProvider,
};
use faceforge_service::services::{ApiKeyVerifier, Dispatcher, PollSettings, Processor};
use faceforge_service::startup::{build_router, AppState};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::util::ServiceExt;

pub const API_KEY: &str = "integration-test-key";
pub const PREFIX: &str = "/api/v1";

pub struct TestApp {
    pub router: Router,
    pub avatar: Arc<MockAvatarProvider>,
    pub editor: Arc<MockImageEditProvider>,
    pub video: Arc<MockVideoProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_prefix(PREFIX)
    }

    pub fn with_prefix(prefix: &str) -> Self {
        let avatar = Arc::new(MockAvatarProvider::new(true));
        let editor = Arc::new(MockImageEditProvider::new(true));
        let video = Arc::new(MockVideoProvider::with_polls(true, 1));

        let dispatcher = Dispatcher::new(
            avatar.clone(),
            editor.clone(),
            video.clone(),
            PollSettings {
                interval: Duration::ZERO,
                max_attempts: 5,
            },
        );
        let processor = Processor::new(
            ApiKeyVerifier::new(Secret::new(API_KEY.to_string())),
            dispatcher,
        );
        let router = build_router(AppState::new(processor, prefix));

        Self {
            router,
            avatar,
            editor,
            video,
        }
    }

    /// Total calls that reached any mock provider.
    pub fn provider_calls(&self) -> usize {
        self.avatar.calls() + self.editor.calls() + self.video.calls()
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_raw(&self, path: &str, body: &'static str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, path: &str, api_key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(path);
        if let Some(key) = api_key {
            builder = builder.header("x-api-key", key);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(&self.router, request).await
    }
}

/// Drive one request through a router and decode the JSON body, if any.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// Serve a canned upstream on an ephemeral local port; returns its base URL.
pub async fn serve_stub(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn route(path: &str) -> String {
    format!("{}{}", PREFIX, path)
}
