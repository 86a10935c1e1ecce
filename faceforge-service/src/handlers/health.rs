use crate::services::metrics::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message, version and docs location")),
    tag = "Service"
)]
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to FaceForge AI API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs_url": format!("{}/docs", state.api_prefix)
    }))
}

/// Health check endpoint for Docker/K8s liveness checks.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive")),
    tag = "Service"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "faceforge-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness: every provider must be configured (or mocked).
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "Every provider is usable"),
        (status = 503, description = "Providers that are not usable")
    ),
    tag = "Service"
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let failures = state.processor.dispatcher().health_check().await;

    if failures.is_empty() {
        return (StatusCode::OK, Json(json!({ "status": "ready" })));
    }

    let providers: Vec<_> = failures
        .iter()
        .map(|(process_type, e)| {
            json!({ "process_type": process_type.as_str(), "error": e.to_string() })
        })
        .collect();

    tracing::warn!(unhealthy = providers.len(), "Readiness check failed");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "status": "unavailable", "providers": providers })),
    )
}

#[utoipa::path(
    get,
    path = "/metrics",
    responses((status = 200, description = "Prometheus text exposition")),
    tag = "Service"
)]
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}
