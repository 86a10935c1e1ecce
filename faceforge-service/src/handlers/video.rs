use super::image::to_data;
use super::json_body;
use crate::docs::{ErrorDetail, VideoGenerationBody};
use crate::models::{Envelope, ProcessType};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use service_core::error::AppError;

pub const API_KEY_HEADER: &str = "x-api-key";

/// `POST /video-generation`: submit and wait for the finished video.
#[utoipa::path(
    post,
    path = "/video-generation",
    request_body = VideoGenerationBody,
    responses(
        (status = 200, description = "Finished video", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn generate_video(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let payload = json_body(payload)?;
    let data = state
        .processor
        .process_as(ProcessType::VideoGeneration, &payload)
        .await?;

    Ok(Json(Envelope::success(data)))
}

/// `POST /video-generation/submit`: start a generation, return its job id.
#[utoipa::path(
    post,
    path = "/video-generation/submit",
    request_body = VideoGenerationBody,
    responses(
        (status = 200, description = "Queued job", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn submit_video(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let payload = json_body(payload)?;
    let job = state.processor.submit_video(&payload).await?;

    tracing::info!(job_id = %job.job_id, "Video job queued");
    Ok(Json(Envelope::success(to_data(&job)?)))
}

/// `GET /video-generation/status/:job_id`
#[utoipa::path(
    get,
    path = "/video-generation/status/{job_id}",
    params(
        ("job_id" = String, Path, description = "Id returned by the submit route"),
        ("x-api-key" = String, Header, description = "Service access key")
    ),
    responses(
        (status = 200, description = "Current job status", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail),
        (status = 404, description = "Unknown job", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, headers))]
pub async fn video_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Envelope>, AppError> {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    let job = state.processor.video_status(api_key, &job_id).await?;

    Ok(Json(Envelope::success(to_data(&job)?)))
}
