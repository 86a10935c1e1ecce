//! `POST /run`: the serverless handler form.
//!
//! The body wraps the payload as `{"input": {...}}` and names the operation
//! through `input.process_type`. Every outcome, including rejections, is a
//! full envelope.

use crate::error::{FacadeError, RequestError};
use crate::docs::RunJobBody;
use crate::models::Envelope;
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;

#[utoipa::path(
    post,
    path = "/run",
    request_body = RunJobBody,
    responses(
        (status = 200, description = "Operation result", body = Envelope),
        (status = 400, description = "Invalid payload", body = Envelope),
        (status = 401, description = "Missing or invalid API key", body = Envelope),
        (status = 404, description = "Unknown job", body = Envelope),
        (status = 500, description = "Provider failure", body = Envelope)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn run_job(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> (StatusCode, Json<Envelope>) {
    let job = match payload {
        Ok(Json(job)) => job,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(Envelope::error(rejection.body_text())),
            );
        }
    };

    let result = match job.get("input") {
        Some(input) if input.is_object() => state.processor.process(input).await,
        _ => Err(FacadeError::from(RequestError::MissingField("input"))),
    };

    match result {
        Ok(data) => (StatusCode::OK, Json(Envelope::success(data))),
        Err(e) => {
            let status = e.status_code();
            if status.is_server_error() {
                tracing::error!(error = %e, "Job failed");
            }
            (status, Json(Envelope::error(e.to_string())))
        }
    }
}
