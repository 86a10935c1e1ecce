use super::json_body;
use crate::docs::{AvatarThemeBody, ErrorDetail};
use crate::models::{Envelope, ProcessType};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use service_core::error::AppError;

/// `POST /avatar-theme`
#[utoipa::path(
    post,
    path = "/avatar-theme",
    request_body = AvatarThemeBody,
    responses(
        (status = 200, description = "Themed avatar image", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn avatar_theme(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let payload = json_body(payload)?;
    let data = state
        .processor
        .process_as(ProcessType::AvatarTheme, &payload)
        .await?;

    Ok(Json(Envelope::success(data)))
}
