use super::json_body;
use crate::docs::{ErrorDetail, ImageEditBody, MaskBody};
use crate::models::{Envelope, ProcessType};
use crate::startup::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;
use service_core::error::AppError;

/// `POST /image-edit`
#[utoipa::path(
    post,
    path = "/image-edit",
    request_body = ImageEditBody,
    responses(
        (status = 200, description = "Edited image and the mask used", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn image_edit(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let payload = json_body(payload)?;
    let data = state
        .processor
        .process_as(ProcessType::ImageEdit, &payload)
        .await?;

    Ok(Json(Envelope::success(data)))
}

/// `POST /image-edit/mask`: generate only the mask for a section.
#[utoipa::path(
    post,
    path = "/image-edit/mask",
    request_body = MaskBody,
    responses(
        (status = 200, description = "Generated mask", body = Envelope),
        (status = 400, description = "Invalid payload", body = ErrorDetail),
        (status = 401, description = "Missing or invalid API key", body = ErrorDetail),
        (status = 500, description = "Provider failure", body = ErrorDetail)
    ),
    tag = "Processing"
)]
#[tracing::instrument(skip(state, payload))]
pub async fn create_mask(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope>, AppError> {
    let payload = json_body(payload)?;
    let mask = state.processor.create_mask(&payload).await?;

    Ok(Json(Envelope::success(to_data(&mask)?)))
}

pub(crate) fn to_data<T: serde::Serialize>(value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::InternalError(e.into()))
}
