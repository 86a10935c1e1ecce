//! HTTP handlers.
//!
//! REST routes answer with the response envelope on success and
//! `{"detail": ...}` on failure. `/run` keeps the envelope for errors too.

pub mod avatar;
pub mod health;
pub mod image;
pub mod job;
pub mod video;

use axum::extract::rejection::JsonRejection;
use axum::Json;
use serde_json::Value;
use service_core::error::AppError;

/// Unwrap a JSON body, turning extractor rejections into a 400.
pub(crate) fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
