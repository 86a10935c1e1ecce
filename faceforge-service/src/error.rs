use crate::services::providers::ProviderError;
use axum::http::StatusCode;
use service_core::error::AppError;
use thiserror::Error;

/// Rejections detected locally, before any provider is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("API key is required")]
    MissingCredential,

    #[error("Invalid API key")]
    InvalidCredential,

    #[error(
        "Invalid process_type. Must be either 'avatar_theme', 'image_edit', or 'video_generation'"
    )]
    UnknownProcessType,

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Invalid {field}. Must be one of: {allowed}")]
    InvalidEnum {
        field: &'static str,
        allowed: String,
    },

    #[error("{field} must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("{0}")]
    MalformedPayload(String),
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::MissingCredential | RequestError::InvalidCredential => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Short label used for the rejection metric.
    pub fn kind(&self) -> &'static str {
        match self {
            RequestError::MissingCredential => "missing_credential",
            RequestError::InvalidCredential => "invalid_credential",
            RequestError::UnknownProcessType => "unknown_process_type",
            RequestError::MissingField(_) => "missing_field",
            RequestError::InvalidEnum { .. } => "invalid_enum",
            RequestError::InvalidField { .. } => "invalid_field",
            RequestError::MalformedPayload(_) => "malformed_payload",
        }
    }
}

/// Anything that can end a facade request unsuccessfully.
#[derive(Debug, Error)]
pub enum FacadeError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl FacadeError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            FacadeError::Request(e) => e.status_code(),
            FacadeError::Provider(ProviderError::NotFound(_)) => StatusCode::NOT_FOUND,
            FacadeError::Provider(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<FacadeError> for AppError {
    fn from(err: FacadeError) -> Self {
        let status = err.status_code();
        let message = err.to_string();
        match status {
            StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
            StatusCode::BAD_REQUEST => AppError::BadRequest(message),
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            _ => AppError::Upstream(message),
        }
    }
}
