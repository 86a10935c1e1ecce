//! External AI provider abstractions and implementations.
//!
//! Each operation family has its own trait so the dispatcher can be wired
//! with real HTTP clients in production and mocks in tests.

pub mod deepai;
pub mod hedra;
pub mod imagekit;
mod imaging;
pub mod mock;
pub mod segmind;

use crate::models::{
    AvatarThemeParams, EditSection, EditedImage, GenerationStatus, ImageEditParams, ThemedImage,
    VideoGenerationParams,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use service_core::observability::TracedRequestExt;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with a non-success status.
    #[error("{0}")]
    ApiError(String),

    /// The provider accepted the work but reported that it failed.
    #[error("{0}")]
    GenerationFailed(String),

    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to reach provider: {0}")]
    NetworkError(String),

    #[error("Timed out waiting for provider: {0}")]
    Timeout(String),
}

impl ProviderError {
    /// Whether the failure happened before the provider gave an answer.
    pub fn is_transport(&self) -> bool {
        matches!(self, ProviderError::NetworkError(_) | ProviderError::Timeout(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::NetworkError(err.to_string())
        }
    }
}

/// Avatar restyling (e.g. DeepAI image editor).
#[async_trait]
pub trait AvatarProvider: Send + Sync {
    async fn apply_theme(&self, params: &AvatarThemeParams) -> Result<ThemedImage, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Mask generation and mask-guided inpainting (e.g. Segmind).
#[async_trait]
pub trait ImageEditProvider: Send + Sync {
    /// Generate a mask for `section` and return its public URL.
    async fn create_mask(
        &self,
        image_url: &str,
        section: EditSection,
    ) -> Result<String, ProviderError>;

    /// Edit the masked region according to the prompt.
    async fn edit(&self, params: &ImageEditParams) -> Result<EditedImage, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Talking-head video generation (e.g. Hedra).
///
/// Generation is asynchronous on the provider side: `submit` returns a
/// generation id which is then polled through `status`.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    async fn submit(&self, params: &VideoGenerationParams) -> Result<String, ProviderError>;

    async fn status(&self, generation_id: &str) -> Result<GenerationStatus, ProviderError>;

    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Fetch a caller-supplied media URL.
pub(crate) async fn download(client: &Client, url: &str) -> Result<Vec<u8>, ProviderError> {
    let response = client.get(url).traced().send().await?;

    if !response.status().is_success() {
        return Err(ProviderError::ApiError(format!(
            "Failed to download {}: {}",
            url,
            response.status()
        )));
    }

    Ok(response.bytes().await?.to_vec())
}

/// Append path segments to a provider base URL. Each segment is
/// percent-encoded, so ids can never add path levels or a query string.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url, ProviderError> {
    let mut url = Url::parse(base).map_err(|e| {
        ProviderError::NotConfigured(format!("Invalid provider URL {}: {}", base, e))
    })?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::NotConfigured(format!("Invalid provider URL {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Read the body of a failed provider response for error reporting.
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    if text.is_empty() {
        status.to_string()
    } else {
        format!("{} {}", status, text)
    }
}

/// Guess a MIME type from the extension of a URL path.
pub(crate) fn content_type_for(url: &str, fallback: &'static str) -> &'static str {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let extension = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.contains('/'));

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("ogg") => "audio/ogg",
        _ => fallback,
    }
}
