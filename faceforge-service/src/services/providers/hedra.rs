//! Hedra talking-head video provider.
//!
//! A generation needs two uploaded assets (start keyframe and audio). The
//! provider downloads both from the caller's URLs, registers them with Hedra,
//! then starts the generation and returns its id.

use super::{content_type_for, download, endpoint, error_body, ProviderError, VideoProvider};
use crate::config::HedraConfig;
use crate::models::{GenerationState, GenerationStatus, VideoGenerationParams};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode, Url};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use service_core::observability::TracedRequestExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetKind {
    Image,
    Audio,
}

impl AssetKind {
    fn as_str(self) -> &'static str {
        match self {
            AssetKind::Image => "image",
            AssetKind::Audio => "audio",
        }
    }

    fn file_name(self) -> &'static str {
        match self {
            AssetKind::Image => "input_image.jpg",
            AssetKind::Audio => "input_audio.mp3",
        }
    }

    fn default_mime(self) -> &'static str {
        match self {
            AssetKind::Image => "image/jpeg",
            AssetKind::Audio => "audio/mpeg",
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateAssetRequest<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreatedResource {
    id: String,
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    ai_model_id: &'a str,
    start_keyframe_id: &'a str,
    audio_id: &'a str,
    generated_video_inputs: GeneratedVideoInputs<'a>,
}

#[derive(Debug, Serialize)]
struct GeneratedVideoInputs<'a> {
    text_prompt: &'a str,
    resolution: &'a str,
    aspect_ratio: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u64>,
    seed: i64,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    error_message: Option<String>,
}

impl From<StatusResponse> for GenerationStatus {
    fn from(body: StatusResponse) -> Self {
        GenerationStatus {
            state: GenerationState::parse(&body.status),
            url: body.url,
            kind: body.kind,
            created_at: body.created_at,
            updated_at: body.updated_at,
            progress: body.progress,
            error_message: body.error_message,
        }
    }
}

fn generation_request<'a>(
    model_id: &'a str,
    image_id: &'a str,
    audio_id: &'a str,
    params: &'a VideoGenerationParams,
) -> GenerationRequest<'a> {
    GenerationRequest {
        kind: "video",
        ai_model_id: model_id,
        start_keyframe_id: image_id,
        audio_id,
        generated_video_inputs: GeneratedVideoInputs {
            text_prompt: &params.text_prompt,
            resolution: &params.resolution,
            aspect_ratio: &params.aspect_ratio,
            duration_ms: params
                .duration
                .map(|seconds| (seconds * 1000.0).round() as u64),
            seed: params.seed,
        },
    }
}

pub struct HedraProvider {
    config: HedraConfig,
    client: Client,
}

impl HedraProvider {
    pub fn new(config: HedraConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn url(&self, segments: &[&str]) -> Result<Url, ProviderError> {
        endpoint(&self.config.base_url, segments)
    }

    fn api_key(&self) -> &str {
        self.config.api_key.expose_secret()
    }

    /// Register an asset, upload the bytes behind `source_url`, return its id.
    async fn upload_asset(&self, kind: AssetKind, source_url: &str) -> Result<String, ProviderError> {
        let bytes = download(&self.client, source_url).await?;

        let response = self
            .client
            .post(self.url(&["assets"])?)
            .header("x-api-key", self.api_key())
            .json(&CreateAssetRequest {
                name: kind.file_name(),
                kind: kind.as_str(),
            })
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to create {} asset: {}",
                kind.as_str(),
                error_body(response).await
            )));
        }
        let asset: CreatedResource = response.json().await?;

        let part = Part::bytes(bytes)
            .file_name(kind.file_name())
            .mime_str(content_type_for(source_url, kind.default_mime()))
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let response = self
            .client
            .post(self.url(&["assets", asset.id.as_str(), "upload"])?)
            .header("x-api-key", self.api_key())
            .multipart(Form::new().part("file", part))
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to upload {}: {}",
                kind.as_str(),
                error_body(response).await
            )));
        }

        tracing::info!(asset_id = %asset.id, kind = kind.as_str(), "Uploaded Hedra asset");
        Ok(asset.id)
    }
}

#[async_trait]
impl VideoProvider for HedraProvider {
    async fn submit(&self, params: &VideoGenerationParams) -> Result<String, ProviderError> {
        let image_id = self.upload_asset(AssetKind::Image, &params.image_url).await?;
        let audio_id = self.upload_asset(AssetKind::Audio, &params.audio_url).await?;

        let request = generation_request(&self.config.model_id, &image_id, &audio_id, params);

        let response = self
            .client
            .post(self.url(&["generations"])?)
            .header("x-api-key", self.api_key())
            .json(&request)
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to start video generation: {}",
                error_body(response).await
            )));
        }

        let generation: CreatedResource = response.json().await?;
        tracing::info!(generation_id = %generation.id, "Started Hedra generation");

        Ok(generation.id)
    }

    async fn status(&self, generation_id: &str) -> Result<GenerationStatus, ProviderError> {
        let response = self
            .client
            .get(self.url(&["generations", generation_id, "status"])?)
            .header("x-api-key", self.api_key())
            .traced()
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(ProviderError::NotFound(format!(
                    "Job {} not found",
                    generation_id
                )));
            }
            StatusCode::UNPROCESSABLE_ENTITY => {
                return Err(ProviderError::ApiError(format!(
                    "Invalid job ID: {}",
                    generation_id
                )));
            }
            status if !status.is_success() => {
                return Err(ProviderError::ApiError(format!(
                    "Failed to fetch generation status: {}",
                    error_body(response).await
                )));
            }
            _ => {}
        }

        let body: StatusResponse = response.json().await?;
        tracing::debug!(generation_id, status = %body.status, "Hedra generation status");

        Ok(body.into())
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.api_key().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Hedra API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}
