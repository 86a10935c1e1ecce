//! DeepAI image editor provider for avatar theming.

use super::{error_body, AvatarProvider, ProviderError};
use crate::config::DeepAiConfig;
use crate::models::{AvatarThemeParams, Theme, ThemedImage};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::observability::TracedRequestExt;

#[derive(Debug, Deserialize)]
struct ImageEditorResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    output_url: Option<String>,
    #[serde(default)]
    err: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

pub struct DeepAiProvider {
    config: DeepAiConfig,
    client: Client,
}

impl DeepAiProvider {
    pub fn new(config: DeepAiConfig, client: Client) -> Self {
        Self { config, client }
    }

    fn api_url(&self) -> String {
        format!(
            "{}/api/image-editor",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Editing instruction sent alongside the image.
fn theme_instruction(theme: Theme) -> String {
    format!("change to {}", theme.as_str())
}

fn into_themed_image(body: ImageEditorResponse) -> Result<ThemedImage, ProviderError> {
    match body.output_url {
        Some(image_url) if !image_url.is_empty() => Ok(ThemedImage { image_url }),
        _ => Err(ProviderError::GenerationFailed(
            body.err
                .or(body.status)
                .unwrap_or_else(|| "Theme generation returned no image".to_string()),
        )),
    }
}

#[async_trait]
impl AvatarProvider for DeepAiProvider {
    async fn apply_theme(&self, params: &AvatarThemeParams) -> Result<ThemedImage, ProviderError> {
        let instruction = theme_instruction(params.theme);

        tracing::debug!(theme = %params.theme, "Sending request to DeepAI image editor");

        let response = self
            .client
            .post(self.api_url())
            .header("api-key", self.config.api_key.expose_secret())
            .form(&[
                ("image", params.image_url.as_str()),
                ("text", instruction.as_str()),
            ])
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "DeepAI API error {}",
                error_body(response).await
            )));
        }

        let body: ImageEditorResponse = response.json().await?;
        tracing::info!(job_id = ?body.id, "DeepAI theme generation finished");

        into_themed_image(body)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "DeepAI API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}
