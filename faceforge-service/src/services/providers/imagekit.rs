//! ImageKit media upload.
//!
//! Segmind returns raw image bytes; callers need URLs, so generated masks and
//! edited images are pushed to ImageKit first.

use super::{error_body, ProviderError};
use crate::config::ImageKitConfig;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Deserialize;
use service_core::observability::TracedRequestExt;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct UploadResponse {
    url: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub struct ImageKitUploader {
    config: ImageKitConfig,
    client: Client,
}

impl ImageKitUploader {
    pub fn new(config: ImageKitConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.private_key.expose_secret().is_empty()
    }

    /// Upload `bytes` and return the public URL.
    pub async fn upload(
        &self,
        bytes: Vec<u8>,
        prefix: &str,
        extension: &str,
        mime: &str,
        tag: &str,
    ) -> Result<String, ProviderError> {
        let file_name = unique_file_name(prefix, extension);

        let part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str(mime)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("fileName", file_name.clone())
            .text("tags", tag.to_string());

        let response = self
            .client
            .post(&self.config.upload_url)
            .basic_auth(self.config.private_key.expose_secret(), Some(""))
            .multipart(form)
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Failed to upload to ImageKit: {}",
                error_body(response).await
            )));
        }

        let body: UploadResponse = response.json().await?;
        let url = body.url.ok_or_else(|| {
            ProviderError::InvalidResponse(
                body.message
                    .unwrap_or_else(|| "ImageKit returned no url".to_string()),
            )
        })?;

        tracing::debug!(file_name = %file_name, "Uploaded media to ImageKit");
        Ok(url)
    }
}

fn unique_file_name(prefix: &str, extension: &str) -> String {
    format!("{}_{}.{}", prefix, Uuid::new_v4().simple(), extension)
}
