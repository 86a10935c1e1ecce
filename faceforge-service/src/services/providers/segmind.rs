//! Segmind provider: automatic mask generation and Flux fill inpainting.

use super::imagekit::ImageKitUploader;
use super::imaging::{decode, encode_jpeg, encode_png, fit_mask, upscale};
use super::{download, error_body, ImageEditProvider, ProviderError};
use crate::config::SegmindConfig;
use crate::models::{EditSection, EditedImage, ImageEditParams};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use service_core::observability::TracedRequestExt;

const MASK_SEED: u64 = 468_685;
const FILL_SEED: u64 = 965_222;

#[derive(Debug, Serialize)]
struct MaskRequest<'a> {
    prompt: &'a str,
    image: String,
    threshold: f32,
    invert_mask: bool,
    return_mask: bool,
    return_alpha: bool,
    grow_mask: u32,
    seed: u64,
    base64: bool,
}

impl<'a> MaskRequest<'a> {
    fn new(section: &'a str, image_base64: String) -> Self {
        Self {
            prompt: section,
            image: image_base64,
            threshold: 0.2,
            invert_mask: false,
            return_mask: true,
            return_alpha: false,
            grow_mask: 10,
            seed: MASK_SEED,
            base64: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct FillRequest<'a> {
    mask: &'a str,
    image: &'a str,
    seed: u64,
    steps: u32,
    prompt: &'a str,
    guidance: u32,
    output_format: &'static str,
    safety_tolerance: u32,
    prompt_upsampling: bool,
}

impl<'a> FillRequest<'a> {
    fn new(image: &'a str, mask: &'a str, prompt: &'a str) -> Self {
        Self {
            mask,
            image,
            seed: FILL_SEED,
            steps: 50,
            prompt,
            guidance: 3,
            output_format: "jpg",
            safety_tolerance: 2,
            prompt_upsampling: false,
        }
    }
}

pub struct SegmindProvider {
    config: SegmindConfig,
    client: Client,
    uploader: ImageKitUploader,
}

impl SegmindProvider {
    pub fn new(config: SegmindConfig, client: Client, uploader: ImageKitUploader) -> Self {
        Self {
            config,
            client,
            uploader,
        }
    }

    fn api_url(&self, model: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), model)
    }

    /// POST a JSON body to a Segmind model and return the raw output bytes.
    async fn run_model<T: Serialize + Sync>(
        &self,
        model: &str,
        body: &T,
    ) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .post(self.api_url(model))
            .header("x-api-key", self.config.api_key.expose_secret())
            .json(body)
            .traced()
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::ApiError(format!(
                "Segmind {} error {}",
                model,
                error_body(response).await
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Make the image and mask acceptable to the fill model, uploading
    /// resized copies when needed. Returns the URLs to send.
    async fn prepare_inputs(
        &self,
        image_url: &str,
        mask_url: &str,
    ) -> Result<(String, String), ProviderError> {
        let image = decode(&download(&self.client, image_url).await?, "image")?;
        let (image, image_url) = match upscale(&image) {
            Some(resized) => {
                tracing::debug!(
                    from = ?(image.width(), image.height()),
                    to = ?(resized.width(), resized.height()),
                    "Upscaling undersized image"
                );
                let url = self
                    .uploader
                    .upload(encode_jpeg(&resized)?, "resized", "jpg", "image/jpeg", "resized_image")
                    .await?;
                (resized, url)
            }
            None => (image, image_url.to_string()),
        };

        let mask = decode(&download(&self.client, mask_url).await?, "mask")?;
        let mask_url = match fit_mask(&mask, &image) {
            Some(fitted) => {
                tracing::debug!(
                    from = ?(mask.width(), mask.height()),
                    to = ?(fitted.width(), fitted.height()),
                    "Resizing mask to image size"
                );
                self.uploader
                    .upload(encode_png(&fitted)?, "mask_resized", "png", "image/png", "masked_image")
                    .await?
            }
            None => mask_url.to_string(),
        };

        Ok((image_url, mask_url))
    }
}

#[async_trait]
impl ImageEditProvider for SegmindProvider {
    async fn create_mask(
        &self,
        image_url: &str,
        section: EditSection,
    ) -> Result<String, ProviderError> {
        let image = download(&self.client, image_url).await?;
        let request = MaskRequest::new(section.as_str(), STANDARD.encode(&image));

        tracing::debug!(section = %section, "Generating mask");

        let mask = self
            .run_model("automatic-mask-generator", &request)
            .await?;
        if mask.is_empty() {
            return Err(ProviderError::GenerationFailed(
                "Failed to generate mask".to_string(),
            ));
        }

        self.uploader
            .upload(
                mask,
                &format!("mask_{}", section.as_str()),
                "png",
                "image/png",
                "masked_image",
            )
            .await
    }

    async fn edit(&self, params: &ImageEditParams) -> Result<EditedImage, ProviderError> {
        let mask_url = match &params.mask_url {
            Some(url) => url.clone(),
            None => self.create_mask(&params.image_url, params.section).await?,
        };

        let (fill_image_url, fill_mask_url) =
            self.prepare_inputs(&params.image_url, &mask_url).await?;

        let request = FillRequest::new(&fill_image_url, &fill_mask_url, &params.prompt);
        let edited = self.run_model("flux-fill-pro", &request).await?;
        if edited.is_empty() {
            return Err(ProviderError::GenerationFailed(
                "Failed to edit image: empty response".to_string(),
            ));
        }

        let image_url = self
            .uploader
            .upload(edited, "edited", "jpg", "image/jpeg", "edited_image")
            .await?;

        tracing::info!(section = %params.section, "Image edit finished");

        Ok(EditedImage {
            image_url,
            mask_url,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.config.api_key.expose_secret().is_empty() {
            return Err(ProviderError::NotConfigured(
                "Segmind API key not configured".to_string(),
            ));
        }
        if !self.uploader.is_configured() {
            return Err(ProviderError::NotConfigured(
                "ImageKit private key not configured".to_string(),
            ));
        }
        Ok(())
    }
}
