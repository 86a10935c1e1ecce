//! OpenAPI document served with Swagger UI at `{prefix}/docs`.
//!
//! Handlers take raw JSON so validation can report the first problem in a
//! fixed order; the body types below only describe the accepted shapes.

use crate::handlers;
use crate::models::{
    EditedImage, Envelope, EnvelopeStatus, GeneratedMask, GeneratedVideo, JobStatus, ThemedImage,
    VideoJob,
};
use serde::Serialize;
use utoipa::openapi::OpenApi as OpenApiDocument;
use utoipa::{OpenApi, ToSchema};

/// Failure body of the REST routes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorDetail {
    #[schema(example = "theme is required")]
    pub detail: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvatarThemeBody {
    pub api_key: String,
    #[schema(example = "https://example.com/face.jpg")]
    pub image_url: String,
    /// One of `realistic portrait`, `anime`, `cyberpunk`, `toy`, `ghibli`, `emoji`.
    #[schema(example = "anime")]
    pub theme: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImageEditBody {
    pub api_key: String,
    pub image_url: String,
    /// One of `hair`, `background`, `clothes`.
    #[schema(example = "hair")]
    pub section: String,
    #[schema(example = "curly red hair")]
    pub prompt: String,
    /// Reuse a mask from `/image-edit/mask` instead of generating one.
    pub mask_url: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaskBody {
    pub api_key: String,
    pub image_url: String,
    #[schema(example = "background")]
    pub section: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VideoGenerationBody {
    pub api_key: String,
    pub image_url: String,
    pub audio_url: String,
    #[schema(example = "A person talking to the camera")]
    pub text_prompt: String,
    #[schema(example = "16:9")]
    pub aspect_ratio: Option<String>,
    #[schema(example = "720p")]
    pub resolution: Option<String>,
    /// Seconds.
    pub duration: Option<f64>,
    #[schema(example = 42)]
    pub seed: Option<i64>,
}

/// Handler form: the payload of any process type, wrapped in `input`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RunJobBody {
    /// Carries `process_type` plus that operation's fields.
    #[schema(value_type = Object)]
    pub input: serde_json::Value,
}

/// Routes mounted under the API prefix.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::avatar::avatar_theme,
        handlers::image::image_edit,
        handlers::image::create_mask,
        handlers::video::generate_video,
        handlers::video::submit_video,
        handlers::video::video_status,
        handlers::job::run_job,
    ),
    components(schemas(
        AvatarThemeBody,
        ImageEditBody,
        MaskBody,
        VideoGenerationBody,
        RunJobBody,
        ErrorDetail,
        Envelope,
        EnvelopeStatus,
        ThemedImage,
        EditedImage,
        GeneratedMask,
        GeneratedVideo,
        VideoJob,
        JobStatus,
    )),
    tags(
        (name = "Processing", description = "Avatar theming, image editing and video generation")
    )
)]
struct ProcessingApi;

/// Routes mounted at the root.
#[derive(OpenApi)]
#[openapi(
    info(title = "FaceForge AI API"),
    paths(
        handlers::health::root,
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::health::metrics_endpoint,
    ),
    tags((name = "Service", description = "Liveness, readiness and metrics"))
)]
struct ServiceApi;

/// Full document with processing paths placed under `prefix`.
pub fn openapi(prefix: &str) -> OpenApiDocument {
    let mut processing = ProcessingApi::openapi();
    processing.paths.paths = std::mem::take(&mut processing.paths.paths)
        .into_iter()
        .map(|(path, item)| (format!("{}{}", prefix, path), item))
        .collect();

    let mut document = ServiceApi::openapi();
    document.merge(processing);
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_paths_follow_the_prefix() {
        let document = openapi("/api/v1");
        let paths = &document.paths.paths;

        assert!(paths.contains_key("/"));
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/avatar-theme"));
        assert!(paths.contains_key("/api/v1/video-generation/status/{job_id}"));
        assert!(!paths.contains_key("/avatar-theme"));
    }

    #[test]
    fn empty_prefix_mounts_at_root() {
        let document = openapi("");
        assert!(document.paths.paths.contains_key("/run"));
    }
}
