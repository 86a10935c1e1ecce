//! Mock provider implementations for testing and for running without
//! provider credentials.

use super::{AvatarProvider, ImageEditProvider, ProviderError, VideoProvider};
use crate::models::{
    AvatarThemeParams, EditSection, EditedImage, GenerationState, GenerationStatus,
    ImageEditParams, ThemedImage, VideoGenerationParams,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

const MOCK_MEDIA_HOST: &str = "https://mock.faceforge.local";

fn not_enabled(kind: &str) -> ProviderError {
    ProviderError::NotConfigured(format!("Mock {} provider not enabled", kind))
}

/// Mock avatar provider for testing.
pub struct MockAvatarProvider {
    enabled: bool,
    calls: AtomicUsize,
}

impl MockAvatarProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of theme requests that reached this provider.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AvatarProvider for MockAvatarProvider {
    async fn apply_theme(&self, params: &AvatarThemeParams) -> Result<ThemedImage, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(not_enabled("avatar"));
        }

        Ok(ThemedImage {
            image_url: format!(
                "{}/themes/{}.jpg",
                MOCK_MEDIA_HOST,
                params.theme.as_str().replace(' ', "_")
            ),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(not_enabled("avatar"))
        }
    }
}

/// Mock mask/inpainting provider for testing.
pub struct MockImageEditProvider {
    enabled: bool,
    mask_calls: AtomicUsize,
    edit_calls: AtomicUsize,
}

impl MockImageEditProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            mask_calls: AtomicUsize::new(0),
            edit_calls: AtomicUsize::new(0),
        }
    }

    pub fn mask_calls(&self) -> usize {
        self.mask_calls.load(Ordering::SeqCst)
    }

    pub fn edit_calls(&self) -> usize {
        self.edit_calls.load(Ordering::SeqCst)
    }

    /// Total provider interactions of either kind.
    pub fn calls(&self) -> usize {
        self.mask_calls() + self.edit_calls()
    }
}

#[async_trait]
impl ImageEditProvider for MockImageEditProvider {
    async fn create_mask(
        &self,
        _image_url: &str,
        section: EditSection,
    ) -> Result<String, ProviderError> {
        self.mask_calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(not_enabled("image edit"));
        }

        Ok(format!("{}/masks/mask_{}.png", MOCK_MEDIA_HOST, section.as_str()))
    }

    async fn edit(&self, params: &ImageEditParams) -> Result<EditedImage, ProviderError> {
        let mask_url = match &params.mask_url {
            Some(url) => url.clone(),
            None => self.create_mask(&params.image_url, params.section).await?,
        };

        self.edit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(not_enabled("image edit"));
        }

        Ok(EditedImage {
            image_url: format!("{}/edits/edited_{}.jpg", MOCK_MEDIA_HOST, params.section.as_str()),
            mask_url,
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(not_enabled("image edit"))
        }
    }
}

/// Mock video provider.
///
/// Each submitted generation reports `processing` for a fixed number of
/// status polls and then `complete`. Generations whose prompt contains
/// `"fail"` end in `error` instead.
pub struct MockVideoProvider {
    enabled: bool,
    polls_until_complete: usize,
    submit_calls: AtomicUsize,
    jobs: Mutex<HashMap<String, MockJob>>,
}

struct MockJob {
    polls: usize,
    fails: bool,
}

impl MockVideoProvider {
    pub fn new(enabled: bool) -> Self {
        Self::with_polls(enabled, 1)
    }

    pub fn with_polls(enabled: bool, polls_until_complete: usize) -> Self {
        Self {
            enabled,
            polls_until_complete,
            submit_calls: AtomicUsize::new(0),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Submitted jobs that have not yet reported a final state.
    pub fn pending_jobs(&self) -> usize {
        self.jobs.lock().map(|jobs| jobs.len()).unwrap_or_default()
    }
}

#[async_trait]
impl VideoProvider for MockVideoProvider {
    async fn submit(&self, params: &VideoGenerationParams) -> Result<String, ProviderError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if !self.enabled {
            return Err(not_enabled("video"));
        }

        let id = Uuid::new_v4().to_string();
        let job = MockJob {
            polls: 0,
            fails: params.text_prompt.contains("fail"),
        };
        self.jobs
            .lock()
            .map_err(|_| ProviderError::ApiError("Mock job table poisoned".to_string()))?
            .insert(id.clone(), job);

        Ok(id)
    }

    async fn status(&self, generation_id: &str) -> Result<GenerationStatus, ProviderError> {
        if !self.enabled {
            return Err(not_enabled("video"));
        }

        let mut jobs = self
            .jobs
            .lock()
            .map_err(|_| ProviderError::ApiError("Mock job table poisoned".to_string()))?;
        let job = jobs
            .get_mut(generation_id)
            .ok_or_else(|| ProviderError::NotFound(format!("Job {} not found", generation_id)))?;

        job.polls += 1;
        let created_at = Some("2026-01-01T00:00:00Z".to_string());

        if job.polls <= self.polls_until_complete {
            let progress = job.polls as f64 / (self.polls_until_complete + 1) as f64;
            return Ok(GenerationStatus {
                state: GenerationState::Processing,
                url: None,
                kind: Some("video".to_string()),
                created_at,
                updated_at: Some("2026-01-01T00:00:05Z".to_string()),
                progress: Some(progress),
                error_message: None,
            });
        }

        // A finished job is reported once, then forgotten.
        let fails = job.fails;
        jobs.remove(generation_id);

        let status = if fails {
            GenerationStatus {
                state: GenerationState::Error,
                url: None,
                kind: Some("video".to_string()),
                created_at,
                updated_at: Some("2026-01-01T00:00:10Z".to_string()),
                progress: None,
                error_message: Some("Mock generation failed".to_string()),
            }
        } else {
            GenerationStatus {
                state: GenerationState::Complete,
                url: Some(format!("{}/videos/{}.mp4", MOCK_MEDIA_HOST, generation_id)),
                kind: Some("video".to_string()),
                created_at,
                updated_at: Some("2026-01-01T00:00:10Z".to_string()),
                progress: Some(1.0),
                error_message: None,
            }
        };

        Ok(status)
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(not_enabled("video"))
        }
    }
}
