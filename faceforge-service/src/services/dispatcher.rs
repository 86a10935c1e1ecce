//! Routes validated operations to the provider that handles them.

use super::metrics::record_dispatch;
use super::providers::{AvatarProvider, ImageEditProvider, ProviderError, VideoProvider};
use crate::models::{
    GeneratedMask, GeneratedVideo, GenerationState, MaskParams, Operation, ProcessType,
    VideoGenerationParams, VideoJob,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// How long a synchronous video request waits for its generation.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
}

#[derive(Clone)]
pub struct Dispatcher {
    avatar: Arc<dyn AvatarProvider>,
    editor: Arc<dyn ImageEditProvider>,
    video: Arc<dyn VideoProvider>,
    poll: PollSettings,
}

impl Dispatcher {
    pub fn new(
        avatar: Arc<dyn AvatarProvider>,
        editor: Arc<dyn ImageEditProvider>,
        video: Arc<dyn VideoProvider>,
        poll: PollSettings,
    ) -> Self {
        Self {
            avatar,
            editor,
            video,
            poll,
        }
    }

    /// Run one operation against its provider and return the result payload.
    #[tracing::instrument(skip(self, operation), fields(process_type = %operation.process_type()))]
    pub async fn dispatch(&self, operation: &Operation) -> Result<Value, ProviderError> {
        let started = Instant::now();

        let result = match operation {
            Operation::AvatarTheme(params) => self
                .avatar
                .apply_theme(params)
                .await
                .and_then(|image| to_value(&image)),
            Operation::ImageEdit(params) => self
                .editor
                .edit(params)
                .await
                .and_then(|image| to_value(&image)),
            Operation::VideoGeneration(params) => self
                .generate_video(params)
                .await
                .and_then(|video| to_value(&video)),
        };

        observe(operation.process_type().as_str(), &result, started);
        result
    }

    /// Generate only the mask for an image section.
    pub async fn create_mask(&self, params: &MaskParams) -> Result<GeneratedMask, ProviderError> {
        let started = Instant::now();
        let result = self
            .editor
            .create_mask(&params.image_url, params.section)
            .await
            .map(|mask_url| GeneratedMask { mask_url });

        observe("mask", &result, started);
        result
    }

    /// Start a video generation without waiting for it.
    pub async fn submit_video(
        &self,
        params: &VideoGenerationParams,
    ) -> Result<VideoJob, ProviderError> {
        let started = Instant::now();
        let result = self.video.submit(params).await.map(VideoJob::queued);

        observe("video_submit", &result, started);
        result
    }

    pub async fn video_status(&self, job_id: &str) -> Result<VideoJob, ProviderError> {
        let status = self.video.status(job_id).await?;
        Ok(VideoJob::from_status(job_id.to_string(), status))
    }

    /// Submit a generation and poll until it completes, fails, or the
    /// attempt budget runs out.
    async fn generate_video(
        &self,
        params: &VideoGenerationParams,
    ) -> Result<GeneratedVideo, ProviderError> {
        let generation_id = self.video.submit(params).await?;
        tracing::info!(generation_id = %generation_id, "Video generation submitted");

        for attempt in 1..=self.poll.max_attempts {
            let status = self.video.status(&generation_id).await?;
            tracing::debug!(
                generation_id = %generation_id,
                attempt,
                status = status.state.as_str(),
                "Polled video generation"
            );

            if !status.state.is_terminal() {
                if attempt < self.poll.max_attempts {
                    tokio::time::sleep(self.poll.interval).await;
                }
                continue;
            }

            match status.state {
                GenerationState::Complete => {
                    let video_url = status.url.filter(|url| !url.is_empty()).ok_or_else(|| {
                        ProviderError::GenerationFailed(
                            "Video generation failed: no video URL returned".to_string(),
                        )
                    })?;
                    return Ok(GeneratedVideo {
                        status: GenerationState::Complete.as_str().to_string(),
                        video_url,
                        kind: status.kind.unwrap_or_else(|| "video".to_string()),
                        created_at: status.created_at.unwrap_or_default(),
                    });
                }
                _ => {
                    return Err(ProviderError::GenerationFailed(format!(
                        "Video generation failed: {}",
                        status
                            .error_message
                            .unwrap_or_else(|| "Unknown error".to_string())
                    )));
                }
            }
        }

        Err(ProviderError::Timeout(format!(
            "Video generation {} did not finish after {} status checks",
            generation_id, self.poll.max_attempts
        )))
    }

    /// Check every provider and collect the ones that are not usable.
    pub async fn health_check(&self) -> Vec<(ProcessType, ProviderError)> {
        let mut failures = Vec::new();

        if let Err(e) = self.avatar.health_check().await {
            failures.push((ProcessType::AvatarTheme, e));
        }
        if let Err(e) = self.editor.health_check().await {
            failures.push((ProcessType::ImageEdit, e));
        }
        if let Err(e) = self.video.health_check().await {
            failures.push((ProcessType::VideoGeneration, e));
        }

        failures
    }
}

fn to_value<T: Serialize>(output: &T) -> Result<Value, ProviderError> {
    serde_json::to_value(output).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn observe<T>(label: &str, result: &Result<T, ProviderError>, started: Instant) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) if e.is_transport() => "unreachable",
        Err(_) => "failure",
    };
    if let Err(e) = result {
        tracing::warn!(operation = label, error = %e, "Provider call failed");
    }
    record_dispatch(label, outcome, started.elapsed());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvatarThemeParams, EditSection, ImageEditParams, JobStatus, Theme};
    use crate::services::providers::mock::{
        MockAvatarProvider, MockImageEditProvider, MockVideoProvider,
    };

    struct Fixture {
        avatar: Arc<MockAvatarProvider>,
        editor: Arc<MockImageEditProvider>,
        video: Arc<MockVideoProvider>,
        dispatcher: Dispatcher,
    }

    fn fixture(polls_until_complete: usize, max_attempts: u32) -> Fixture {
        let avatar = Arc::new(MockAvatarProvider::new(true));
        let editor = Arc::new(MockImageEditProvider::new(true));
        let video = Arc::new(MockVideoProvider::with_polls(true, polls_until_complete));
        let dispatcher = Dispatcher::new(
            avatar.clone(),
            editor.clone(),
            video.clone(),
            PollSettings {
                interval: Duration::ZERO,
                max_attempts,
            },
        );
        Fixture {
            avatar,
            editor,
            video,
            dispatcher,
        }
    }

    fn video_params(prompt: &str) -> VideoGenerationParams {
        VideoGenerationParams {
            image_url: "https://x/face.jpg".to_string(),
            audio_url: "https://x/voice.mp3".to_string(),
            text_prompt: prompt.to_string(),
            aspect_ratio: "16:9".to_string(),
            resolution: "720p".to_string(),
            duration: None,
            seed: 42,
        }
    }

    #[tokio::test]
    async fn avatar_operation_reaches_only_the_avatar_provider() {
        let f = fixture(0, 3);
        let operation = Operation::AvatarTheme(AvatarThemeParams {
            image_url: "https://x/face.jpg".to_string(),
            theme: Theme::Anime,
        });

        let data = f.dispatcher.dispatch(&operation).await.unwrap();

        assert!(data["image_url"].as_str().unwrap().ends_with("anime.jpg"));
        assert_eq!(f.avatar.calls(), 1);
        assert_eq!(f.editor.calls(), 0);
        assert_eq!(f.video.calls(), 0);
    }

    #[tokio::test]
    async fn image_edit_returns_image_and_mask() {
        let f = fixture(0, 3);
        let operation = Operation::ImageEdit(ImageEditParams {
            image_url: "https://x/face.jpg".to_string(),
            section: EditSection::Background,
            prompt: "a beach at sunset".to_string(),
            mask_url: None,
        });

        let data = f.dispatcher.dispatch(&operation).await.unwrap();

        assert!(data["image_url"].is_string());
        assert!(data["mask_url"].as_str().unwrap().contains("mask_background"));
        assert_eq!(f.editor.mask_calls(), 1);
        assert_eq!(f.editor.edit_calls(), 1);
        assert_eq!(f.avatar.calls(), 0);
    }

    #[tokio::test]
    async fn video_generation_polls_until_complete() {
        let f = fixture(2, 5);
        let operation = Operation::VideoGeneration(video_params("hello there"));

        let data = f.dispatcher.dispatch(&operation).await.unwrap();

        assert_eq!(data["status"], "complete");
        assert_eq!(data["type"], "video");
        assert!(data["video_url"].as_str().unwrap().ends_with(".mp4"));
        assert!(data["created_at"].is_string());
    }

    #[tokio::test]
    async fn failed_generation_reports_provider_message() {
        let f = fixture(0, 5);
        let operation = Operation::VideoGeneration(video_params("make it fail"));

        let err = f.dispatcher.dispatch(&operation).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Video generation failed: Mock generation failed"
        );
    }

    #[tokio::test]
    async fn exhausted_poll_budget_times_out() {
        let f = fixture(10, 2);
        let operation = Operation::VideoGeneration(video_params("slow"));

        let err = f.dispatcher.dispatch(&operation).await.unwrap_err();

        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn last_status_check_does_not_wait_another_interval() {
        let video = Arc::new(MockVideoProvider::with_polls(true, 10));
        let dispatcher = Dispatcher::new(
            Arc::new(MockAvatarProvider::new(true)),
            Arc::new(MockImageEditProvider::new(true)),
            video.clone(),
            PollSettings {
                interval: Duration::from_secs(60),
                max_attempts: 1,
            },
        );
        let operation = Operation::VideoGeneration(video_params("slow"));

        let result =
            tokio::time::timeout(Duration::from_secs(5), dispatcher.dispatch(&operation)).await;

        let err = result.expect("gave up without sleeping").unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(_)));
        assert_eq!(video.pending_jobs(), 1);
    }

    #[tokio::test]
    async fn submitted_job_can_be_polled_to_completion() {
        let f = fixture(1, 1);

        let job = f.dispatcher.submit_video(&video_params("hi")).await.unwrap();
        assert_eq!(job.status, JobStatus::Queued);

        let first = f.dispatcher.video_status(&job.job_id).await.unwrap();
        assert_eq!(first.status, JobStatus::Processing);
        assert!(first.video_url.is_none());

        let second = f.dispatcher.video_status(&job.job_id).await.unwrap();
        assert_eq!(second.status, JobStatus::Completed);
        assert!(second.video_url.is_some());
    }

    #[tokio::test]
    async fn disabled_providers_show_up_in_health_check() {
        let dispatcher = Dispatcher::new(
            Arc::new(MockAvatarProvider::new(false)),
            Arc::new(MockImageEditProvider::new(true)),
            Arc::new(MockVideoProvider::new(false)),
            PollSettings {
                interval: Duration::ZERO,
                max_attempts: 1,
            },
        );

        let failures = dispatcher.health_check().await;
        let failed: Vec<_> = failures.iter().map(|(kind, _)| *kind).collect();

        assert_eq!(
            failed,
            vec![ProcessType::AvatarTheme, ProcessType::VideoGeneration]
        );
    }
}
