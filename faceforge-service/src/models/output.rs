//! Provider results, reshaped into the field names returned to callers.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ThemedImage {
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct EditedImage {
    pub image_url: String,
    pub mask_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GeneratedMask {
    pub mask_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GeneratedVideo {
    pub status: String,
    pub video_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created_at: String,
}

/// Lifecycle state reported by the video provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationState {
    Queued,
    Processing,
    Complete,
    Error,
    Other(String),
}

impl GenerationState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => GenerationState::Queued,
            "processing" => GenerationState::Processing,
            "complete" => GenerationState::Complete,
            "error" => GenerationState::Error,
            other => GenerationState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            GenerationState::Queued => "queued",
            GenerationState::Processing => "processing",
            GenerationState::Complete => "complete",
            GenerationState::Error => "error",
            GenerationState::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GenerationState::Complete | GenerationState::Error)
    }
}

/// Snapshot of a provider-side video generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationStatus {
    pub state: GenerationState,
    pub url: Option<String>,
    pub kind: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    /// Fraction complete in `0.0..=1.0`, when the provider reports it.
    pub progress: Option<f64>,
    pub error_message: Option<String>,
}

/// Job status exposed by the asynchronous video endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl From<&GenerationState> for JobStatus {
    fn from(state: &GenerationState) -> Self {
        match state {
            GenerationState::Queued => JobStatus::Queued,
            GenerationState::Processing => JobStatus::Processing,
            GenerationState::Complete => JobStatus::Completed,
            GenerationState::Error => JobStatus::Failed,
            // Providers add intermediate states over time.
            GenerationState::Other(_) => JobStatus::Processing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct VideoJob {
    pub job_id: String,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VideoJob {
    pub fn queued(job_id: String) -> Self {
        Self {
            job_id,
            status: JobStatus::Queued,
            video_url: None,
            progress: None,
            created_at: None,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    pub fn from_status(job_id: String, status: GenerationStatus) -> Self {
        let job_status = JobStatus::from(&status.state);
        let error = (job_status == JobStatus::Failed).then(|| {
            status
                .error_message
                .clone()
                .unwrap_or_else(|| "Unknown error".to_string())
        });

        // Last transition time, falling back to creation.
        let changed_at = status.updated_at.or_else(|| status.created_at.clone());
        let (started_at, completed_at) = match job_status {
            JobStatus::Processing => (changed_at, None),
            JobStatus::Completed | JobStatus::Failed => (None, changed_at),
            JobStatus::Queued => (None, None),
        };

        Self {
            job_id,
            status: job_status,
            video_url: status.url.filter(|_| job_status == JobStatus::Completed),
            progress: status.progress,
            created_at: status.created_at,
            started_at,
            completed_at,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(state: GenerationState) -> GenerationStatus {
        GenerationStatus {
            state,
            url: Some("https://cdn.hedra/v.mp4".to_string()),
            kind: Some("video".to_string()),
            created_at: Some("2026-01-01T00:00:00Z".to_string()),
            updated_at: Some("2026-01-01T00:01:30Z".to_string()),
            progress: Some(0.4),
            error_message: Some("face not detected".to_string()),
        }
    }

    #[test]
    fn provider_states_map_to_job_states() {
        assert_eq!(JobStatus::from(&GenerationState::parse("queued")), JobStatus::Queued);
        assert_eq!(
            JobStatus::from(&GenerationState::parse("processing")),
            JobStatus::Processing
        );
        assert_eq!(
            JobStatus::from(&GenerationState::parse("complete")),
            JobStatus::Completed
        );
        assert_eq!(JobStatus::from(&GenerationState::parse("error")), JobStatus::Failed);
        assert_eq!(
            JobStatus::from(&GenerationState::parse("finalizing")),
            JobStatus::Processing
        );
    }

    #[test]
    fn completed_job_carries_url_only() {
        let job = VideoJob::from_status("g1".to_string(), status(GenerationState::Complete));
        assert_eq!(job.video_url.as_deref(), Some("https://cdn.hedra/v.mp4"));
        assert!(job.error.is_none());
    }

    #[test]
    fn failed_job_carries_error_only() {
        let job = VideoJob::from_status("g1".to_string(), status(GenerationState::Error));
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.video_url.is_none());
        assert_eq!(job.error.as_deref(), Some("face not detected"));
    }

    #[test]
    fn processing_job_reports_progress_and_start_time() {
        let job = VideoJob::from_status("g1".to_string(), status(GenerationState::Processing));
        let body = serde_json::to_value(&job).unwrap();

        assert_eq!(body["status"], "processing");
        assert_eq!(body["progress"], 0.4);
        assert_eq!(body["started_at"], "2026-01-01T00:01:30Z");
        assert!(body.get("completed_at").is_none());
        assert!(body.get("video_url").is_none());
    }

    #[test]
    fn finished_job_reports_completion_time() {
        let mut finished = status(GenerationState::Complete);
        finished.updated_at = None;

        let job = VideoJob::from_status("g1".to_string(), finished);

        assert_eq!(job.completed_at.as_deref(), Some("2026-01-01T00:00:00Z"));
        assert!(job.started_at.is_none());
    }

    #[test]
    fn queued_job_has_no_timestamps_to_report() {
        let body = serde_json::to_value(VideoJob::queued("g1".to_string())).unwrap();
        assert_eq!(body, serde_json::json!({"job_id": "g1", "status": "queued"}));
    }

    #[test]
    fn video_type_field_is_renamed() {
        let video = GeneratedVideo {
            status: "complete".to_string(),
            video_url: "https://cdn/v.mp4".to_string(),
            kind: "video".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let body = serde_json::to_value(video).unwrap();
        assert_eq!(body["type"], "video");
        assert!(body.get("kind").is_none());
    }
}
