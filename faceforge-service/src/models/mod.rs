pub mod envelope;
pub mod output;
pub mod request;

pub use envelope::{Envelope, EnvelopeStatus};
pub use output::{
    EditedImage, GeneratedMask, GeneratedVideo, GenerationState, GenerationStatus, JobStatus,
    ThemedImage, VideoJob,
};
pub use request::{
    AvatarThemeParams, EditSection, ImageEditParams, MaskParams, Operation, ProcessRequest,
    ProcessType, Theme, VideoGenerationParams,
};
