//! Validated request types.
//!
//! Raw payloads are turned into these by `services::validator`; everything
//! downstream of validation works on these types only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_ASPECT_RATIO: &str = "16:9";
pub const DEFAULT_RESOLUTION: &str = "720p";
pub const DEFAULT_SEED: i64 = 42;

/// The three supported `process_type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    AvatarTheme,
    ImageEdit,
    VideoGeneration,
}

impl ProcessType {
    pub fn as_str(self) -> &'static str {
        match self {
            ProcessType::AvatarTheme => "avatar_theme",
            ProcessType::ImageEdit => "image_edit",
            ProcessType::VideoGeneration => "video_generation",
        }
    }
}

impl FromStr for ProcessType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avatar_theme" => Ok(ProcessType::AvatarTheme),
            "image_edit" => Ok(ProcessType::ImageEdit),
            "video_generation" => Ok(ProcessType::VideoGeneration),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProcessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Avatar theme styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    RealisticPortrait,
    Anime,
    Cyberpunk,
    Toy,
    Ghibli,
    Emoji,
}

impl Theme {
    pub const ALL: [Theme; 6] = [
        Theme::RealisticPortrait,
        Theme::Anime,
        Theme::Cyberpunk,
        Theme::Toy,
        Theme::Ghibli,
        Theme::Emoji,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::RealisticPortrait => "realistic portrait",
            Theme::Anime => "anime",
            Theme::Cyberpunk => "cyberpunk",
            Theme::Toy => "toy",
            Theme::Ghibli => "ghibli",
            Theme::Emoji => "emoji",
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == wanted)
            .ok_or(())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Region of a portrait that an edit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSection {
    Hair,
    Background,
    Clothes,
}

impl EditSection {
    pub const ALL: [EditSection; 3] = [
        EditSection::Hair,
        EditSection::Background,
        EditSection::Clothes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditSection::Hair => "hair",
            EditSection::Background => "background",
            EditSection::Clothes => "clothes",
        }
    }
}

impl FromStr for EditSection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_lowercase();
        EditSection::ALL
            .into_iter()
            .find(|section| section.as_str() == wanted)
            .ok_or(())
    }
}

impl fmt::Display for EditSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarThemeParams {
    pub image_url: String,
    pub theme: Theme,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageEditParams {
    pub image_url: String,
    pub section: EditSection,
    pub prompt: String,
    /// Pre-computed mask; when absent one is generated for `section`.
    pub mask_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaskParams {
    pub image_url: String,
    pub section: EditSection,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoGenerationParams {
    pub image_url: String,
    pub audio_url: String,
    pub text_prompt: String,
    pub aspect_ratio: String,
    pub resolution: String,
    /// Requested length in seconds.
    pub duration: Option<f64>,
    pub seed: i64,
}

/// One validated operation, keyed by its `process_type`.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AvatarTheme(AvatarThemeParams),
    ImageEdit(ImageEditParams),
    VideoGeneration(VideoGenerationParams),
}

impl Operation {
    pub fn process_type(&self) -> ProcessType {
        match self {
            Operation::AvatarTheme(_) => ProcessType::AvatarTheme,
            Operation::ImageEdit(_) => ProcessType::ImageEdit,
            Operation::VideoGeneration(_) => ProcessType::VideoGeneration,
        }
    }
}

/// A validated request: the caller's credential plus the operation.
#[derive(Clone, PartialEq)]
pub struct ProcessRequest {
    pub api_key: String,
    pub operation: Operation,
}

impl fmt::Debug for ProcessRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRequest")
            .field("api_key", &"[REDACTED]")
            .field("operation", &self.operation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_parsing_ignores_case() {
        assert_eq!("Anime".parse::<Theme>(), Ok(Theme::Anime));
        assert_eq!(
            "REALISTIC PORTRAIT".parse::<Theme>(),
            Ok(Theme::RealisticPortrait)
        );
        assert!("realistic_portrait".parse::<Theme>().is_err());
    }

    #[test]
    fn section_parsing_ignores_case() {
        assert_eq!("Hair".parse::<EditSection>(), Ok(EditSection::Hair));
        assert!("face".parse::<EditSection>().is_err());
    }

    #[test]
    fn process_type_is_exact() {
        assert_eq!(
            "video_generation".parse::<ProcessType>(),
            Ok(ProcessType::VideoGeneration)
        );
        assert!("Video_Generation".parse::<ProcessType>().is_err());
    }

    #[test]
    fn debug_output_redacts_credential() {
        let request = ProcessRequest {
            api_key: "secret-key".to_string(),
            operation: Operation::AvatarTheme(AvatarThemeParams {
                image_url: "https://x/y.jpg".to_string(),
                theme: Theme::Toy,
            }),
        };
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("Toy"));
    }
}
