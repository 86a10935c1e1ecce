//! Request validation.
//!
//! Every function here is a pure function of the payload: it either returns a
//! typed request or the first problem found, in the order callers have
//! always seen them reported (credential, process type, then fields in
//! declaration order).

use crate::error::RequestError;
use crate::models::request::{DEFAULT_ASPECT_RATIO, DEFAULT_RESOLUTION, DEFAULT_SEED};
use crate::models::{
    AvatarThemeParams, EditSection, ImageEditParams, MaskParams, Operation, ProcessRequest,
    ProcessType, Theme, VideoGenerationParams,
};
use serde_json::{Map, Value};
use std::str::FromStr;
use validator::ValidateUrl;

type Object = Map<String, Value>;

/// Return the non-empty `api_key` of a payload.
pub fn require_api_key(payload: &Value) -> Result<&str, RequestError> {
    match payload.get("api_key") {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.as_str()),
        _ => Err(RequestError::MissingCredential),
    }
}

/// Validate a handler-form payload, which names its own `process_type`.
pub fn validate_payload(payload: &Value) -> Result<ProcessRequest, RequestError> {
    let object = as_object(payload)?;
    require_api_key(payload)?;

    let process_type = object
        .get("process_type")
        .and_then(Value::as_str)
        .and_then(|raw| ProcessType::from_str(raw).ok())
        .ok_or(RequestError::UnknownProcessType)?;

    validate_operation(process_type, payload)
}

/// Validate a payload for a process type fixed by the caller (REST routes).
/// Any `process_type` field in the body is ignored.
pub fn validate_operation(
    process_type: ProcessType,
    payload: &Value,
) -> Result<ProcessRequest, RequestError> {
    let object = as_object(payload)?;
    let api_key = require_api_key(payload)?.to_string();

    let operation = match process_type {
        ProcessType::AvatarTheme => Operation::AvatarTheme(avatar_theme(object)?),
        ProcessType::ImageEdit => Operation::ImageEdit(image_edit(object)?),
        ProcessType::VideoGeneration => Operation::VideoGeneration(video_generation(object)?),
    };

    Ok(ProcessRequest { api_key, operation })
}

/// Validate a standalone mask request.
pub fn validate_mask(payload: &Value) -> Result<MaskParams, RequestError> {
    let object = as_object(payload)?;
    require_api_key(payload)?;

    let image_url = required_url(object, "image_url")?;
    let section = required_str(object, "section")?;

    Ok(MaskParams {
        image_url,
        section: parse_section(section)?,
    })
}

/// Longest job id accepted on the status route.
const MAX_JOB_ID_LEN: usize = 128;

/// Accept only opaque provider ids (letters, digits, `-`, `_`), so a job id
/// can never reshape the provider URL it is placed in.
pub fn validate_job_id(job_id: &str) -> Result<&str, RequestError> {
    if job_id.trim().is_empty() {
        return Err(RequestError::MissingField("job_id"));
    }

    let is_token = job_id.len() <= MAX_JOB_ID_LEN
        && job_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if is_token {
        Ok(job_id)
    } else {
        Err(RequestError::InvalidField {
            field: "job_id",
            expected: "an identifier of letters, digits, '-' or '_'",
        })
    }
}

fn avatar_theme(object: &Object) -> Result<AvatarThemeParams, RequestError> {
    let image_url = required_url(object, "image_url")?;
    let theme = required_str(object, "theme")?;

    Ok(AvatarThemeParams {
        image_url,
        theme: parse_theme(theme)?,
    })
}

fn image_edit(object: &Object) -> Result<ImageEditParams, RequestError> {
    let image_url = required_url(object, "image_url")?;
    let section = required_str(object, "section")?;
    let prompt = required_str(object, "prompt")?.to_string();
    let section = parse_section(section)?;
    let mask_url = optional_url(object, "mask_url")?;

    Ok(ImageEditParams {
        image_url,
        section,
        prompt,
        mask_url,
    })
}

fn video_generation(object: &Object) -> Result<VideoGenerationParams, RequestError> {
    let image_url = required_url(object, "image_url")?;
    let audio_url = required_url(object, "audio_url")?;
    let text_prompt = required_str(object, "text_prompt")?.to_string();

    Ok(VideoGenerationParams {
        image_url,
        audio_url,
        text_prompt,
        aspect_ratio: optional_str(object, "aspect_ratio")?
            .unwrap_or(DEFAULT_ASPECT_RATIO)
            .to_string(),
        resolution: optional_str(object, "resolution")?
            .unwrap_or(DEFAULT_RESOLUTION)
            .to_string(),
        duration: optional_duration(object, "duration")?,
        seed: optional_integer(object, "seed")?.unwrap_or(DEFAULT_SEED),
    })
}

fn parse_theme(raw: &str) -> Result<Theme, RequestError> {
    raw.parse().map_err(|_| RequestError::InvalidEnum {
        field: "theme",
        allowed: allowed_list(Theme::ALL.iter().map(|t| t.as_str())),
    })
}

fn parse_section(raw: &str) -> Result<EditSection, RequestError> {
    raw.parse().map_err(|_| RequestError::InvalidEnum {
        field: "section",
        allowed: allowed_list(EditSection::ALL.iter().map(|s| s.as_str())),
    })
}

/// Render allowed values as `['a', 'b']`, the form documented to clients.
fn allowed_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = values.map(|v| format!("'{}'", v)).collect();
    format!("[{}]", quoted.join(", "))
}

fn as_object(payload: &Value) -> Result<&Object, RequestError> {
    payload.as_object().ok_or_else(|| {
        RequestError::MalformedPayload("Request body must be a JSON object".to_string())
    })
}

/// Absent, `null` and `""` all count as missing.
fn required_str<'a>(object: &'a Object, field: &'static str) -> Result<&'a str, RequestError> {
    match optional_str(object, field)? {
        Some(value) => Ok(value),
        None => Err(RequestError::MissingField(field)),
    }
}

fn optional_str<'a>(
    object: &'a Object,
    field: &'static str,
) -> Result<Option<&'a str>, RequestError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(RequestError::InvalidField {
            field,
            expected: "a string",
        }),
    }
}

fn required_url(object: &Object, field: &'static str) -> Result<String, RequestError> {
    let value = required_str(object, field)?;
    check_url(field, value)
}

fn optional_url(object: &Object, field: &'static str) -> Result<Option<String>, RequestError> {
    optional_str(object, field)?
        .map(|value| check_url(field, value))
        .transpose()
}

fn check_url(field: &'static str, value: &str) -> Result<String, RequestError> {
    let is_http = value.starts_with("http://") || value.starts_with("https://");
    if is_http && value.validate_url() {
        Ok(value.to_string())
    } else {
        Err(RequestError::InvalidField {
            field,
            expected: "a valid http(s) URL",
        })
    }
}

fn optional_duration(object: &Object, field: &'static str) -> Result<Option<f64>, RequestError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
            .map(Some)
            .ok_or(RequestError::InvalidField {
                field,
                expected: "a positive number of seconds",
            }),
    }
}

fn optional_integer(object: &Object, field: &'static str) -> Result<Option<i64>, RequestError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or(RequestError::InvalidField {
            field,
            expected: "an integer",
        }),
    }
}
