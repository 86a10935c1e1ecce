use secrecy::Secret;
use service_core::config::{self as core_config, get_env, get_flag, Environment};
use service_core::error::AppError;
use std::env;
use std::time::Duration;

const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Hedra keeps a single public model; listing models on every request is
/// not needed.
const DEFAULT_HEDRA_MODEL_ID: &str = "d1dd37a3-e39a-4854-a298-6510289f9cf2";

#[derive(Debug, Clone)]
pub struct FaceforgeConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub api: ApiConfig,
    pub http: HttpClientConfig,
    pub deepai: DeepAiConfig,
    pub segmind: SegmindConfig,
    pub imagekit: ImageKitConfig,
    pub hedra: HedraConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Path under which every processing route is mounted.
    pub prefix: String,
    /// Access key callers must present as `api_key`.
    pub access_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct DeepAiConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct SegmindConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct ImageKitConfig {
    pub private_key: Secret<String>,
    pub upload_url: String,
}

#[derive(Debug, Clone)]
pub struct HedraConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub model_id: String,
    pub poll_interval: Duration,
    pub max_poll_attempts: u32,
    pub enabled: bool,
}

impl FaceforgeConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let environment = Environment::current();
        let is_prod = environment.is_prod();

        Ok(FaceforgeConfig {
            common: common_config,
            environment,
            api: ApiConfig {
                prefix: normalize_prefix(&get_env("API_PREFIX", Some(DEFAULT_API_PREFIX), is_prod)?),
                access_key: Secret::new(get_env("FACEFORGE_API_KEY", None, is_prod)?),
            },
            http: HttpClientConfig {
                timeout: Duration::from_secs(parse_or(
                    &get_env("PROVIDER_TIMEOUT_SECS", Some("120"), is_prod)?,
                    120,
                )),
            },
            deepai: DeepAiConfig {
                api_key: Secret::new(get_env("DEEPAI_API_KEY", Some(""), is_prod)?),
                base_url: get_env("DEEPAI_BASE_URL", Some("https://api.deepai.org"), is_prod)?,
                enabled: get_flag("DEEPAI_ENABLED"),
            },
            segmind: SegmindConfig {
                api_key: Secret::new(get_env("SEGMIND_API_KEY", Some(""), is_prod)?),
                base_url: get_env("SEGMIND_BASE_URL", Some("https://api.segmind.com/v1"), is_prod)?,
                enabled: get_flag("SEGMIND_ENABLED"),
            },
            imagekit: ImageKitConfig {
                private_key: Secret::new(get_env("IMAGEKIT_PRIVATE_KEY", Some(""), is_prod)?),
                upload_url: get_env(
                    "IMAGEKIT_UPLOAD_URL",
                    Some("https://upload.imagekit.io/api/v1/files/upload"),
                    is_prod,
                )?,
            },
            hedra: HedraConfig {
                api_key: Secret::new(get_env("HEDRA_API_KEY", Some(""), is_prod)?),
                base_url: get_env(
                    "HEDRA_BASE_URL",
                    Some("https://api.hedra.com/web-app/public"),
                    is_prod,
                )?,
                model_id: get_env("HEDRA_MODEL_ID", Some(DEFAULT_HEDRA_MODEL_ID), is_prod)?,
                poll_interval: Duration::from_secs(parse_or(
                    &get_env("HEDRA_POLL_INTERVAL_SECS", Some("5"), is_prod)?,
                    5,
                )),
                max_poll_attempts: parse_or(
                    &get_env("HEDRA_MAX_POLL_ATTEMPTS", Some("120"), is_prod)?,
                    120,
                ),
                enabled: get_flag("HEDRA_ENABLED"),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(raw: &str, fallback: T) -> T {
    raw.trim().parse().unwrap_or(fallback)
}

/// `api/v1/` -> `/api/v1`; empty or `/` mounts at the root.
pub fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
