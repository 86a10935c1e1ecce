//! Application startup and lifecycle management.

use crate::config::FaceforgeConfig;
use crate::docs;
use crate::handlers::{avatar, health, image, job, video};
use crate::services::providers::deepai::DeepAiProvider;
use crate::services::providers::hedra::HedraProvider;
use crate::services::providers::imagekit::ImageKitUploader;
use crate::services::providers::mock::{
    MockAvatarProvider, MockImageEditProvider, MockVideoProvider,
};
use crate::services::providers::segmind::SegmindProvider;
use crate::services::providers::{AvatarProvider, ImageEditProvider, VideoProvider};
use crate::services::{ApiKeyVerifier, Dispatcher, PollSettings, Processor};
use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;
use reqwest::Client;
use service_core::config::Environment;
use service_core::error::AppError;
use service_core::middleware::{
    metrics_middleware, request_id_middleware, request_span, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub processor: Processor,
    pub api_prefix: String,
}

impl AppState {
    pub fn new(processor: Processor, api_prefix: impl Into<String>) -> Self {
        Self {
            processor,
            api_prefix: api_prefix.into(),
        }
    }
}

/// Build the full router: processing routes and Swagger UI under the API
/// prefix plus the root, health and metrics endpoints.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/avatar-theme", post(avatar::avatar_theme))
        .route("/image-edit", post(image::image_edit))
        .route("/image-edit/mask", post(image::create_mask))
        .route("/video-generation", post(video::generate_video))
        .route("/video-generation/submit", post(video::submit_video))
        .route("/video-generation/status/:job_id", get(video::video_status))
        .route("/run", post(job::run_job));

    let router = Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_endpoint));

    let router = if state.api_prefix.is_empty() {
        router.merge(api)
    } else {
        router.nest(&state.api_prefix, api)
    };

    let router = router.merge(
        SwaggerUi::new(format!("{}/docs", state.api_prefix)).url(
            format!("{}/openapi.json", state.api_prefix),
            docs::openapi(&state.api_prefix),
        ),
    );

    router
        .route_layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| request_span(request)),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

type Providers = (
    Arc<dyn AvatarProvider>,
    Arc<dyn ImageEditProvider>,
    Arc<dyn VideoProvider>,
);

/// Real providers where enabled. Outside production a disabled provider is
/// replaced by its mock; in production startup fails instead.
fn build_providers(config: &FaceforgeConfig) -> Result<Providers, AppError> {
    let client = Client::builder()
        .timeout(config.http.timeout)
        .build()
        .map_err(|e| AppError::ConfigError(anyhow::Error::new(e)))?;

    let avatar: Arc<dyn AvatarProvider> = if config.deepai.enabled {
        tracing::info!("DeepAI avatar provider initialized");
        Arc::new(DeepAiProvider::new(config.deepai.clone(), client.clone()))
    } else {
        allow_mock("DeepAI", "DEEPAI_ENABLED", config.environment)?;
        Arc::new(MockAvatarProvider::new(true))
    };

    let editor: Arc<dyn ImageEditProvider> = if config.segmind.enabled {
        tracing::info!("Segmind image edit provider initialized");
        let uploader = ImageKitUploader::new(config.imagekit.clone(), client.clone());
        Arc::new(SegmindProvider::new(
            config.segmind.clone(),
            client.clone(),
            uploader,
        ))
    } else {
        allow_mock("Segmind", "SEGMIND_ENABLED", config.environment)?;
        Arc::new(MockImageEditProvider::new(true))
    };

    let video: Arc<dyn VideoProvider> = if config.hedra.enabled {
        tracing::info!(model_id = %config.hedra.model_id, "Hedra video provider initialized");
        Arc::new(HedraProvider::new(config.hedra.clone(), client))
    } else {
        allow_mock("Hedra", "HEDRA_ENABLED", config.environment)?;
        Arc::new(MockVideoProvider::new(true))
    };

    Ok((avatar, editor, video))
}

/// Mock results carry placeholder URLs, so they must never reach production
/// callers.
fn allow_mock(provider: &str, flag: &str, environment: Environment) -> Result<(), AppError> {
    if environment.is_prod() {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} provider is disabled; set {}=true to run in production",
            provider,
            flag
        )));
    }
    tracing::warn!(
        environment = ?environment,
        "{} provider disabled, using mock provider",
        provider
    );
    Ok(())
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FaceforgeConfig) -> Result<Self, AppError> {
        let (avatar, editor, video) = build_providers(&config)?;

        let dispatcher = Dispatcher::new(
            avatar,
            editor,
            video,
            PollSettings {
                interval: config.hedra.poll_interval,
                max_attempts: config.hedra.max_poll_attempts,
            },
        );
        let processor = Processor::new(
            ApiKeyVerifier::new(config.api.access_key.clone()),
            dispatcher,
        );
        let router = build_router(AppState::new(processor, config.api.prefix.clone()));

        // Port 0 picks a random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            prefix = %config.api.prefix,
            "FaceForge service listening"
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ApiConfig, DeepAiConfig, HedraConfig, HttpClientConfig, ImageKitConfig, SegmindConfig,
    };
    use secrecy::Secret;
    use std::time::Duration;

    fn config(environment: Environment, enabled: bool) -> FaceforgeConfig {
        let key = || Secret::new("provider-key".to_string());
        FaceforgeConfig {
            common: service_core::config::Config {
                port: 0,
                log_level: "info".to_string(),
            },
            environment,
            api: ApiConfig {
                prefix: "/api/v1".to_string(),
                access_key: key(),
            },
            http: HttpClientConfig {
                timeout: Duration::from_secs(5),
            },
            deepai: DeepAiConfig {
                api_key: key(),
                base_url: "https://api.deepai.org".to_string(),
                enabled,
            },
            segmind: SegmindConfig {
                api_key: key(),
                base_url: "https://api.segmind.com/v1".to_string(),
                enabled,
            },
            imagekit: ImageKitConfig {
                private_key: key(),
                upload_url: "https://upload.imagekit.io/api/v1/files/upload".to_string(),
            },
            hedra: HedraConfig {
                api_key: key(),
                base_url: "https://api.hedra.com/web-app/public".to_string(),
                model_id: "model".to_string(),
                poll_interval: Duration::from_secs(5),
                max_poll_attempts: 120,
                enabled,
            },
            otlp_endpoint: None,
        }
    }

    #[test]
    fn production_refuses_to_start_with_a_disabled_provider() {
        let mut prod = config(Environment::Prod, true);
        prod.hedra.enabled = false;

        let Err(err) = build_providers(&prod) else {
            panic!("disabled provider must fail startup in production");
        };
        assert!(err.to_string().contains("HEDRA_ENABLED"));
    }

    #[test]
    fn production_starts_with_every_provider_enabled() {
        assert!(build_providers(&config(Environment::Prod, true)).is_ok());
    }

    #[test]
    fn development_falls_back_to_mocks() {
        assert!(build_providers(&config(Environment::Dev, false)).is_ok());
        assert!(build_providers(&config(Environment::Test, false)).is_ok());
    }
}
