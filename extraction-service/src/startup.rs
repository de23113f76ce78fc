use crate::config::ExtractionConfig;
use crate::handlers;
use crate::services::{ExtractionProvider, FireworksProvider, ImageNormalizer};
use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::{cors_middleware, CorsPolicy},
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: ExtractionConfig,
    pub provider: Arc<dyn ExtractionProvider>,
    pub normalizer: ImageNormalizer,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the service against the configured Fireworks endpoint.
    pub async fn build(config: ExtractionConfig) -> Result<Self, AppError> {
        let provider = FireworksProvider::new(&config.fireworks).map_err(|e| {
            tracing::error!("Failed to initialize Fireworks provider: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        tracing::info!(
            model = %config.fireworks.model,
            endpoint = %provider.endpoint(),
            "Initialized Fireworks provider"
        );

        Self::build_with_provider(config, Arc::new(provider)).await
    }

    pub async fn build_with_provider(
        config: ExtractionConfig,
        provider: Arc<dyn ExtractionProvider>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            normalizer: ImageNormalizer::new(config.image.jpeg_quality),
            config: config.clone(),
            provider,
        };

        let router = build_router(state)?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(
            port,
            allowed_origin = %config.allowed_origin(),
            "Listening"
        );

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = CorsPolicy::new(state.config.allowed_origin()).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "Invalid CORS origin '{}': {}",
            state.config.allowed_origin(),
            e
        ))
    })?;
    let max_upload_bytes = state.config.image.max_upload_bytes;

    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/fireworks", post(handlers::extract_document))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn_with_state(cors, cors_middleware))
        .with_state(state);

    Ok(router)
}
