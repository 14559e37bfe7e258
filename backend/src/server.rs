use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, Extension, Router};
use datadog_tracing::axum::{shutdown_signal, OtelAxumLayer, OtelInResponseLayer};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, services::ServeDir, timeout::TimeoutLayer};

use crate::routes::{self, docs};
use crate::{media_storage::MediaStorage, relay::UpscaleRelay, types::Environment};

/// Builds the application router with its dependencies attached
///
/// When `STATIC_DIR` is set, unmatched paths are served from that directory.
pub fn router(
    environment: Environment,
    relay: Arc<UpscaleRelay>,
    media_storage: Arc<MediaStorage>,
) -> Router {
    let mut openapi = docs::openapi();

    let router = routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(Arc::new(openapi)))
        .layer(Extension(environment))
        .layer(Extension(relay))
        .layer(Extension(media_storage))
        // Uploads are whole videos, far above axum's 2 MB default
        .layer(DefaultBodyLimit::max(environment.max_upload_bytes()))
        .layer(CorsLayer::permissive());

    match environment.static_dir() {
        Some(dir) => {
            tracing::info!("Serving static files from {}", dir.display());
            router.fallback_service(ServeDir::new(dir))
        }
        None => router,
    }
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    relay: Arc<UpscaleRelay>,
    media_storage: Arc<MediaStorage>,
) -> anyhow::Result<()> {
    let router = router(environment, relay, media_storage)
        // Include trace context as header into the response
        .layer(OtelInResponseLayer)
        // Start OpenTelemetry trace on incoming request
        .layer(OtelAxumLayer::default())
        .layer(TimeoutLayer::new(environment.request_timeout()));

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Upscale Relay started on http://{addr} ({environment})");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}
