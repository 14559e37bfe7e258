use aide::axum::IntoApiResponse;
use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;
use std::sync::Arc;

use crate::media_storage::MediaStorage;

/// Service status and build information
#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    /// Always `ok` while the service is serving
    status: String,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
    /// Whether presigned URLs can be issued
    storage_enabled: bool,
}

/// Health check endpoint
///
/// Returns the current status and version information of the service.
pub async fn handler(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
) -> impl IntoApiResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
        storage_enabled: media_storage.is_enabled(),
    })
}
