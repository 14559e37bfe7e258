use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    media_storage::MediaStorage,
    types::{AppError, ValidatedQuery},
};

fn default_content_type() -> String {
    "video/mp4".to_string()
}

/// Query of `GET /api/upload-url`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UploadUrlQuery {
    /// Name of the file, stored under `uploads/`
    #[validate(length(min = 1))]
    pub filename: String,
    /// Content type the client intends to upload
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

/// Presigned upload target
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UploadUrlResponse {
    /// Presigned PUT URL
    pub url: String,
    /// Object key the file will be stored under
    pub key: String,
}

/// Query of `GET /api/download-url`
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct DownloadUrlQuery {
    /// Object key of the file
    #[validate(length(min = 1))]
    pub file_key: String,
}

/// Download link for an object
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DownloadUrlResponse {
    /// Public or presigned GET URL
    pub url: String,
}

/// Creates a presigned URL for uploading a file directly to the bucket
///
/// # Errors
///
/// Returns 500 if the storage is not configured or signing fails.
#[instrument(skip(media_storage))]
pub async fn get_upload_url(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    ValidatedQuery(query): ValidatedQuery<UploadUrlQuery>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let key = MediaStorage::upload_key(&query.filename);

    let url = media_storage
        .generate_presigned_put_url(&key)
        .await
        .map_err(|e| {
            tracing::error!("Error generating upload URL: {e}");
            AppError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "upload_url_unavailable",
                "Could not generate upload URL",
                false,
            )
        })?;

    tracing::info!(key, content_type = %query.content_type, "Issued upload URL");

    Ok(Json(UploadUrlResponse { url, key }))
}

/// Returns a URL for downloading a file from the bucket
///
/// # Errors
///
/// Returns 404 if no public URL is configured and the storage is not configured
/// or signing fails.
#[instrument(skip(media_storage))]
pub async fn get_download_url(
    Extension(media_storage): Extension<Arc<MediaStorage>>,
    ValidatedQuery(query): ValidatedQuery<DownloadUrlQuery>,
) -> Result<Json<DownloadUrlResponse>, AppError> {
    let url = media_storage
        .download_url(&query.file_key)
        .await
        .map_err(|e| {
            tracing::warn!("Error generating download URL: {e}");
            AppError::new(
                StatusCode::NOT_FOUND,
                "file_not_found",
                "File not found or error generating URL",
                false,
            )
        })?;

    Ok(Json(DownloadUrlResponse { url }))
}
