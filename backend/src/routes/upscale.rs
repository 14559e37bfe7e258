use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart},
    Extension, Json,
};
use tracing::instrument;

use crate::{
    relay::{RelayError, UploadRequest, UpscaleRelay, UpscaleResponse},
    types::AppError,
};

/// Multipart field carrying the video
const FILE_FIELD: &str = "file";

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), "invalid_upload", err.body_text(), false)
}

/// Reads the `file` field of the multipart body
async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(ToString::to_string);
        let content = field.bytes().await.map_err(multipart_error)?;
        return Ok(UploadRequest::new(filename, content));
    }

    Err(RelayError::InvalidUpload("Missing `file` field".to_string()).into())
}

/// Upscales an uploaded video
///
/// Forwards the video to the RunPod upscaling endpoint, waits for the job to
/// finish, and returns the result as a data URI, an external URL, or the raw
/// job output.
///
/// # Errors
///
/// - 400 if the upload is empty or has no `file` field
/// - 502 if RunPod is unreachable, rejects the job, or the job fails
/// - 500 if the job has no output or the video cannot be decoded or saved
#[instrument(skip_all)]
pub async fn upscale_video(
    Extension(relay): Extension<Arc<UpscaleRelay>>,
    multipart: Multipart,
) -> Result<Json<UpscaleResponse>, AppError> {
    let upload = read_upload(multipart).await?;

    tracing::info!("Received file: {}", upload.filename);

    let response = relay.relay(upload).await?;

    Ok(Json(response))
}
