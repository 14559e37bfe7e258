//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{
    job_api::{preview, JobApiError},
    relay::RelayError,
};

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Human-readable error message, kept at the top level for browser clients
    pub detail: String,
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, msg: impl Into<String>, retry: bool) -> Self {
        let message = msg.into();
        Self {
            status,
            inner: ApiErrorResponse {
                detail: message.clone(),
                allow_retry: retry,
                error: ErrorBody { code, message },
            },
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert relay errors to application errors
impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        use RelayError::{
            EmptyUpload, InvalidUpload, JobAborted, JobFailed, MissingOutput, OutputDecode,
            OutputWrite, Upstream,
        };

        match err {
            EmptyUpload => Self::new(StatusCode::BAD_REQUEST, "empty_file", "Empty file", false),
            InvalidUpload(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_upload", msg, false)
            }
            Upstream(err) => err.into(),
            JobFailed(msg) => Self::new(
                StatusCode::BAD_GATEWAY,
                "job_failed",
                format!("RunPod Processing Failed: {}", preview(&msg)),
                false,
            ),
            JobAborted(status) => Self::new(
                StatusCode::BAD_GATEWAY,
                "job_failed",
                format!("RunPod job ended with status {}", preview(&status)),
                false,
            ),
            MissingOutput => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "no_output",
                "No output received from RunPod",
                false,
            ),
            OutputDecode(e) => {
                tracing::error!("Failed to decode upscaled video: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "save_failed",
                    "Failed to save upscaled video",
                    false,
                )
            }
            OutputWrite(e) => {
                tracing::error!("Failed to write upscaled video: {e}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "save_failed",
                    "Failed to save upscaled video",
                    false,
                )
            }
        }
    }
}

/// Convert RunPod client errors to application errors
impl From<JobApiError> for AppError {
    fn from(err: JobApiError) -> Self {
        match &err {
            JobApiError::NotConfigured => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "not_configured",
                "RunPod API key is not configured",
                false,
            ),
            JobApiError::Connection(_)
            | JobApiError::Status { .. }
            | JobApiError::InvalidJson(_)
            | JobApiError::MissingJobId => {
                Self::new(StatusCode::BAD_GATEWAY, "upstream_error", err.to_string(), true)
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_errors_map_to_status() {
        let cases = [
            (RelayError::EmptyUpload, StatusCode::BAD_REQUEST),
            (
                RelayError::JobFailed("boom".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                RelayError::JobAborted("CANCELLED".to_string()),
                StatusCode::BAD_GATEWAY,
            ),
            (RelayError::MissingOutput, StatusCode::INTERNAL_SERVER_ERROR),
            (
                RelayError::Upstream(JobApiError::MissingJobId),
                StatusCode::BAD_GATEWAY,
            ),
            (
                RelayError::Upstream(JobApiError::NotConfigured),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_detail_mirrors_message() {
        let err = AppError::from(RelayError::JobFailed("out of memory".to_string()));
        assert_eq!(err.code(), "job_failed");
        assert_eq!(err.inner.detail, "RunPod Processing Failed: out of memory");
        assert_eq!(err.inner.error.message, err.inner.detail);
    }

    #[test]
    fn test_job_errors_truncate_upstream_text() {
        let failed = AppError::from(RelayError::JobFailed("e".repeat(1000)));
        assert_eq!(
            failed.inner.detail,
            format!("RunPod Processing Failed: {}", "e".repeat(200))
        );

        let aborted = AppError::from(RelayError::JobAborted("S".repeat(500)));
        assert_eq!(
            aborted.inner.detail,
            format!("RunPod job ended with status {}", "S".repeat(200))
        );
    }
}
