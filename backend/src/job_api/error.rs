//! Error types for RunPod API calls

use thiserror::Error;

/// Number of characters of an upstream body kept in error messages
pub const UPSTREAM_PREVIEW_CHARS: usize = 200;

/// Errors that can occur while talking to the RunPod API
#[derive(Error, Debug)]
pub enum JobApiError {
    /// No API key was provided at startup
    #[error("RunPod API key is not configured")]
    NotConfigured,

    /// Transport failure, including client timeouts
    #[error("RunPod Connection Error: {0}")]
    Connection(#[from] reqwest_middleware::Error),

    /// Non-2xx response
    #[error("RunPod Error ({status}): {body}")]
    Status {
        /// HTTP status code returned by RunPod
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// Response body was not the expected JSON
    #[error("RunPod returned invalid JSON: {0}")]
    InvalidJson(String),

    /// Job creation succeeded without returning an id
    #[error("RunPod response did not include a job id")]
    MissingJobId,
}

impl From<reqwest::Error> for JobApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Connection(reqwest_middleware::Error::Reqwest(error))
    }
}

/// Truncates an upstream body for inclusion in caller-visible messages
#[must_use]
pub fn preview(body: &str) -> String {
    body.chars().take(UPSTREAM_PREVIEW_CHARS).collect()
}
