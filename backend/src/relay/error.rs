//! Error types for the upscale relay

use thiserror::Error;

use crate::job_api::JobApiError;

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur while relaying an upload to RunPod
#[derive(Error, Debug)]
pub enum RelayError {
    /// Uploaded file has no content
    #[error("Empty file")]
    EmptyUpload,

    /// Multipart body could not be read or lacks the file field
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// RunPod call failed
    #[error(transparent)]
    Upstream(#[from] JobApiError),

    /// Job reached `FAILED`
    #[error("RunPod Processing Failed: {0}")]
    JobFailed(String),

    /// Job ended in a terminal status other than completed or failed
    #[error("RunPod job ended with status {0}")]
    JobAborted(String),

    /// Completed job without output
    #[error("No output received from RunPod")]
    MissingOutput,

    /// Output payload is not valid base64
    #[error("Failed to decode output video: {0}")]
    OutputDecode(#[from] base64::DecodeError),

    /// Decoded video could not be written to the output directory
    #[error("Failed to write output video: {0}")]
    OutputWrite(#[from] std::io::Error),
}
