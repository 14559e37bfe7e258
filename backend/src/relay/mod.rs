//! Upload-and-upscale relay to the RunPod job API
mod error;
/// Interpretation of job output
pub mod output;
mod poller;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::{job_api::JobApi, types::Environment};

pub use error::{RelayError, RelayResult};
pub use output::UpscaleResponse;
pub use poller::JobPoller;

use output::ResolvedOutput;

/// RunPod may reject encoded payloads above this size
const LARGE_PAYLOAD_WARN_BYTES: usize = 50 * 1024 * 1024;
const DEFAULT_UPLOAD_FILENAME: &str = "upload.mp4";

/// Relay settings
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Delay between two job status requests
    pub poll_interval: Duration,
    /// Where decoded videos are written, if anywhere
    pub output_dir: Option<PathBuf>,
}

impl RelayConfig {
    /// Reads the relay settings from the environment
    #[must_use]
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            poll_interval: env.poll_interval(),
            output_dir: env.output_dir(),
        }
    }
}

/// A video received from the caller
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename, `upload.mp4` when the client sent none
    pub filename: String,
    /// Raw video bytes
    pub content: Bytes,
}

impl UploadRequest {
    /// Creates an upload, defaulting a missing or empty filename
    #[must_use]
    pub fn new(filename: Option<String>, content: Bytes) -> Self {
        Self {
            filename: filename
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_UPLOAD_FILENAME.to_string()),
            content,
        }
    }
}

/// Forwards uploads to the job API and turns the finished job into a response
pub struct UpscaleRelay {
    job_api: Arc<dyn JobApi>,
    config: RelayConfig,
}

impl UpscaleRelay {
    /// Creates a relay on top of a job API
    #[must_use]
    pub fn new(job_api: Arc<dyn JobApi>, config: RelayConfig) -> Self {
        Self { job_api, config }
    }

    /// Submits the upload, waits for the job and normalizes its output
    ///
    /// # Errors
    ///
    /// - `RelayError::EmptyUpload` if the upload has no content; nothing is submitted
    /// - `RelayError::Upstream`, `RelayError::JobFailed`, `RelayError::JobAborted` for remote failures
    /// - `RelayError::MissingOutput` if the job completed without output
    /// - `RelayError::OutputDecode` or `RelayError::OutputWrite` if the video cannot be decoded or saved
    #[instrument(skip_all, fields(filename = %upload.filename, size = upload.content.len()))]
    pub async fn relay(&self, upload: UploadRequest) -> RelayResult<UpscaleResponse> {
        if upload.content.is_empty() {
            return Err(RelayError::EmptyUpload);
        }

        // The whole video is held in memory, raw and encoded
        let video_base64 = STANDARD.encode(&upload.content);
        info!(encoded_bytes = video_base64.len(), "Video encoded to base64");

        if video_base64.len() > LARGE_PAYLOAD_WARN_BYTES {
            warn!("Encoded video exceeds 50 MiB, RunPod might reject this payload");
        }

        let job = self.job_api.submit(&video_base64).await?;
        drop(video_base64);

        let output = JobPoller::new(self.job_api.as_ref(), self.config.poll_interval)
            .wait_for_output(&job.id)
            .await?;

        self.respond(&upload.filename, output).await
    }

    async fn respond(&self, filename: &str, output: Value) -> RelayResult<UpscaleResponse> {
        match output::resolve(&output) {
            ResolvedOutput::Url(url) => {
                info!("Returning video URL from job output");
                Ok(UpscaleResponse::Url {
                    url: url.to_string(),
                })
            }
            ResolvedOutput::Encoded(payload) => {
                let payload = output::compact_base64(payload);
                let video = STANDARD.decode(payload.as_bytes())?;

                if let Some(dir) = &self.config.output_dir {
                    persist(dir, filename, &video).await?;
                }

                let url = output::mp4_data_uri(&payload);
                info!(length = url.len(), "Returning data URI");
                Ok(UpscaleResponse::DataUri { url })
            }
            ResolvedOutput::Raw => {
                info!("Job output not recognised as video, passing it through");
                Ok(UpscaleResponse::Raw { output })
            }
        }
    }
}

/// Writes the decoded video to `<dir>/upscaled_<filename>`
async fn persist(dir: &Path, filename: &str, video: &[u8]) -> std::io::Result<PathBuf> {
    let name = Path::new(filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(DEFAULT_UPLOAD_FILENAME);
    let path = dir.join(format!("upscaled_{name}"));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, video).await?;

    info!(path = %path.display(), bytes = video.len(), "Saved upscaled video");
    Ok(path)
}
