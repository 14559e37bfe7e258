//! Client for the RunPod serverless job API
mod error;
mod types;

use std::time::Duration;

use reqwest::{Client, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::types::Environment;

pub use error::{preview, JobApiError, UPSTREAM_PREVIEW_CHARS};
pub use types::{JobStatus, JobSubmission, RunRequest, StatusResponse};

use types::RunResponse;

/// Overall timeout for a single RunPod request, covering slow queues
const REQUEST_TIMEOUT_SECS: u64 = 600;
/// Connect timeout for RunPod requests
const CONNECT_TIMEOUT_SECS: u64 = 60;

/// Trait for the asynchronous job API the relay forwards videos to
#[async_trait::async_trait]
pub trait JobApi: Send + Sync {
    /// Submit a base64-encoded video and return the created job
    async fn submit(&self, video_base64: &str) -> Result<JobSubmission, JobApiError>;

    /// Fetch the current status of a job
    async fn status(&self, job_id: &str) -> Result<JobStatus, JobApiError>;
}

/// Connection settings for a RunPod serverless endpoint
#[derive(Debug, Clone)]
pub struct RunpodConfig {
    /// Bearer token; requests fail with `NotConfigured` without it
    pub api_key: Option<String>,
    /// API base, e.g. `https://api.runpod.ai/v2`
    pub base_url: String,
    /// Serverless endpoint running the upscaler
    pub endpoint_id: String,
}

impl RunpodConfig {
    /// Reads the RunPod settings from the environment
    #[must_use]
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            api_key: env.runpod_api_key(),
            base_url: env.runpod_base_url(),
            endpoint_id: env.runpod_endpoint_id(),
        }
    }

    fn run_url(&self) -> String {
        format!("{}/{}/run", self.base_url, self.endpoint_id)
    }

    fn status_url(&self, job_id: &str) -> String {
        format!("{}/{}/status/{job_id}", self.base_url, self.endpoint_id)
    }
}

/// HTTP client for the RunPod API
pub struct RunpodClient {
    config: RunpodConfig,
    http_client: ClientWithMiddleware,
}

impl RunpodClient {
    /// Creates a new RunPod client
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(config: RunpodConfig) -> reqwest::Result<Self> {
        let reqwest_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            config,
            http_client,
        })
    }

    fn api_key(&self) -> Result<&str, JobApiError> {
        self.config
            .api_key
            .as_deref()
            .ok_or(JobApiError::NotConfigured)
    }
}

/// Reads a RunPod response, rejecting non-2xx statuses and non-JSON bodies
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, JobApiError> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), body = %body, "RunPod returned an error status");
        return Err(JobApiError::Status {
            status: status.as_u16(),
            body: preview(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, body = %body, "RunPod returned a non-JSON response");
        JobApiError::InvalidJson(preview(&body))
    })
}

#[async_trait::async_trait]
impl JobApi for RunpodClient {
    #[instrument(skip_all)]
    async fn submit(&self, video_base64: &str) -> Result<JobSubmission, JobApiError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .post(self.config.run_url())
            .bearer_auth(api_key)
            .json(&RunRequest::new(video_base64))
            .send()
            .await?;

        let run: RunResponse = read_json(response).await?;
        let id = run
            .id
            .filter(|id| !id.is_empty())
            .ok_or(JobApiError::MissingJobId)?;

        tracing::info!(job_id = %id, "RunPod job submitted");

        Ok(JobSubmission { id })
    }

    #[instrument(skip(self))]
    async fn status(&self, job_id: &str) -> Result<JobStatus, JobApiError> {
        let api_key = self.api_key()?;

        let response = self
            .http_client
            .get(self.config.status_url(job_id))
            .bearer_auth(api_key)
            .send()
            .await?;

        let status: StatusResponse = read_json(response).await?;

        Ok(status.into())
    }
}

/// In-memory job API for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::{JobApi, JobApiError, JobStatus, JobSubmission};

    /// Scripted job API: hands out one status per poll, in order
    pub struct MockJobApi {
        job_id: String,
        submit_error: Option<(u16, String)>,
        statuses: Mutex<VecDeque<JobStatus>>,
        submitted: Mutex<Vec<String>>,
        status_calls: AtomicUsize,
    }

    impl MockJobApi {
        /// A job API that accepts every submission as `job_id` and reports `statuses` in order
        #[must_use]
        pub fn new(job_id: &str, statuses: Vec<JobStatus>) -> Self {
            Self {
                job_id: job_id.to_string(),
                submit_error: None,
                statuses: Mutex::new(statuses.into()),
                submitted: Mutex::new(Vec::new()),
                status_calls: AtomicUsize::new(0),
            }
        }

        /// A job API whose submissions fail with the given status and body
        #[must_use]
        pub fn rejecting(status: u16, body: &str) -> Self {
            Self {
                submit_error: Some((status, body.to_string())),
                ..Self::new("", Vec::new())
            }
        }

        /// Payloads received by `submit`, in order
        ///
        /// # Panics
        ///
        /// Panics if the lock is poisoned
        #[must_use]
        pub fn submitted_payloads(&self) -> Vec<String> {
            self.submitted.lock().unwrap().clone()
        }

        /// Number of status requests received
        #[must_use]
        pub fn status_calls(&self) -> usize {
            self.status_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl JobApi for MockJobApi {
        async fn submit(&self, video_base64: &str) -> Result<JobSubmission, JobApiError> {
            self.submitted
                .lock()
                .unwrap()
                .push(video_base64.to_string());

            if let Some((status, body)) = &self.submit_error {
                return Err(JobApiError::Status {
                    status: *status,
                    body: super::preview(body),
                });
            }

            Ok(JobSubmission {
                id: self.job_id.clone(),
            })
        }

        async fn status(&self, job_id: &str) -> Result<JobStatus, JobApiError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);

            // Running out of scripted statuses behaves like an unknown job
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| JobApiError::Status {
                    status: 404,
                    body: format!("job {job_id} not found"),
                })
        }
    }
}
