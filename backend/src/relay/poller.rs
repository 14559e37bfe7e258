use std::time::Duration;

use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use super::{output::is_empty_output, RelayError, RelayResult};
use crate::job_api::{JobApi, JobStatus};

/// Polls a submitted job at a fixed interval until it reaches a terminal status
pub struct JobPoller<'a> {
    api: &'a dyn JobApi,
    interval: Duration,
}

impl<'a> JobPoller<'a> {
    /// Creates a poller waiting `interval` before each status request
    #[must_use]
    pub const fn new(api: &'a dyn JobApi, interval: Duration) -> Self {
        Self { api, interval }
    }

    /// Waits for the job to complete and returns its output
    ///
    /// There is no poll limit. The loop ends on a terminal status, on the first
    /// failed status request, or when the caller drops the future.
    ///
    /// # Errors
    ///
    /// - `RelayError::Upstream` if a status request fails
    /// - `RelayError::JobFailed` if the job reports `FAILED`
    /// - `RelayError::JobAborted` for any other non-successful terminal status
    /// - `RelayError::MissingOutput` if the job completed without output
    #[instrument(skip(self))]
    pub async fn wait_for_output(&self, job_id: &str) -> RelayResult<Value> {
        let mut polls: u32 = 0;

        loop {
            sleep(self.interval).await;
            polls = polls.saturating_add(1);

            let status = self.api.status(job_id).await?;
            debug!(polls, status = status.name(), "Polled RunPod job");

            match status {
                JobStatus::Queued | JobStatus::InProgress => {}
                JobStatus::Completed { output } => {
                    info!(polls, "RunPod job completed");
                    return output
                        .filter(|output| !is_empty_output(output))
                        .ok_or(RelayError::MissingOutput);
                }
                JobStatus::Failed { error } => {
                    warn!(polls, error = %error, "RunPod job failed");
                    return Err(RelayError::JobFailed(error));
                }
                other => {
                    warn!(polls, status = other.name(), "RunPod job aborted");
                    return Err(RelayError::JobAborted(other.name().to_string()));
                }
            }
        }
    }
}
