use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /run`
#[derive(Debug, Serialize)]
pub struct RunRequest<'a> {
    /// Handler input
    pub input: RunInput<'a>,
}

/// Input passed to the upscaling handler
#[derive(Debug, Serialize)]
pub struct RunInput<'a> {
    /// Base64-encoded source video
    pub video: &'a str,
}

impl<'a> RunRequest<'a> {
    /// Wraps a base64 video into a job request
    #[must_use]
    pub const fn new(video_base64: &'a str) -> Self {
        Self {
            input: RunInput {
                video: video_base64,
            },
        }
    }
}

/// Body returned by `POST /run`
#[derive(Debug, Deserialize)]
pub struct RunResponse {
    /// Job id
    pub id: Option<String>,
}

/// Body of `GET /status/{id}`
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    /// `IN_QUEUE`, `IN_PROGRESS`, `COMPLETED`, `FAILED`, ...
    #[serde(default)]
    pub status: String,
    /// Handler output, set once completed
    #[serde(default)]
    pub output: Option<Value>,
    /// Failure reason, usually a string
    #[serde(default)]
    pub error: Option<Value>,
}

/// A job accepted by RunPod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    /// Id used for status requests
    pub id: String,
}

/// Status of a RunPod job
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// `IN_QUEUE`
    Queued,
    /// `IN_PROGRESS`
    InProgress,
    /// `COMPLETED`
    Completed {
        /// Handler output, if any
        output: Option<Value>,
    },
    /// `FAILED`
    Failed {
        /// Upstream error, `Unknown error` when absent
        error: String,
    },
    /// `CANCELLED`
    Cancelled,
    /// `TIMED_OUT`
    TimedOut,
    /// Status string this service does not know about
    Unknown(String),
}

impl JobStatus {
    /// Whether polling should stop at this status
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Queued | Self::InProgress)
    }

    /// Status name as reported by RunPod
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Queued => "IN_QUEUE",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed { .. } => "COMPLETED",
            Self::Failed { .. } => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::TimedOut => "TIMED_OUT",
            Self::Unknown(status) if status.is_empty() => "UNKNOWN",
            Self::Unknown(status) => status,
        }
    }
}

impl From<StatusResponse> for JobStatus {
    fn from(response: StatusResponse) -> Self {
        match response.status.as_str() {
            "IN_QUEUE" => Self::Queued,
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETED" => Self::Completed {
                output: response.output,
            },
            "FAILED" => {
                let error = match response.error {
                    Some(Value::String(msg)) if !msg.is_empty() => msg,
                    Some(Value::Null | Value::String(_)) | None => "Unknown error".to_string(),
                    Some(other) => other.to_string(),
                };
                Self::Failed { error }
            }
            "CANCELLED" => Self::Cancelled,
            "TIMED_OUT" => Self::TimedOut,
            other => Self::Unknown(other.to_string()),
        }
    }
}
