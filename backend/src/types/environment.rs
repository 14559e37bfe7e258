//! Environment configuration for different deployment stages

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::Level;

/// RunPod serverless endpoint serving the upscaling model
const DEFAULT_RUNPOD_ENDPOINT_ID: &str = "hgn3kb2km6tnxi";
const DEFAULT_RUNPOD_BASE_URL: &str = "https://api.runpod.ai/v2";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u64 = 60 * 60;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
/// Above the outbound 600s client timeout so upstream failures are classified by the relay
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 660;
const DEFAULT_PORT: u16 = 8000;

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Local development
    Development,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Staging => write!(f, "staging"),
            Self::Development => write!(f, "development"),
        }
    }
}

/// Reads an optional variable, treating empty values as unset
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|val| val.trim().parse::<T>().ok())
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` contains an invalid value
    #[must_use]
    pub fn from_env() -> Self {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Self::Production,
            "staging" => Self::Staging,
            "development" => Self::Development,
            _ => panic!("Invalid environment: {env}"),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Default log level, overridable with `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        parsed_var::<Level>("TRACING_LEVEL").unwrap_or(match self {
            Self::Production | Self::Staging => Level::INFO,
            Self::Development => Level::DEBUG,
        })
    }

    /// Port the HTTP server binds to
    #[must_use]
    pub fn port(&self) -> u16 {
        parsed_var("PORT").unwrap_or(DEFAULT_PORT)
    }

    /// Bearer token for the RunPod API
    #[must_use]
    pub fn runpod_api_key(&self) -> Option<String> {
        non_empty_var("RUNPOD_API_KEY")
    }

    /// RunPod serverless endpoint id
    #[must_use]
    pub fn runpod_endpoint_id(&self) -> String {
        non_empty_var("RUNPOD_ENDPOINT_ID").unwrap_or_else(|| DEFAULT_RUNPOD_ENDPOINT_ID.to_string())
    }

    /// Base URL of the RunPod serverless API, without trailing slash
    #[must_use]
    pub fn runpod_base_url(&self) -> String {
        non_empty_var("RUNPOD_BASE_URL")
            .map_or_else(|| DEFAULT_RUNPOD_BASE_URL.to_string(), |url| {
                url.trim_end_matches('/').to_string()
            })
    }

    /// Delay between two job status requests; zero falls back to the default
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(
            parsed_var("RUNPOD_POLL_INTERVAL_SECS")
                .filter(|&secs: &u64| secs > 0)
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        )
    }

    /// Directory where decoded videos are kept, if persistence is enabled
    #[must_use]
    pub fn output_dir(&self) -> Option<PathBuf> {
        non_empty_var("OUTPUT_DIR").map(PathBuf::from)
    }

    /// Maximum accepted request body size for uploads
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        parsed_var("MAX_UPLOAD_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES)
    }

    /// Server-side timeout applied to every request
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(parsed_var("REQUEST_TIMEOUT_SECS").unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Directory with the static front-end, if it should be served
    #[must_use]
    pub fn static_dir(&self) -> Option<PathBuf> {
        non_empty_var("STATIC_DIR").map(PathBuf::from)
    }

    /// R2 S3 API endpoint
    #[must_use]
    pub fn r2_endpoint_url(&self) -> Option<String> {
        non_empty_var("R2_ENDPOINT_URL")
    }

    /// R2 access key id
    #[must_use]
    pub fn r2_access_key_id(&self) -> Option<String> {
        non_empty_var("R2_ACCESS_KEY_ID")
    }

    /// R2 secret access key
    #[must_use]
    pub fn r2_secret_access_key(&self) -> Option<String> {
        non_empty_var("R2_SECRET_ACCESS_KEY")
    }

    /// Bucket for uploads
    #[must_use]
    pub fn r2_bucket_name(&self) -> Option<String> {
        non_empty_var("R2_BUCKET_NAME")
    }

    /// Public base URL of the bucket, bypasses signing for downloads
    #[must_use]
    pub fn r2_public_url(&self) -> Option<String> {
        non_empty_var("R2_PUBLIC_URL")
    }

    /// Presigned URL expiry time in seconds
    #[must_use]
    pub fn presigned_url_expiry_secs(&self) -> u64 {
        parsed_var("PRESIGNED_URL_EXPIRY_SECS").unwrap_or(DEFAULT_PRESIGNED_URL_EXPIRY_SECS)
    }
}
