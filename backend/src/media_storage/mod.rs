//! Presigned URLs for the S3-compatible media bucket (Cloudflare R2)
mod error;

use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::{presigning::PresigningConfig, Client as S3Client};
use tracing::{debug, info, warn};

use crate::types::Environment;

pub use error::{BucketError, BucketResult};

/// Namespace for objects uploaded through presigned URLs
pub const UPLOAD_KEY_PREFIX: &str = "uploads/";
/// R2 ignores regions but SigV4 needs one
const R2_REGION: &str = "auto";
const MAX_RETRIES: u32 = 3;

/// Connection settings for the media bucket
#[derive(Debug, Clone, Default)]
pub struct StorageConfig {
    /// S3 API endpoint of the account
    pub endpoint_url: Option<String>,
    /// R2 access key id
    pub access_key_id: Option<String>,
    /// R2 secret access key
    pub secret_access_key: Option<String>,
    /// Bucket holding the media objects
    pub bucket_name: Option<String>,
    /// Public base URL of the bucket, used for downloads instead of signing
    pub public_url: Option<String>,
    /// Lifetime of issued URLs
    pub presigned_url_expiry_secs: u64,
}

impl StorageConfig {
    /// Reads the R2 settings from the environment
    #[must_use]
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            endpoint_url: env.r2_endpoint_url(),
            access_key_id: env.r2_access_key_id(),
            secret_access_key: env.r2_secret_access_key(),
            bucket_name: env.r2_bucket_name(),
            public_url: env.r2_public_url(),
            presigned_url_expiry_secs: env.presigned_url_expiry_secs(),
        }
    }

    /// S3 client configuration for the bucket endpoint, or `None` if a credential is missing
    #[must_use]
    pub fn s3_client_config(&self) -> Option<aws_sdk_s3::Config> {
        let (Some(endpoint_url), Some(access_key_id), Some(secret_access_key), Some(_)) = (
            &self.endpoint_url,
            &self.access_key_id,
            &self.secret_access_key,
            &self.bucket_name,
        ) else {
            return None;
        };

        let retry_config = RetryConfig::standard()
            .with_max_attempts(MAX_RETRIES)
            .with_initial_backoff(Duration::from_millis(50));

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let credentials = Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "r2-environment",
        );

        // R2 buckets are addressed by path, not by subdomain
        Some(
            aws_sdk_s3::Config::builder()
                .behavior_version(BehaviorVersion::latest())
                .region(Region::new(R2_REGION))
                .endpoint_url(endpoint_url)
                .credentials_provider(credentials)
                .retry_config(retry_config)
                .timeout_config(timeout_config)
                .force_path_style(true)
                .build(),
        )
    }
}

/// Configured bucket
struct Bucket {
    client: S3Client,
    name: String,
}

/// Media storage client issuing presigned URLs
///
/// Without credentials the client runs disabled: every signing call returns
/// `BucketError::NotConfigured`.
pub struct MediaStorage {
    bucket: Option<Bucket>,
    public_url: Option<String>,
    presigned_url_expiry_secs: u64,
}

impl MediaStorage {
    /// Creates a media storage client from its configuration
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        let bucket = match (config.s3_client_config(), config.bucket_name) {
            (Some(s3_config), Some(name)) => {
                info!("Initialized media storage for bucket: {name}");
                Some(Bucket {
                    client: S3Client::from_conf(s3_config),
                    name,
                })
            }
            _ => {
                warn!("R2 credentials missing, presigned URLs are unavailable");
                None
            }
        };

        Self {
            bucket,
            public_url: config.public_url,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
        }
    }

    /// Whether signing operations are available
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.bucket.is_some()
    }

    /// Maps an uploaded filename to its object key
    #[must_use]
    pub fn upload_key(filename: &str) -> String {
        format!("{UPLOAD_KEY_PREFIX}{filename}")
    }

    /// Joins the public base URL and an object key with exactly one slash
    #[must_use]
    pub fn public_object_url(public_url: &str, key: &str) -> String {
        format!(
            "{}/{}",
            public_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }

    fn bucket(&self) -> BucketResult<&Bucket> {
        self.bucket.as_ref().ok_or(BucketError::NotConfigured)
    }

    fn presigning_config(&self) -> BucketResult<PresigningConfig> {
        PresigningConfig::expires_in(Duration::from_secs(self.presigned_url_expiry_secs)).map_err(
            |e| BucketError::ConfigError(format!("Failed to create presigning config: {e}")),
        )
    }

    /// Generates a presigned URL for PUT operations
    ///
    /// # Errors
    ///
    /// Returns `BucketError::NotConfigured` if the storage is disabled
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    pub async fn generate_presigned_put_url(&self, key: &str) -> BucketResult<String> {
        let bucket = self.bucket()?;

        let presigned = bucket
            .client
            .put_object()
            .bucket(&bucket.name)
            .key(key)
            .presigned(self.presigning_config()?)
            .await?;

        debug!(key, "Generated presigned upload URL");
        Ok(presigned.uri().to_string())
    }

    /// Returns a download URL for an object
    ///
    /// With a public base URL configured this is a permanent link built without
    /// signing or checking that the object exists. Otherwise a presigned GET URL.
    ///
    /// # Errors
    ///
    /// Returns `BucketError::NotConfigured` if no public URL is set and the storage is disabled
    /// Returns `BucketError::ConfigError` if presigning config creation fails
    /// Returns `BucketError::S3Error` if presigned URL generation fails
    pub async fn download_url(&self, key: &str) -> BucketResult<String> {
        if let Some(public_url) = &self.public_url {
            return Ok(Self::public_object_url(public_url, key));
        }

        let bucket = self.bucket()?;

        let presigned = bucket
            .client
            .get_object()
            .bucket(&bucket.name)
            .key(key)
            .presigned(self.presigning_config()?)
            .await?;

        debug!(key, "Generated presigned download URL");
        Ok(presigned.uri().to_string())
    }
}
