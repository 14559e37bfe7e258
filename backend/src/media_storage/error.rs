//! Error types for bucket operations

use aws_sdk_s3::{
    error::SdkError,
    operation::{get_object::GetObjectError, put_object::PutObjectError},
};
use thiserror::Error;

/// Result type for bucket operations
pub type BucketResult<T> = Result<T, BucketError>;

/// Errors that can occur during bucket operations
#[derive(Error, Debug)]
pub enum BucketError {
    /// Storage credentials were missing at startup
    #[error("Object storage is not configured")]
    NotConfigured,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),
}

impl From<SdkError<PutObjectError>> for BucketError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        Self::S3Error(format!("Failed to presign upload: {error}"))
    }
}

impl From<SdkError<GetObjectError>> for BucketError {
    fn from(error: SdkError<GetObjectError>) -> Self {
        Self::S3Error(format!("Failed to presign download: {error}"))
    }
}
