use axum::{body::Body, http::Request, response::Response, Router};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use upscale_relay::{
    job_api::{mock::MockJobApi, JobApi},
    media_storage::{MediaStorage, StorageConfig},
    relay::{RelayConfig, UpscaleRelay},
    server,
    types::Environment,
};

use super::utils::{multipart_body, MULTIPART_BOUNDARY};

pub const TEST_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Storage settings pointing at a local endpoint; presigning needs no network
pub fn local_storage_config(public_url: Option<&str>) -> StorageConfig {
    StorageConfig {
        endpoint_url: Some("http://localhost:9000".to_string()),
        access_key_id: Some("test-access-key".to_string()),
        secret_access_key: Some("test-secret-key".to_string()),
        bucket_name: Some("media".to_string()),
        public_url: public_url.map(ToString::to_string),
        presigned_url_expiry_secs: 3600,
    }
}

/// Router wired to a scripted job API and an in-process storage client
pub struct TestSetup {
    pub router: Router,
    pub job_api: Arc<MockJobApi>,
}

impl TestSetup {
    /// Setup with storage disabled
    pub fn new(job_api: MockJobApi) -> Self {
        Self::with_storage(job_api, StorageConfig::default())
    }

    pub fn with_storage(job_api: MockJobApi, storage_config: StorageConfig) -> Self {
        let job_api = Arc::new(job_api);
        let router = build_router(job_api.clone(), storage_config);
        Self { router, job_api }
    }

    /// Setup with storage disabled and decoded videos written to `output_dir`
    pub fn with_output_dir(job_api: MockJobApi, output_dir: PathBuf) -> Self {
        let job_api = Arc::new(job_api);
        let router = router_with(job_api.clone(), StorageConfig::default(), Some(output_dir));
        Self { router, job_api }
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        field: &str,
        filename: &str,
        content: &[u8],
    ) -> Result<Response, Box<dyn std::error::Error>> {
        send_multipart(&self.router, route, field, filename, content).await
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}

/// Builds the application router around any job API
pub fn build_router(job_api: Arc<dyn JobApi>, storage_config: StorageConfig) -> Router {
    router_with(job_api, storage_config, None)
}

fn router_with(
    job_api: Arc<dyn JobApi>,
    storage_config: StorageConfig,
    output_dir: Option<PathBuf>,
) -> Router {
    setup_test_env();

    let relay = Arc::new(UpscaleRelay::new(
        job_api,
        RelayConfig {
            poll_interval: TEST_POLL_INTERVAL,
            output_dir,
        },
    ));
    let media_storage = Arc::new(MediaStorage::new(storage_config));

    server::router(Environment::Development, relay, media_storage)
}

pub async fn send_multipart(
    router: &Router,
    route: &str,
    field: &str,
    filename: &str,
    content: &[u8],
) -> Result<Response, Box<dyn std::error::Error>> {
    let request = Request::builder()
        .uri(route)
        .method("POST")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, filename, content)))?;

    let response = router.clone().oneshot(request).await?;
    Ok(response)
}
