use std::sync::Arc;

use tracing::warn;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};
use upscale_relay::{
    job_api::{RunpodClient, RunpodConfig},
    media_storage::{MediaStorage, StorageConfig},
    relay::{RelayConfig, UpscaleRelay},
    server,
    types::Environment,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON logs for staging/production (Datadog), human-readable for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let runpod_config = RunpodConfig::from_environment(&environment);
    if runpod_config.api_key.is_none() {
        warn!("RUNPOD_API_KEY is not set, upscale requests will fail");
    }

    let job_api = Arc::new(RunpodClient::new(runpod_config)?);
    let relay = Arc::new(UpscaleRelay::new(
        job_api,
        RelayConfig::from_environment(&environment),
    ));

    let media_storage = Arc::new(MediaStorage::new(StorageConfig::from_environment(
        &environment,
    )));

    server::start(environment, relay, media_storage).await
}
