//! Prints which relay settings are present without revealing their values

use anyhow::Result;
use upscale_relay::{
    media_storage::{MediaStorage, StorageConfig},
    types::Environment,
};

const KEYS: [&str; 6] = [
    "R2_ENDPOINT_URL",
    "R2_BUCKET_NAME",
    "R2_PUBLIC_URL",
    "R2_ACCESS_KEY_ID",
    "R2_SECRET_ACCESS_KEY",
    "RUNPOD_API_KEY",
];

#[tokio::main]
async fn main() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => println!("Loaded {}", path.display()),
        Err(_) => println!("No .env file found, using process environment"),
    }

    println!("Checking Env:");
    for key in KEYS {
        let value = std::env::var(key).unwrap_or_default();
        let found = if value.is_empty() { "Missing" } else { "Found" };
        println!("{key}: {found} - Length: {}", value.len());
    }

    println!("\nTesting S3 client init...");
    let config = StorageConfig::from_environment(&Environment::from_env());
    let storage = MediaStorage::new(config);
    if storage.is_enabled() {
        println!("S3 client initialized.");
    } else {
        println!("S3 client disabled: R2 credentials are incomplete.");
    }

    Ok(())
}
