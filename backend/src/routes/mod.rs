/// API documentation routes
pub mod docs;
mod health;
/// Presigned upload and download URLs
pub mod storage_urls;
/// Video upscaling
pub mod upscale;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};

/// Creates the router with all handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .merge(docs::handler())
        .api_route("/health", get(health::handler))
        .api_route("/api/upscale", post(upscale::upscale_video))
        .api_route("/api/upload-url", get(storage_urls::get_upload_url))
        .api_route("/api/download-url", get(storage_urls::get_download_url))
}
