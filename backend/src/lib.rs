//! Upscale Relay service
//!
//! Relays uploaded videos to a RunPod upscaling endpoint and issues presigned
//! URLs for an R2 media bucket.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// RunPod job API client
pub mod job_api;

/// Presigned URLs for the media bucket
pub mod media_storage;

/// Upload-and-upscale relay
pub mod relay;

/// HTTP routes
pub mod routes;

/// Router assembly and server startup
pub mod server;

/// Configuration, errors and extractors
pub mod types;
