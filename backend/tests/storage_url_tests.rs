mod common;

use common::*;

use http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use upscale_relay::job_api::mock::MockJobApi;

fn idle_job_api() -> MockJobApi {
    MockJobApi::new("unused", Vec::new())
}

#[tokio::test]
async fn test_upload_url_is_presigned_for_upload_key() {
    let setup = TestSetup::with_storage(idle_job_api(), local_storage_config(None));

    let response = setup
        .send_get_request("/api/upload-url?filename=clip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["key"], "uploads/clip.mp4");

    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:9000/media/uploads/clip.mp4?"));
    assert!(url.contains("X-Amz-Expires=3600"));
    assert!(url.contains("X-Amz-Signature="));
}

#[tokio::test]
async fn test_upload_url_accepts_explicit_content_type() {
    let setup = TestSetup::with_storage(idle_job_api(), local_storage_config(None));

    let response = setup
        .send_get_request("/api/upload-url?filename=clip.webm&content_type=video%2Fwebm")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["key"], "uploads/clip.webm");
}

#[tokio::test]
async fn test_upload_url_requires_filename() {
    let setup = TestSetup::with_storage(idle_job_api(), local_storage_config(None));

    let missing = setup
        .send_get_request("/api/upload-url")
        .await
        .expect("Failed to send request");
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_response_body(missing).await["error"]["code"],
        "invalid_query"
    );

    let empty = setup
        .send_get_request("/api/upload-url?filename=")
        .await
        .expect("Failed to send request");
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        parse_response_body(empty).await["error"]["code"],
        "validation_error"
    );
}

#[tokio::test]
async fn test_upload_url_without_credentials() {
    let setup = TestSetup::new(idle_job_api());

    let response = setup
        .send_get_request("/api/upload-url?filename=clip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["detail"], "Could not generate upload URL");
    assert_eq!(body["error"]["code"], "upload_url_unavailable");
}

#[tokio::test]
async fn test_download_url_uses_public_base() {
    let setup = TestSetup::with_storage(
        idle_job_api(),
        local_storage_config(Some("https://media.example.com/")),
    );

    let response = setup
        .send_get_request("/api/download-url?file_key=uploads/clip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await,
        json!({ "url": "https://media.example.com/uploads/clip.mp4" })
    );
}

#[tokio::test]
async fn test_download_url_public_base_without_credentials() {
    let mut config = local_storage_config(Some("https://media.example.com"));
    config.secret_access_key = None;
    let setup = TestSetup::with_storage(idle_job_api(), config);

    let response = setup
        .send_get_request("/api/download-url?file_key=%2Fuploads%2Fclip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        parse_response_body(response).await["url"],
        "https://media.example.com/uploads/clip.mp4"
    );
}

#[tokio::test]
async fn test_download_url_is_presigned_without_public_base() {
    let setup = TestSetup::with_storage(idle_job_api(), local_storage_config(None));

    let response = setup
        .send_get_request("/api/download-url?file_key=uploads/clip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("http://localhost:9000/media/uploads/clip.mp4?"));
    assert!(url.contains("X-Amz-Expires=3600"));
}

#[tokio::test]
async fn test_download_url_without_storage_is_not_found() {
    let setup = TestSetup::new(idle_job_api());

    let response = setup
        .send_get_request("/api/download-url?file_key=uploads/clip.mp4")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = parse_response_body(response).await;
    assert_eq!(body["detail"], "File not found or error generating URL");
    assert_eq!(body["error"]["code"], "file_not_found");
}

#[tokio::test]
async fn test_download_url_requires_file_key() {
    let setup = TestSetup::with_storage(idle_job_api(), local_storage_config(None));

    let response = setup
        .send_get_request("/api/download-url?file_key=")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
