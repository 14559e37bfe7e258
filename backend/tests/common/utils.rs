use axum::response::Response;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;

pub const MULTIPART_BOUNDARY: &str = "upscale-relay-test-boundary";

/// Builds a multipart body with a single file field
pub fn multipart_body(field: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{MULTIPART_BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: video/mp4\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Deterministic fake video bytes and their base64 encoding
pub fn fake_upscaled_video(size: usize) -> (Vec<u8>, String) {
    let video: Vec<u8> = (0..=255u8).cycle().take(size).collect();
    let encoded = STANDARD.encode(&video);
    (video, encoded)
}

/// Decodes the payload of a `data:video/mp4;base64,` URI
pub fn decode_data_uri(url: &str) -> Vec<u8> {
    let payload = url
        .strip_prefix("data:video/mp4;base64,")
        .expect("not an mp4 data URI");
    STANDARD.decode(payload).unwrap()
}
