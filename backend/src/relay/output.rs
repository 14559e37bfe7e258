//! Interpretation of a completed job's output

use std::borrow::Cow;

use schemars::JsonSchema;
use serde::Serialize;
use serde_json::Value;

/// Fields that may carry the base64 video, in lookup order
const VIDEO_FIELDS: [&str; 3] = ["video", "output_video", "base64"];
/// Payloads up to this length are never treated as a video
const MIN_ENCODED_LEN: usize = 100;
/// A data-URI header is only stripped when its comma falls within this prefix
const HEADER_SCAN_CHARS: usize = 50;

/// Result of a relayed upscale job
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpscaleResponse {
    /// Video embedded as `data:video/mp4;base64,...`
    DataUri {
        /// Data URI of the upscaled video
        url: String,
    },
    /// Video hosted elsewhere
    Url {
        /// Link returned by the job
        url: String,
    },
    /// Output passed through uninterpreted
    Raw {
        /// Job output as returned by RunPod
        output: Value,
    },
}

/// Where the video sits in a job's output
#[derive(Debug, PartialEq, Eq)]
pub enum ResolvedOutput<'a> {
    /// Base64 payload, data-URI header already stripped
    Encoded(&'a str),
    /// Direct link to the video
    Url(&'a str),
    /// Nothing recognisable, return the output as-is
    Raw,
}

fn non_empty_str<'a>(value: Option<&'a Value>) -> Option<&'a str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Locates the video in a completed job's output
#[must_use]
pub fn resolve(output: &Value) -> ResolvedOutput<'_> {
    let payload = match output {
        Value::String(payload) => Some(payload.as_str()),
        Value::Object(fields) => {
            let video = VIDEO_FIELDS
                .iter()
                .find_map(|field| non_empty_str(fields.get(*field)));

            if video.is_none() {
                if let Some(url) = non_empty_str(fields.get("url")) {
                    return ResolvedOutput::Url(url);
                }
            }
            video
        }
        _ => None,
    };

    match payload {
        Some(payload) if payload.chars().count() > MIN_ENCODED_LEN => {
            ResolvedOutput::Encoded(strip_data_uri_header(payload))
        }
        _ => ResolvedOutput::Raw,
    }
}

/// Drops a `data:...;base64,` prefix when one is embedded at the start of the payload
fn strip_data_uri_header(payload: &str) -> &str {
    if payload.chars().take(HEADER_SCAN_CHARS).any(|c| c == ',') {
        payload.split(',').nth(1).unwrap_or_default()
    } else {
        payload
    }
}

/// Removes ASCII whitespace from a base64 payload, e.g. line wrapping every 76 chars
#[must_use]
pub fn compact_base64(payload: &str) -> Cow<'_, str> {
    if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(
            payload
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect(),
        )
    } else {
        Cow::Borrowed(payload)
    }
}

/// Whether a completed job's output counts as missing
#[must_use]
pub fn is_empty_output(output: &Value) -> bool {
    match output {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Wraps a base64 payload into an mp4 data URI
#[must_use]
pub fn mp4_data_uri(payload: &str) -> String {
    format!("data:video/mp4;base64,{payload}")
}
