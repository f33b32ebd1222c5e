//! Mapping of failed API responses onto request errors.
//!
//! The console API reports failures as `{"error": "..."}`. When the body
//! carries no usable message, the error falls back to one naming the HTTP
//! status so the user always sees something readable.

use serde::Deserialize;

use crate::error::DeskError;

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Build a request error from a non-success status and its raw body.
pub fn error_from_body(status: reqwest::StatusCode, body: &str) -> DeskError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback_message(status));

    DeskError::request(Some(status.as_u16()), message)
}

fn fallback_message(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Request failed with status {} {}", status.as_u16(), reason),
        None => format!("Request failed with status {}", status.as_u16()),
    }
}
