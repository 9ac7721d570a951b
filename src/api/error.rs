//! Error types for the transport adapter.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for transport operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the backend API.
///
/// Every variant renders to a single human-readable string through
/// `Display`; callers surface that string and nothing else.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request exceeded its per-call timeout.
    #[error("Request timed out")]
    Timeout,

    /// Connection-level failure (DNS, refused, reset).
    #[error("Network error: {0}")]
    Network(reqwest::Error),

    /// The response body could not be decoded as the expected type.
    #[error("Invalid response body: {0}")]
    Decode(reqwest::Error),

    /// HTTP client configuration error.
    #[error("HTTP client error: {0}")]
    Client(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The backend answered with a non-success status. `message` is the
    /// normalized error body (see [`normalize_error_body`]).
    #[error("{message}")]
    Api {
        /// HTTP status returned by the backend.
        status: StatusCode,
        /// Normalized human-readable message.
        message: String,
    },
}

impl ApiError {
    /// Classify a `reqwest` failure into the timeout / network / decode
    /// taxonomy.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err)
        } else {
            Self::Network(err)
        }
    }

    /// Whether this is a backend NotFound response.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// Normalize a failure response body into a single descriptive string.
///
/// Precedence:
/// 1. an object body with a string `message` field;
/// 2. a plain string body (JSON string or raw text);
/// 3. a validation body with a `detail` list of `{msg, ...}` entries,
///    joined with `"; "`;
/// 4. a `detail` string;
/// 5. a generic message carrying the HTTP status.
pub(crate) fn normalize_error_body(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("message").and_then(Value::as_str) {
            return message.to_string();
        }
        if let Value::String(text) = &value {
            return text.clone();
        }
        if let Some(detail) = value.get("detail") {
            if let Some(entries) = detail.as_array() {
                let msgs: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if !msgs.is_empty() {
                    return msgs.join("; ");
                }
            }
            if let Some(text) = detail.as_str() {
                return text.to_string();
            }
        }
    } else if !body.trim().is_empty() {
        return body.to_string();
    }
    format!("Request failed with status {status}")
}
