//! Errors from the TripMate REST client and their user-facing messages.

use tripmate_core::error::CoreError;

pub const NOT_FOUND_MESSAGE: &str = "The requested item was not found or you do not have access.";
pub const AUTH_REQUIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
pub const NETWORK_MESSAGE: &str =
    "Unable to reach the TripMate server. Check your connection and try again.";

/// Errors from the REST client layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The backend answered with a non-2xx status.
    #[error("API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body, usually a JSON error payload.
        body: String,
    },

    /// A 2xx response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The request was rejected locally before being sent.
    #[error(transparent)]
    Invalid(#[from] CoreError),
}

/// Coarse classification used to pick a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Unauthorized,
    Rejected,
    Network,
    Unexpected,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Invalid(_) => ErrorKind::Validation,
            ApiError::Status { status: 404, .. } => ErrorKind::NotFound,
            ApiError::Status { status: 401, .. } => ErrorKind::Unauthorized,
            ApiError::Status { .. } => ErrorKind::Rejected,
            ApiError::Network(_) => ErrorKind::Network,
            ApiError::Decode(_) => ErrorKind::Unexpected,
        }
    }

    /// HTTP status of a rejected request, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message to show the user, with `fallback` used when the backend
    /// gave nothing more specific.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Invalid(core) => core.user_message(),
            ApiError::Status { status: 404, .. } => NOT_FOUND_MESSAGE.to_string(),
            ApiError::Status { status: 401, .. } => AUTH_REQUIRED_MESSAGE.to_string(),
            ApiError::Status { body, .. } => {
                payload_message(body).unwrap_or_else(|| fallback.to_string())
            }
            ApiError::Network(_) => NETWORK_MESSAGE.to_string(),
            ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

/// Pull a readable message out of a backend error payload.
///
/// Tries `message`, then `error`, then `detail`; otherwise joins every
/// string found in the payload's field errors with spaces, the way the
/// backend reports per-field validation failures.
pub fn payload_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    for key in ["message", "error", "detail"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            if !msg.is_empty() {
                return Some(msg.to_string());
            }
        }
    }

    let mut parts = Vec::new();
    collect_strings(&value, &mut parts);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

fn collect_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) if !s.is_empty() => out.push(s.clone()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
