//! API error taxonomy
//!
//! Every failed call resolves to an `ApiError`. HTTP failures keep the status
//! code and the response body so callers can inspect both; `kind()` folds
//! them into the categories the UI distinguishes.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// User-facing error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response reached the client (connection failure, timeout)
    Network,
    /// The session was rejected (401)
    Auth,
    /// Field-level validation failure (400)
    Validation,
    /// The record does not exist (404)
    NotFound,
    /// Rate limited (429) or payload/export too large (413)
    Limit,
    /// Anything else the server reported, or an unreadable response
    Server,
}

/// Parsed (best-effort) error response body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorBody {
    /// Human-readable message from `message` or `detail`
    pub message: String,
    /// Machine-readable code, when the API sends one
    pub error_code: Option<String>,
    /// Structured details, when the API sends them
    pub details: Option<Value>,
    /// The raw response body
    pub raw: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    details: Option<Value>,
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBody {
    /// Parses a response body, accepting both the API envelope
    /// (`{success, message, error_code, details}`) and a bare `{detail}`
    pub fn parse(raw: &str) -> Self {
        let envelope = match serde_json::from_str::<ErrorEnvelope>(raw) {
            Ok(envelope) => envelope,
            Err(_) => {
                return Self {
                    message: raw.trim().to_string(),
                    raw: raw.to_string(),
                    ..Self::default()
                }
            }
        };

        let message = envelope
            .message
            .filter(|m| !m.is_empty())
            .or_else(|| envelope.detail.as_ref().and_then(|d| d.as_str().map(String::from)))
            .unwrap_or_default();

        // A list-valued `detail` carries per-field errors
        let details = envelope
            .details
            .or_else(|| envelope.detail.filter(|d| d.is_array()));

        Self {
            message,
            error_code: envelope.error_code,
            details,
            raw: raw.to_string(),
        }
    }

    /// Extracts field-keyed validation messages
    ///
    /// Understands an object of `field -> message` or `field -> [messages]`,
    /// and a list of `{loc: [.., field], msg}` entries.
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        let mut errors = BTreeMap::new();

        match &self.details {
            Some(Value::Object(map)) => {
                for (field, value) in map {
                    let message = match value {
                        Value::String(s) => Some(s.clone()),
                        Value::Array(items) => {
                            items.iter().find_map(|i| i.as_str().map(String::from))
                        }
                        _ => None,
                    };
                    if let Some(message) = message {
                        errors.insert(field.clone(), message);
                    }
                }
            }
            Some(Value::Array(items)) => {
                for item in items {
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|f| f.as_str());
                    let message = item.get("msg").and_then(|m| m.as_str());
                    if let (Some(field), Some(message)) = (field, message) {
                        errors.insert(field.to_string(), message.to_string());
                    }
                }
            }
            _ => {}
        }

        errors
    }
}

/// Errors returned by the HTTP client and the services built on it
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Session rejected (401)")]
    Unauthorized,

    #[error("Validation failed (400): {}", .0.message)]
    Validation(ErrorBody),

    #[error("Not found (404): {}", .0.message)]
    NotFound(ErrorBody),

    #[error("Payload too large (413): {}", .0.message)]
    PayloadTooLarge(ErrorBody),

    #[error("Rate limited (429): {}", .0.message)]
    RateLimited(ErrorBody),

    #[error("Server error ({status}): {}", .body.message)]
    Server { status: u16, body: ErrorBody },

    #[error("Unexpected status {status}: {}", .body.message)]
    Status { status: u16, body: ErrorBody },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid request path: {0}")]
    InvalidPath(#[from] url::ParseError),
}

impl ApiError {
    /// Classifies a non-success HTTP status with its body
    ///
    /// The session teardown for a 401 happens in the client, not here.
    pub fn from_status(status: u16, raw_body: &str) -> Self {
        let body = ErrorBody::parse(raw_body);
        match status {
            400 => Self::Validation(body),
            401 => Self::Unauthorized,
            404 => Self::NotFound(body),
            413 => Self::PayloadTooLarge(body),
            429 => Self::RateLimited(body),
            500..=599 => Self::Server { status, body },
            _ => Self::Status { status, body },
        }
    }

    /// Classifies a transport failure
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }

    /// HTTP status code, when a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::Validation(_) => Some(400),
            Self::NotFound(_) => Some(404),
            Self::PayloadTooLarge(_) => Some(413),
            Self::RateLimited(_) => Some(429),
            Self::Server { status, .. } | Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body, when a response was received
    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Validation(body)
            | Self::NotFound(body)
            | Self::PayloadTooLarge(body)
            | Self::RateLimited(body)
            | Self::Server { body, .. }
            | Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Timeout => ErrorKind::Network,
            Self::Unauthorized => ErrorKind::Auth,
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PayloadTooLarge(_) | Self::RateLimited(_) => ErrorKind::Limit,
            Self::Server { .. } | Self::Status { .. } | Self::Decode(_) | Self::InvalidPath(_) => {
                ErrorKind::Server
            }
        }
    }

    /// Field errors carried by a 400 response (empty otherwise)
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match self {
            Self::Validation(body) => body.field_errors(),
            _ => BTreeMap::new(),
        }
    }

    /// Whether re-issuing the same request could succeed
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::Auth | ErrorKind::Validation | ErrorKind::NotFound
        )
    }

    /// A 401: the session is gone and the caller must not retry
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
