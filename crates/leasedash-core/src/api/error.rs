use std::collections::HashMap;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::auth::StorageError;

/// Validation messages keyed by field name.
pub type FieldErrors = HashMap<String, Vec<String>>;

/// Fallback message when a failed response carries no `message`.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";
pub const BETA_ACCESS_MESSAGE: &str =
    "Beta access required. Your account has not been granted access yet.";
pub const RATE_LIMITED_MESSAGE: &str =
    "Too many login attempts. Please wait a moment and try again.";
pub const SERVER_ERROR_MESSAGE: &str = "The server encountered an error. Please try again later.";

/// Maximum length for raw response bodies quoted in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Error payload shared by every endpoint: `{ message?, errors? }`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
    pub errors: Option<FieldErrors>,
}

impl ErrorBody {
    /// Parse an error body, treating anything unparsable as empty.
    pub(crate) fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }
}

/// A non-success HTTP response, normalized.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} (HTTP {status})")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
    pub field_errors: Option<FieldErrors>,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>, field_errors: Option<FieldErrors>) -> Self {
        Self {
            status,
            message: message.into(),
            field_errors,
        }
    }

    /// Build the error for a generic request failure.
    pub(crate) fn from_response(status: StatusCode, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        Self::new(
            status.as_u16(),
            parsed.message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            parsed.errors,
        )
    }

    /// Build the error for a failed login, substituting a user-facing
    /// message when the server did not supply one.
    pub(crate) fn from_login_response(status: StatusCode, body: &str) -> Self {
        let parsed = ErrorBody::parse(body);
        let message = parsed
            .message
            .unwrap_or_else(|| login_message_for_status(status));
        Self::new(status.as_u16(), message, parsed.errors)
    }

    /// First validation message for a field, if any.
    pub fn first_field_error(&self, field: &str) -> Option<&str> {
        self.field_errors
            .as_ref()
            .and_then(|errors| errors.get(field))
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// A 401 means the credential is missing or expired.
    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED.as_u16()
    }
}

fn login_message_for_status(status: StatusCode) -> String {
    match status.as_u16() {
        401 => INVALID_CREDENTIALS_MESSAGE.to_string(),
        403 => BETA_ACCESS_MESSAGE.to_string(),
        429 => RATE_LIMITED_MESSAGE.to_string(),
        500..=u16::MAX => SERVER_ERROR_MESSAGE.to_string(),
        _ => format!(
            "HTTP {}: {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status")
        ),
    }
}

/// Everything an `ApiClient` call can fail with.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// No HTTP status was obtained (DNS, connect, TLS, timeout).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

impl ClientError {
    /// Build an `InvalidResponse` from a decode failure, quoting a bounded
    /// slice of the offending body.
    pub(crate) fn invalid_response(err: serde_json::Error, body: &str) -> Self {
        ClientError::InvalidResponse(format!("{} in body: {}", err, truncate_body(body)))
    }

    /// The normalized HTTP error, if this was one.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Truncate a response body to avoid logging excessive data
fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        body.to_string()
    } else {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
