//! Relay error types with HTTP status code mapping.
//!
//! [`RelayError`] is the central error type for the relay. Over the socket
//! protocol every variant degrades to a silent no-op (logged as a
//! diagnostic event); the administrative API maps each variant to an HTTP
//! status code and a structured JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: channel is required"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// Relay error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status      |
/// |-----------|-------------------|------------------|
/// | 1000–1999 | Malformed input   | 400 Bad Request  |
/// | 2000–2999 | Not found         | 404 Not Found    |
/// | 3000–3999 | Authorization     | 403 Forbidden    |
/// | 5000–5999 | Transport         | 502 Bad Gateway  |
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    /// No channel with the given name exists.
    #[error("channel not found: {0}")]
    ChannelNotFound(String),

    /// No connected client with the given identifier exists.
    #[error("client not found: {0}")]
    ClientNotFound(String),

    /// The client lacks the privilege required for the action.
    #[error("unauthorized: {0}")]
    Unauthorized(&'static str),

    /// A socket command is missing a required parameter.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// A socket command keyword is not recognized.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// Writing to or reading from a connection failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Administrative API request without a valid admin credential.
    #[error("forbidden")]
    Forbidden,

    /// Administrative API request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::MalformedCommand(_) => 1002,
            Self::UnknownCommand(_) => 1003,
            Self::ChannelNotFound(_) => 2001,
            Self::ClientNotFound(_) => 2002,
            Self::Forbidden => 3001,
            Self::Unauthorized(_) => 3002,
            Self::Transport(_) => 5001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::MalformedCommand(_) | Self::UnknownCommand(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ChannelNotFound(_) | Self::ClientNotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden | Self::Unauthorized(_) => StatusCode::FORBIDDEN,
            Self::Transport(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short machine-readable reason, used as a structured field in
    /// diagnostic events.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::ChannelNotFound(_) => "channel_not_found",
            Self::ClientNotFound(_) => "client_not_found",
            Self::Unauthorized(_) => "unauthorized",
            Self::MalformedCommand(_) => "malformed",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Transport(_) => "transport",
            Self::Forbidden => "forbidden",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        // Admin credential mismatches carry no body.
        if matches!(self, Self::Forbidden) {
            return status.into_response();
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
