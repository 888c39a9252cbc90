//! Error types for the ticketdesk API client.
//!
//! # Design
//! Every failure of a call lands in one `ApiError` value. The four kinds a
//! caller usually branches on are `Timeout`, `HttpStatus` (non-2xx),
//! `MalformedResponse` (2xx with a body that is not JSON) and `Application`
//! (2xx JSON carrying an `error` marker). The remaining variants cover
//! failures before a status line exists (network, URL, payload, config).
//! None of them are fatal; retrying is left to the caller.

use std::time::Duration;

/// Errors returned by `ApiClient` and the service call-sites.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The timer elapsed before the transport settled.
    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },

    /// The server answered with a non-2xx status. `body` is the raw text.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// A 2xx response whose body could not be parsed or decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A 2xx response whose JSON payload carries an `error` marker.
    #[error("{message}")]
    Application {
        message: String,
        code: Option<String>,
    },

    /// Connection-level failure: DNS, refused, reset, unreadable body.
    #[error("network error: {0}")]
    Network(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// The HTTP status attached to this failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Timeout { .. })
    }
}
