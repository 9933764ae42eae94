//! Client error types

use http::StatusCode;
use serde_json::Value;
use shopfront_core::StorageError;
use thiserror::Error;

use super::transport::TransportError;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server could not be reached at all
    #[error("Cannot reach server, verify it is running")]
    Connection(#[source] TransportError),

    /// The server rejected the session; local session state has been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Server returned a non-success status
    #[error("{message}")]
    RequestFailed { status: u16, message: String },

    /// Unclassified transport failure
    #[error(transparent)]
    Transport(TransportError),

    /// A response body was not valid JSON or did not match the expected shape
    #[error("Invalid response body: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// A request body could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Persisting session state failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Build a `RequestFailed` error from a status and the parsed error body.
    ///
    /// Uses the body's `message` field when it is a string, otherwise a
    /// generic `HTTP error <status>` text.
    pub fn from_status(status: StatusCode, body: Option<&Value>) -> Self {
        let message = body
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map_or_else(|| format!("HTTP error {}", status.as_u16()), str::to_string);

        Self::RequestFailed {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status carried by the error, if the server answered
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } => Some(*status),
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }

    /// Whether the caller should send the user back to the login screen
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    /// Whether the server was unreachable
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}
