//! Client error types.

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-zero business code or an HTTP error response.
    #[error("API error (code {code}): {message}")]
    Api {
        /// Business error code from the response envelope. 0 means success.
        code: i64,
        /// Error message from server.
        message: String,
        /// Request log id, when the server reported one.
        log_id: Option<String>,
    },

    /// Authentication failed or no token could be produced.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Event stream failed: transport error, malformed framing, or an
    /// `error`-tagged event from the server.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Pagination aborted because the server-supplied cursor stopped advancing.
    #[error("Pagination error: {0}")]
    Pagination(String),
}

impl Error {
    /// Business error code, for API errors.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Request log id attached to an API error, if any.
    pub fn log_id(&self) -> Option<&str> {
        match self {
            Error::Api { log_id, .. } => log_id.as_deref(),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the server outside the usual envelope,
/// e.g. when a streaming request is rejected outright.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorBody {
    pub code: i64,
    pub msg: String,
}

impl ErrorBody {
    pub(crate) fn into_error(self, log_id: Option<String>) -> Error {
        Error::Api {
            code: self.code,
            message: self.msg,
            log_id,
        }
    }
}
