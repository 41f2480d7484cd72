//! Error types for collaborator API calls.

/// Result type alias for collaborator API calls.
pub type Result<T> = std::result::Result<T, Error>;

/// Collaborator API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level HTTP error (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status code.
    #[error("Server returned {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the error envelope (or the raw body).
        message: String,
    },

    /// Server answered 2xx but flagged the envelope as unsuccessful.
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    UrlError(#[from] url::ParseError),
}

impl Error {
    /// Creates a status error from a code and message.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }
}
