//! Error types for the trading API crate.

use thiserror::Error;

/// Result type alias for trading API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors that can occur while talking to the trading platform API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP client error (connect failure, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx response from the API
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// 2xx response whose envelope carried `success: false`
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// 2xx success envelope without the expected payload
    #[error("Response missing expected data")]
    MissingData,

    /// Authentication error (missing or invalid token)
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl ApiError {
    /// Create an API error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a rejected-envelope error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected(message.into())
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Whether the failure is transient and the operation may be retried on a
    /// later trigger. Callers keep serving whatever state they already hold.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Api { .. } => true,
            Self::Rejected(_) => true,
            Self::Json(_) | Self::MissingData | Self::Auth(_) => false,
        }
    }
}
