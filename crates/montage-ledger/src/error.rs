//! Ledger error types.

use thiserror::Error;

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while recording videos.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Ledger not configured: {0}")]
    NotConfigured(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Ledger unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn not_configured(msg: impl Into<String>) -> Self {
        Self::NotConfigured(msg.into())
    }

    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed(msg.into())
    }

    /// Map an HTTP error status to an error.
    pub fn from_http_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => Self::Unauthorized(message),
            429 | 500..=599 => Self::Unavailable { status, message },
            _ => Self::RequestFailed { status, message },
        }
    }

    /// HTTP status associated with this error, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::RequestFailed { status, .. } | Self::Unavailable { status, .. } => Some(*status),
            Self::Unauthorized(_) => Some(401),
            _ => None,
        }
    }

    /// Check if error is retryable.
    ///
    /// Network errors only qualify when the request never reached the
    /// ledger. A timeout may follow a committed insert.
    pub fn is_retryable(&self) -> bool {
        match self {
            LedgerError::Network(e) => e.is_connect(),
            LedgerError::Unavailable { .. } | LedgerError::ConnectionFailed(_) => true,
            _ => false,
        }
    }
}
