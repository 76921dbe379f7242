//! Service client error types.

use reqwest::StatusCode;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Service unavailable ({status}): {body}")]
    ServiceUnavailable { status: u16, body: String },

    #[error("Request rejected ({status}): {body}")]
    RequestFailed { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            ServiceError::ServiceUnavailable {
                status: status.as_u16(),
                body,
            }
        } else {
            ServiceError::RequestFailed {
                status: status.as_u16(),
                body,
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::ServiceUnavailable { .. } | ServiceError::Network(_)
        )
    }
}
