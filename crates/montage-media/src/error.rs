//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::command::Tool;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("{0} not found in PATH")]
    ToolNotFound(Tool),

    #[error("{tool} command failed: {message}")]
    ToolFailed {
        tool: Tool,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Invalid probe output: {0}")]
    InvalidProbeOutput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a tool failure error.
    pub fn tool_failed(
        tool: Tool,
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::ToolFailed {
            tool,
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid probe output error.
    pub fn invalid_probe(message: impl Into<String>) -> Self {
        Self::InvalidProbeOutput(message.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Captured stderr of a failed tool run, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::ToolFailed { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}
