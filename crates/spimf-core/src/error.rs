//! Error type shared by every backend-facing operation.

/// Message shown for any transport-level failure.
pub const CONNECTION_FAILED: &str = "Connection failed";

/// Categories of client errors for consistent display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid input, caught before any request
    Validation,
    /// Backend answered with `success: false`
    Backend,
    /// Non-2xx status, network failure, timeout or malformed response
    Transport,
}

/// Failure of a single user action.
///
/// `Display` yields the text meant for the user. For `Transport` the
/// underlying cause is kept in `detail` for logs only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Backend(String),

    #[error("Connection failed")]
    Transport { detail: String },
}

impl ClientError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a backend error; a blank message falls back to a generic one.
    pub fn backend(message: Option<String>) -> Self {
        match message {
            Some(msg) if !msg.trim().is_empty() => Self::Backend(msg),
            _ => Self::Backend("Request failed".to_string()),
        }
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport {
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Validation(_) => ErrorKind::Validation,
            ClientError::Backend(_) => ErrorKind::Backend,
            ClientError::Transport { .. } => ErrorKind::Transport,
        }
    }
}

/// Result type for backend-facing operations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;
