//! Error types for the write path.

use thiserror::Error;

/// Result type for write path operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur on the write path.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Write attempted without credentials, or credentials are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The API answered with a non-200 status.
    #[error("remote rejected write (HTTP {status}): {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, or the default message.
        message: String,
    },

    /// The API could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The tuples could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RemoteError {
    /// Returns true for a configuration problem.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if the caller may reasonably try again later.
    ///
    /// The writer itself never retries.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(RemoteError::Transport("connection refused".into()).is_retryable());
        assert!(RemoteError::Rejected {
            status: 503,
            message: "busy".into()
        }
        .is_retryable());
        assert!(!RemoteError::Rejected {
            status: 400,
            message: "bad field".into()
        }
        .is_retryable());
        assert!(!RemoteError::Configuration("no token".into()).is_retryable());
    }

    #[test]
    fn error_display() {
        let err = RemoteError::Rejected {
            status: 422,
            message: "bad field".into(),
        };
        assert_eq!(err.to_string(), "remote rejected write (HTTP 422): bad field");
    }
}
