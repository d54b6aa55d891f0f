//! Error handling for the ZelHash stratum client
//!
//! One error type covers the whole crate. Most variants are recoverable and are
//! handled where they occur (reconnect, drop-and-continue); only
//! [`Error::AuthorizationFailed`] is meant to stop the process.

use thiserror::Error;

/// Result type alias for mining client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the mining client
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Stratum protocol errors (malformed or unexpected messages)
    #[error("Stratum error: {message}")]
    Stratum { message: String },

    /// Network errors (resolve, connect, peer close)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Target validation errors
    #[error("Invalid target: {message}")]
    InvalidTarget { message: String },

    /// Job or header validation errors
    #[error("Invalid work: {message}")]
    InvalidWork { message: String },

    /// Bit packing / solution encoding errors
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// The pool refused the worker credentials
    #[error("Authorization failed for worker {user}")]
    AuthorizationFailed { user: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a stratum protocol error
    pub fn stratum(message: impl Into<String>) -> Self {
        Self::Stratum {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a target error
    pub fn invalid_target(message: impl Into<String>) -> Self {
        Self::InvalidTarget {
            message: message.into(),
        }
    }

    /// Create a work error
    pub fn invalid_work(message: impl Into<String>) -> Self {
        Self::InvalidWork {
            message: message.into(),
        }
    }

    /// Create an encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn authorization_failed(user: impl Into<String>) -> Self {
        Self::AuthorizationFailed { user: user.into() }
    }

    /// Check if the error is cured by reconnecting
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Network { .. })
    }

    /// Check if the error must terminate the client
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::AuthorizationFailed { .. })
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Yaml(_) => "yaml",
            Error::Config { .. } => "config",
            Error::Stratum { .. } => "stratum",
            Error::Network { .. } => "network",
            Error::InvalidTarget { .. } => "target",
            Error::InvalidWork { .. } => "work",
            Error::Encoding { .. } => "encoding",
            Error::AuthorizationFailed { .. } => "authorization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("missing server");
        assert_eq!(err.to_string(), "Configuration error: missing server");

        let err = Error::authorization_failed("t1abc.rig0");
        assert_eq!(err.to_string(), "Authorization failed for worker t1abc.rig0");
    }

    #[test]
    fn test_error_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));

        let json_err = serde_json::from_str::<String>("invalid").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::network("connection refused").is_retryable());
        assert!(!Error::network("connection refused").is_fatal());
        assert!(!Error::stratum("bad json").is_retryable());

        let auth = Error::authorization_failed("bob");
        assert!(auth.is_fatal());
        assert!(!auth.is_retryable());
        assert_eq!(auth.category(), "authorization");
    }
}
