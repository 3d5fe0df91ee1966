//! Error types and handling for Spotova
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.

use thiserror::Error;

/// Result type alias for Spotova operations
pub type Result<T> = std::result::Result<T, SpotovaError>;

/// Main error type for Spotova
#[derive(Debug, Error)]
pub enum SpotovaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Connection failures reaching a price endpoint
    #[error("Network error: {message}")]
    Network { message: String },

    /// Price endpoint answered with an error status
    #[error("API error: {message}")]
    Api { message: String },

    /// Price endpoint answered with something other than a price document
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Timeout errors
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// Both price endpoints failed during a refresh
    #[error("Update failed: {message}")]
    UpdateFailed { message: String },

    /// Another instance holds the instance lock
    #[error("Already running: {message}")]
    AlreadyRunning { message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl SpotovaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        SpotovaError::Config {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        SpotovaError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        SpotovaError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        SpotovaError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        SpotovaError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        SpotovaError::Api {
            message: message.into(),
        }
    }

    /// Create a new malformed payload error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        SpotovaError::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        SpotovaError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new update-failed error
    pub fn update_failed<S: Into<String>>(message: S) -> Self {
        SpotovaError::UpdateFailed {
            message: message.into(),
        }
    }

    /// Create a new already-running error
    pub fn already_running<S: Into<String>>(message: S) -> Self {
        SpotovaError::AlreadyRunning {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        SpotovaError::Generic {
            message: message.into(),
        }
    }

    /// Whether this error came from reaching or parsing a price endpoint
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            SpotovaError::Network { .. }
                | SpotovaError::Timeout { .. }
                | SpotovaError::Api { .. }
                | SpotovaError::MalformedPayload { .. }
        )
    }
}

impl From<std::io::Error> for SpotovaError {
    fn from(err: std::io::Error) -> Self {
        SpotovaError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for SpotovaError {
    fn from(err: serde_yaml::Error) -> Self {
        SpotovaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SpotovaError {
    fn from(err: serde_json::Error) -> Self {
        SpotovaError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for SpotovaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SpotovaError::timeout(err.to_string())
        } else if err.is_decode() {
            SpotovaError::malformed(err.to_string())
        } else {
            SpotovaError::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = SpotovaError::config("test config error");
        assert!(matches!(err, SpotovaError::Config { .. }));

        let err = SpotovaError::malformed("not an object");
        assert!(matches!(err, SpotovaError::MalformedPayload { .. }));

        let err = SpotovaError::validation("field", "test validation error");
        assert!(matches!(err, SpotovaError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = SpotovaError::config("test error");
        assert_eq!(format!("{}", err), "Configuration error: test error");

        let err = SpotovaError::validation("test_field", "invalid value");
        assert_eq!(
            format!("{}", err),
            "Validation error: test_field - invalid value"
        );
    }

    #[test]
    fn test_fetch_failure_classification() {
        assert!(SpotovaError::timeout("slow").is_fetch_failure());
        assert!(SpotovaError::network("refused").is_fetch_failure());
        assert!(SpotovaError::api("HTTP 503").is_fetch_failure());
        assert!(SpotovaError::malformed("list").is_fetch_failure());
        assert!(!SpotovaError::config("x").is_fetch_failure());
        assert!(!SpotovaError::update_failed("both").is_fetch_failure());
    }
}
