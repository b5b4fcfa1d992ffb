//! Error types and handling for Heliotrope
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting. The portal-facing
//! variants (`Transport`, `Api`, `AuthExpired`, `NoRecord`) carry the
//! failure classification the refresh engine drives its retry policy from.

use thiserror::Error;

/// Result type alias for Heliotrope operations
pub type Result<T> = std::result::Result<T, HeliotropeError>;

/// Main error type for Heliotrope
#[derive(Debug, Error)]
pub enum HeliotropeError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Non-200 status, network failure, or malformed response body
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Portal returned a non-zero `err` with an ordinary description
    #[error("API error: {message}")]
    Api { message: String },

    /// Portal rejected the session token (`ERR_NO_AUTH`)
    #[error("Authentication expired: {message}")]
    AuthExpired { message: String },

    /// Portal has no data for the query yet (`ERR_NO_RECORD`).
    /// Callers coerce this to a zero-value success; it never leaves the
    /// API client boundary.
    #[error("No record available")]
    NoRecord,

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Generic errors with context
    #[error("Error: {message}")]
    Generic { message: String },
}

impl HeliotropeError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        HeliotropeError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        HeliotropeError::Transport {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        HeliotropeError::Api {
            message: message.into(),
        }
    }

    /// Create a new auth-expired error
    pub fn auth_expired<S: Into<String>>(message: S) -> Self {
        HeliotropeError::AuthExpired {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        HeliotropeError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        HeliotropeError::Io {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn generic<S: Into<String>>(message: S) -> Self {
        HeliotropeError::Generic {
            message: message.into(),
        }
    }

    /// Whether this failure should trigger the forced re-authentication path
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, HeliotropeError::AuthExpired { .. })
    }
}

impl From<std::io::Error> for HeliotropeError {
    fn from(err: std::io::Error) -> Self {
        HeliotropeError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for HeliotropeError {
    fn from(err: serde_yaml::Error) -> Self {
        HeliotropeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for HeliotropeError {
    fn from(err: serde_json::Error) -> Self {
        HeliotropeError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for HeliotropeError {
    fn from(err: reqwest::Error) -> Self {
        HeliotropeError::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = HeliotropeError::config("test config error");
        assert!(matches!(err, HeliotropeError::Config { .. }));

        let err = HeliotropeError::transport("test transport error");
        assert!(matches!(err, HeliotropeError::Transport { .. }));

        let err = HeliotropeError::validation("field", "test validation error");
        assert!(matches!(err, HeliotropeError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = HeliotropeError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = HeliotropeError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");
    }

    #[test]
    fn test_auth_expired_classification() {
        assert!(HeliotropeError::auth_expired("ERR_NO_AUTH").is_auth_expired());
        assert!(!HeliotropeError::api("ERR_SOMETHING_ELSE").is_auth_expired());
        assert!(!HeliotropeError::NoRecord.is_auth_expired());
    }
}
