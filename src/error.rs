//! Error types for the Ecko client
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Ecko client operations
///
/// This enum encompasses all possible errors that can occur while talking
/// to the backend: configuration problems, authentication rejections,
/// transport or server failures, and responses the client cannot decode.
#[derive(Error, Debug)]
pub enum EckoError {
    /// Configuration-related errors (missing or placeholder backend URL)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Authentication errors (no secret held, or server returned 401/403)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Backend returned a non-success status other than an auth rejection
    #[error("Backend error: {0}")]
    Api(String),

    /// Response body could not be decoded into the shape the endpoint requires
    #[error("Malformed response from {endpoint}: {detail}")]
    MalformedResponse {
        /// Endpoint the response came from
        endpoint: String,
        /// What was wrong with the body
        detail: String,
    },

    /// Session store errors (flag file could not be read or written)
    #[error("Session store error: {0}")]
    Store(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Ecko operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
