//! Error types for the fetch client.

use std::fmt;

/// Errors surfaced by the fetch client.
///
/// Only setup problems are reported through this type: invalid
/// configuration, unusable transport construction, and reactor startup
/// failures. Per-transfer transport failures (DNS, connect, TLS, timeout)
/// are captured as an absent body on the execution result instead, and HTTP
/// error statuses are ordinary results.
#[derive(Debug, Clone)]
pub enum FetchError {
    /// Invalid configuration (zero timeout, unusable option combination).
    Config(String),
    /// Invalid URL provided.
    InvalidUrl(String),
    /// Transport client or request could not be constructed.
    Client(String),
    /// The I/O reactor backing an execution could not be started.
    Runtime(String),
    /// JSON serialization/deserialization error.
    Json(String),
    /// Response body absent or unusable for the requested accessor.
    InvalidBody(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
            Self::InvalidUrl(msg) => write!(f, "Invalid URL: {msg}"),
            Self::Client(msg) => write!(f, "Transport client error: {msg}"),
            Self::Runtime(msg) => write!(f, "Reactor error: {msg}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
            Self::InvalidBody(msg) => write!(f, "Invalid response body: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<url::ParseError> for FetchError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(err.to_string())
    }
}

/// A specialized Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;
