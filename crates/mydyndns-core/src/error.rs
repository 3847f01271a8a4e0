//! Error types for the MyDynDNS client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for MyDynDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the MyDynDNS client
#[derive(Error, Debug)]
pub enum Error {
    /// The request could not be completed (connect, TLS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The service answered with a non-success status code
    #[error("request to {url} responded with unexpected status code {status} ({reason})")]
    UnexpectedStatus {
        /// Requested URL
        url: String,
        /// HTTP status code received
        status: u16,
        /// Canonical reason phrase for the status code
        reason: String,
    },

    /// The response body was not a valid IP address
    #[error("invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// The response body exceeded the byte budget for an IP address
    #[error("response body exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Maximum accepted body size
        limit: usize,
    },

    /// The operation was abandoned because shutdown was requested
    #[error("operation cancelled")]
    Cancelled,

    /// The initial alias update failed, so the agent never started
    #[error("failed to start agent: {0}")]
    Startup(#[source] Box<Error>),

    /// Shutdown was requested before the agent finished starting
    #[error("shutdown requested before agent start: {0}")]
    StartupCancelled(#[source] Box<Error>),

    /// Configuration errors
    #[error("{0}")]
    Config(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML serialization/deserialization errors
    #[error("TOML error: {0}")]
    Toml(String),

    /// YAML serialization/deserialization errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(text: impl Into<String>) -> Self {
        Self::InvalidAddress(text.into())
    }

    /// Create an unexpected status error
    pub fn unexpected_status(url: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Whether this error stems from a shutdown request rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::StartupCancelled(_))
    }

    /// The error that caused a startup failure, if this is one
    pub fn startup_cause(&self) -> Option<&Error> {
        match self {
            Self::Startup(cause) | Self::StartupCancelled(cause) => Some(cause),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Toml(err.to_string())
    }
}
