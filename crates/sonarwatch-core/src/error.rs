//! Error types for the watchdog
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for watchdog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the watchdog
#[derive(Error, Debug)]
pub enum Error {
    /// Endpoint directory errors (address registry, service discovery)
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Routing subsystem errors (device/redirection fetches, reset call)
    #[error("Routing subsystem error: {0}")]
    Routing(String),

    /// Service control errors (query or start command failed)
    #[error("Service control error: {0}")]
    Service(String),

    /// The audio service is not installed on this host.
    ///
    /// This is the only error allowed to terminate the process.
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors (registry file reads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a discovery error
    pub fn discovery(msg: impl Into<String>) -> Self {
        Self::Discovery(msg.into())
    }

    /// Create a routing subsystem error
    pub fn routing(msg: impl Into<String>) -> Self {
        Self::Routing(msg.into())
    }

    /// Create a service control error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create a "service not found" error
    pub fn service_not_found(name: impl Into<String>) -> Self {
        Self::ServiceNotFound(name.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error must terminate the process.
    ///
    /// Everything except a missing audio service is transient: it is logged,
    /// the current tick is skipped, and the loop keeps running.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ServiceNotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
