//! Error types for Taskdeck
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Taskdeck operations
///
/// Covers configuration loading, API envelope failures, transport and
/// authentication failures, and token persistence.
#[derive(Error, Debug)]
pub enum TaskdeckError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Application-level error reported by the API (`error: true` in the
    /// envelope). Displays the server message verbatim.
    #[error("{0}")]
    Api(String),

    /// Authentication errors (e.g., 401 Unauthorized)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Non-success HTTP status whose body was not an API envelope
    #[error("Request failed with status code {status}")]
    Status {
        /// The HTTP status code returned by the server
        status: u16,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors (network failures, timeouts)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Token storage errors
    #[error("Storage error: {0}")]
    Storage(String),
}

impl TaskdeckError {
    /// Returns `true` for failures the transport already handled globally
    /// by clearing the session.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }
}

/// Result type alias for Taskdeck operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Renders the message stored in a store's error slot.
///
/// Uses the root [`TaskdeckError`] when one is present so that API messages
/// are recorded exactly as the server sent them, including the message of a
/// rejected (`401`) request.
pub(crate) fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<TaskdeckError>() {
        Some(TaskdeckError::Authentication(message)) => message.clone(),
        Some(inner) => inner.to_string(),
        None => err.to_string(),
    }
}

/// Returns `true` when `err` wraps a [`TaskdeckError::Authentication`].
pub(crate) fn is_authentication_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<TaskdeckError>()
        .map_or(false, TaskdeckError::is_authentication)
}
