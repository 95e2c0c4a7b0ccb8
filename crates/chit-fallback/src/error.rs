//! Error types for the fallback collaborator layer.

use thiserror::Error;

/// Errors that can occur while talking to the fallback parsing service.
#[derive(Error, Debug)]
pub enum FallbackError {
    /// Failed to construct the client.
    #[error("failed to build client: {0}")]
    Client(String),

    /// Transport-level failure (connection, TLS, body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("service returned status {0}")]
    Status(u16),

    /// The response body did not match the expected shape.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The bounded wait elapsed before a response arrived.
    #[error("request timed out after {0}ms")]
    Timeout(u64),
}
