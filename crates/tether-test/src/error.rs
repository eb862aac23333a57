//! Test error types.

use thiserror::Error;

use tether_server::ServerError;

/// Errors that can occur while driving a test server.
#[derive(Debug, Error)]
pub enum TestError {
    /// The ephemeral listener could not be bound.
    #[error("Failed to bind test listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The server task failed.
    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    /// The server task panicked or was cancelled.
    #[error("Server task ended abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The request could not be sent.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body reading failed.
    #[error("Body read error: {0}")]
    BodyRead(String),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
