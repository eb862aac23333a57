//! Client error types.

use reqwest::StatusCode;
use thiserror::Error;

use tether_core::CodecError;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`Client`](crate::Client).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL is malformed or cannot carry endpoint paths.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The input could not be encoded as a query.
    #[error("failed to encode query: {0}")]
    Codec(#[from] CodecError),

    /// The request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("server returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Response body, as text.
        body: String,
    },

    /// The response body is not valid JSON for the output type.
    #[error("failed to decode response body: {0}")]
    Body(#[source] serde_json::Error),
}

impl ClientError {
    pub(crate) fn invalid_base_url(url: &str, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns the response status for [`ClientError::Status`].
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    /// Returns `true` if the request timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_core::DecodeError;

    #[test]
    fn test_status_accessor() {
        let err = ClientError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "{}".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "server returned 400 Bad Request: {}");
    }

    #[test]
    fn test_codec_conversion() {
        let err: ClientError = CodecError::from(DecodeError::missing_field("y")).into();
        assert!(matches!(err, ClientError::Codec(_)));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_invalid_base_url_display() {
        let err = ClientError::invalid_base_url("ftp:/x", "unsupported scheme");
        assert_eq!(err.to_string(), "invalid base URL 'ftp:/x': unsupported scheme");
    }
}
