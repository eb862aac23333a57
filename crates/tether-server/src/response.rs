//! Response construction.
//!
//! Every non-2xx answer carries the same JSON envelope:
//!
//! ```json
//! {"error": {"code": "MISSING_FIELD", "message": "...", "field": "last"}}
//! ```
//!
//! `field` is only present for query decode failures.

use bytes::Bytes;
use http::{header, Response, StatusCode};
use http_body_util::Full;
use serde::Serialize;

use tether_core::{CodecError, DecodeError};

use crate::handler::HandlerError;

/// Type alias for HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// The body of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorBody,
}

/// Details of an error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// The query parameter that failed to decode, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorEnvelope {
    /// Creates an envelope without a field.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                field: None,
            },
        }
    }

    /// Creates the envelope for a query decode failure.
    #[must_use]
    pub fn from_decode(err: &DecodeError) -> Self {
        Self {
            error: ErrorBody {
                code: err.code().to_string(),
                message: err.to_string(),
                field: Some(err.field().to_string()),
            },
        }
    }
}

/// Builds a `200 OK` response around a serialised JSON body.
pub(crate) fn json_ok(body: Bytes) -> HttpResponse {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(body))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Builds an error response with the standard envelope.
pub(crate) fn error_response(status: StatusCode, envelope: &ErrorEnvelope) -> HttpResponse {
    let body = serde_json::to_vec(envelope).unwrap_or_default();

    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

/// `400` for a query that did not decode.
pub(crate) fn codec_error(err: &CodecError) -> HttpResponse {
    let envelope = match err {
        CodecError::Decode(e) => ErrorEnvelope::from_decode(e),
        CodecError::Shape(e) => ErrorEnvelope::new("INVALID_QUERY", e.to_string()),
        CodecError::Encode(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorEnvelope::new("ENCODE_ERROR", e.to_string()),
            );
        }
    };
    error_response(StatusCode::BAD_REQUEST, &envelope)
}

/// The handler's own status and code.
pub(crate) fn handler_error(err: &HandlerError) -> HttpResponse {
    error_response(
        err.status_code(),
        &ErrorEnvelope::new(err.code(), err.to_string()),
    )
}

/// `404` for a path with no route.
pub(crate) fn not_found(path: &str) -> HttpResponse {
    error_response(
        StatusCode::NOT_FOUND,
        &ErrorEnvelope::new("NOT_FOUND", format!("no endpoint at {path}")),
    )
}

/// `405` for a known path requested with a method other than `GET`.
pub(crate) fn method_not_allowed(method: &http::Method) -> HttpResponse {
    let mut response = error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorEnvelope::new(
            "METHOD_NOT_ALLOWED",
            format!("method {method} is not allowed, use GET"),
        ),
    );
    response
        .headers_mut()
        .insert(header::ALLOW, header::HeaderValue::from_static("GET"));
    response
}

/// `504` for a request that exceeded its timeout.
pub(crate) fn timeout() -> HttpResponse {
    error_response(
        StatusCode::GATEWAY_TIMEOUT,
        &ErrorEnvelope::new("HANDLER_TIMEOUT", "handler execution timed out"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn envelope(response: HttpResponse) -> ErrorEnvelope {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_decode_error_carries_field() {
        let err = CodecError::Decode(DecodeError::missing_field("last"));
        let response = codec_error(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = envelope(response).await;
        assert_eq!(body.error.code, "MISSING_FIELD");
        assert_eq!(body.error.field.as_deref(), Some("last"));
    }

    #[tokio::test]
    async fn test_handler_error_keeps_status() {
        let response = handler_error(&HandlerError::not_found("gone"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = envelope(response).await;
        assert_eq!(body, ErrorEnvelope::new("NOT_FOUND", "gone"));
    }

    #[test]
    fn test_field_omitted_when_absent() {
        let json = serde_json::to_value(ErrorEnvelope::new("X", "y")).unwrap();
        assert_eq!(json, serde_json::json!({"error": {"code": "X", "message": "y"}}));
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = method_not_allowed(&http::Method::POST);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "GET");
    }

    #[test]
    fn test_json_ok_content_type() {
        let response = json_ok(Bytes::from_static(b"\"hi\""));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
    }
}
