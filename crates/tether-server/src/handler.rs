//! Mounting handlers on endpoints.
//!
//! [`safe_get`] pairs an [`Endpoint`] with an async handler and produces a
//! [`Route`]. The route owns everything needed to serve the endpoint: it
//! decodes the query with the endpoint's schema, calls the handler with the
//! typed input and serialises the output as JSON.
//!
//! # Example
//!
//! ```rust
//! use tether_core::{endpoint, query_params, Str};
//! use tether_server::{safe_get, HandlerError};
//!
//! query_params! {
//!     pub struct Name {
//!         pub first: Str,
//!         pub last: Str,
//!     }
//! }
//!
//! let greet = endpoint().fragment("greet").query_params::<Name, String>();
//!
//! let route = safe_get(&greet, |name: Name| async move {
//!     Ok::<_, HandlerError>(format!("Hello, {} {}", name.first, name.last))
//! });
//! assert_eq!(route.path(), "/greet");
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use tether_core::{CodecError, Endpoint, FieldSchema, RawQuery};

/// Boxed future returned by a type-erased handler.
pub type BoxedHandlerResult = Pin<Box<dyn Future<Output = Result<Bytes, InvokeError>> + Send>>;

/// A type-erased handler over raw queries.
pub type ErasedHandler = Arc<dyn Fn(RawQuery) -> BoxedHandlerResult + Send + Sync>;

/// An error returned by application handler code.
///
/// Carries the HTTP status and a machine-readable code for the error
/// envelope.
///
/// # Example
///
/// ```rust
/// use tether_server::HandlerError;
/// use http::StatusCode;
///
/// let err = HandlerError::not_found("no such user");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(err.code(), "NOT_FOUND");
/// ```
#[derive(Error, Debug)]
pub enum HandlerError {
    /// An error with an explicit status and code.
    #[error("{message}")]
    Status {
        /// HTTP status to answer with.
        status: StatusCode,
        /// Machine-readable error code.
        code: String,
        /// Human-readable message.
        message: String,
    },

    /// The handler output could not be serialised.
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other error; answered with 500.
    #[error("handler error: {0}")]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Creates an error with an explicit status and code.
    pub fn new(status: StatusCode, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a `400 Bad Request` error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    /// Creates a `404 Not Found` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Creates a `500 Internal Server Error`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    /// Wraps an arbitrary error.
    pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Custom(Box::new(err))
    }

    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Serialization(_) | Self::Custom(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Status { code, .. } => code,
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Custom(_) => "INTERNAL_ERROR",
        }
    }
}

/// Why a route invocation did not produce a response body.
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The query did not decode against the endpoint schema.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The handler failed.
    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// A handler mounted at an endpoint path.
///
/// Created by [`safe_get`] and registered with
/// [`ServerBuilder::route`](crate::ServerBuilder::route).
#[derive(Clone)]
pub struct Route {
    path: String,
    schema: FieldSchema,
    handler: ErasedHandler,
}

impl Route {
    /// Returns the absolute path this route answers on.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query schema of the mounted endpoint.
    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Decodes `raw`, runs the handler and serialises its output.
    pub fn invoke(&self, raw: RawQuery) -> BoxedHandlerResult {
        (self.handler)(raw)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("schema", &format_args!("{}", self.schema))
            .finish_non_exhaustive()
    }
}

/// Mounts `handler` as the GET handler for `endpoint`.
///
/// The handler receives the decoded input record and returns the output,
/// which is written as a JSON body. Queries that fail to decode never reach
/// the handler.
///
/// # Example
///
/// ```
/// use serde::Serialize;
/// use tether_core::{endpoint, query_params, Str};
/// use tether_server::{safe_get, HandlerError};
///
/// query_params! {
///     pub struct Name {
///         pub first: Str,
///         pub last: Str,
///     }
/// }
///
/// #[derive(Serialize)]
/// struct FullName {
///     first: String,
///     last: String,
///     full: String,
/// }
///
/// let foo = endpoint().fragment("foo").query_params::<Name, FullName>();
/// let route = safe_get(&foo, |name: Name| async move {
///     Ok::<_, HandlerError>(FullName {
///         full: format!("{} {}", name.first, name.last),
///         first: name.first,
///         last: name.last,
///     })
/// });
/// assert_eq!(route.path(), "/foo");
/// ```
///
/// The handler must produce the endpoint's output type. Returning any other
/// shape, even one with a subset of the fields, does not compile:
///
/// ```compile_fail
/// use serde::Serialize;
/// use tether_core::{endpoint, query_params, Str};
/// use tether_server::{safe_get, HandlerError};
///
/// query_params! {
///     pub struct Name {
///         pub first: Str,
///         pub last: Str,
///     }
/// }
///
/// #[derive(Serialize)]
/// struct FullName {
///     first: String,
///     last: String,
///     full: String,
/// }
///
/// #[derive(Serialize)]
/// struct Partial {
///     first: String,
///     last: String,
/// }
///
/// let foo = endpoint().fragment("foo").query_params::<Name, FullName>();
/// let route = safe_get(&foo, |name: Name| async move {
///     Ok::<_, HandlerError>(Partial {
///         first: name.first,
///         last: name.last,
///     })
/// });
/// ```
pub fn safe_get<I, O, F, Fut>(endpoint: &Endpoint<I, O>, handler: F) -> Route
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
{
    let decoder = endpoint.clone();
    let handler = Arc::new(handler);
    let erased: ErasedHandler = Arc::new(move |raw: RawQuery| -> BoxedHandlerResult {
        let handler = Arc::clone(&handler);
        let input = decoder.decode_query(&raw);
        Box::pin(async move {
            let output = handler(input?).await?;
            let bytes = serde_json::to_vec(&output).map_err(HandlerError::from)?;
            Ok::<_, InvokeError>(Bytes::from(bytes))
        })
    });

    Route {
        path: endpoint.path(),
        schema: endpoint.schema().clone(),
        handler: erased,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tether_core::{endpoint, query_params, DecodeError, Num, Opt, Str};

    query_params! {
        #[derive(Debug)]
        struct Name {
            first: Str,
            last: Str,
        }
    }

    query_params! {
        #[derive(Debug)]
        struct Measure {
            x: Num,
            y: Opt<Num>,
        }
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct FullName {
        first: String,
        last: String,
        full: String,
    }

    fn greet_route() -> Route {
        let ep = endpoint().fragment("foo").query_params::<Name, FullName>();
        safe_get(&ep, |name: Name| async move {
            Ok(FullName {
                full: format!("{} {}", name.first, name.last),
                first: name.first,
                last: name.last,
            })
        })
    }

    #[tokio::test]
    async fn test_invoke_decodes_and_serializes() {
        let route = greet_route();
        let body = route
            .invoke(RawQuery::parse("first=First&last=Last"))
            .await
            .unwrap();

        let output: FullName = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            output,
            FullName {
                first: "First".to_string(),
                last: "Last".to_string(),
                full: "First Last".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_invoke_decode_failure_skips_handler() {
        let ep = endpoint().fragment("m").query_params::<Measure, f64>();
        let route = safe_get(&ep, |_: Measure| async move {
            Err::<f64, _>(HandlerError::internal("must not run"))
        });

        let err = route.invoke(RawQuery::parse("x=abc")).await.unwrap_err();
        match err {
            InvokeError::Codec(CodecError::Decode(e)) => {
                assert_eq!(e, DecodeError::invalid_number("x", "abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invoke_handler_error() {
        let ep = endpoint().fragment("m").query_params::<Measure, f64>();
        let route = safe_get(&ep, |m: Measure| async move {
            m.y.ok_or_else(|| HandlerError::bad_request("y is required here"))
        });

        let err = route.invoke(RawQuery::parse("x=1")).await.unwrap_err();
        match err {
            InvokeError::Handler(e) => {
                assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
                assert_eq!(e.to_string(), "y is required here");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_route_metadata() {
        let route = greet_route();
        assert_eq!(route.path(), "/foo");
        assert_eq!(route.schema().to_string(), "{first: string, last: string}");
        assert!(format!("{route:?}").contains("/foo"));
    }

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(HandlerError::bad_request("x").code(), "BAD_REQUEST");
        assert_eq!(
            HandlerError::internal("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let custom = HandlerError::custom(io);
        assert_eq!(custom.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(custom.code(), "INTERNAL_ERROR");
        assert!(custom.to_string().contains("disk on fire"));
    }
}
