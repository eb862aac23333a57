//! Endpoint declarations.
//!
//! An [`Endpoint`] is a path fragment plus a query schema, typed by its input
//! and output records. The same value is handed to the server to mount a
//! handler and to the client to issue requests, which is what keeps the two
//! sides agreeing on the wire format.
//!
//! Endpoints are assembled with a builder whose stages are encoded in its
//! type: a query schema can only be attached once a path has been set.
//!
//! ```
//! use tether_core::{endpoint, query_params, Str};
//!
//! query_params! {
//!     pub struct Name {
//!         pub first: Str,
//!         pub last: Str,
//!     }
//! }
//!
//! let greet = endpoint().fragment("greet").query_params::<Name, String>();
//! assert_eq!(greet.path(), "/greet");
//! ```
//!
//! Attaching a schema before a path does not compile:
//!
//! ```compile_fail
//! use tether_core::{endpoint, NoParams};
//!
//! let broken = endpoint().query_params::<NoParams, String>();
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::codec::{decode_typed, encode_typed};
use crate::error::CodecError;
use crate::params::QueryParams;
use crate::raw::RawQuery;
use crate::schema::FieldSchema;

/// Builder stage: no path fragment yet.
#[derive(Debug, Clone, Copy)]
pub enum Unrouted {}

/// Builder stage: a path fragment is set.
#[derive(Debug, Clone, Copy)]
pub enum Routed {}

/// Starts a new endpoint declaration.
#[must_use]
pub fn endpoint() -> EndpointBuilder<Unrouted> {
    EndpointBuilder {
        segments: Vec::new(),
        stage: PhantomData,
    }
}

/// Builder for [`Endpoint`]. See [`endpoint`].
#[derive(Debug, Clone)]
#[must_use = "an endpoint builder does nothing until a query schema is attached"]
pub struct EndpointBuilder<S> {
    segments: Vec<String>,
    stage: PhantomData<S>,
}

impl<S> EndpointBuilder<S> {
    /// Appends a path fragment.
    ///
    /// Leading and trailing slashes are ignored and empty segments are
    /// skipped, so `fragment("a/b")` and `fragment("a").fragment("/b/")`
    /// produce the same path.
    ///
    /// A fragment with no segments at all, such as `""` or `"/"`, is
    /// accepted and leaves the path unchanged. On its own it mounts the
    /// endpoint at the root path `/`.
    ///
    /// Segments are stored unescaped. Spaces, `?`, `#`, `%` and non-ASCII
    /// text are allowed; the client percent-encodes them on the wire and the
    /// server decodes the request path before matching.
    pub fn fragment(self, segment: impl AsRef<str>) -> EndpointBuilder<Routed> {
        let mut segments = self.segments;
        segments.extend(
            segment
                .as_ref()
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
        );
        EndpointBuilder {
            segments,
            stage: PhantomData,
        }
    }
}

impl EndpointBuilder<Routed> {
    /// Attaches the schema declared by `I` and fixes the output type.
    pub fn query_params<I: QueryParams, O>(self) -> Endpoint<I, O> {
        Endpoint::new(self.segments.join("/"), I::schema())
    }

    /// Attaches an explicit schema.
    ///
    /// `I` must serialise to, and deserialise from, a record whose fields
    /// match `schema`.
    pub fn query_schema<I, O>(self, schema: FieldSchema) -> Endpoint<I, O> {
        Endpoint::new(self.segments.join("/"), schema)
    }
}

struct EndpointInner {
    fragment: String,
    schema: FieldSchema,
}

/// A declared endpoint with input record `I` and output `O`.
///
/// Cloning is cheap; clones share the same declaration.
pub struct Endpoint<I, O> {
    inner: Arc<EndpointInner>,
    types: PhantomData<fn(I) -> O>,
}

impl<I, O> Endpoint<I, O> {
    fn new(fragment: String, schema: FieldSchema) -> Self {
        Self {
            inner: Arc::new(EndpointInner { fragment, schema }),
            types: PhantomData,
        }
    }

    /// Returns the path fragment without a leading slash, e.g. `"a/b"`.
    #[must_use]
    pub fn fragment(&self) -> &str {
        &self.inner.fragment
    }

    /// Returns the absolute request path, e.g. `"/a/b"`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.inner.fragment)
    }

    /// Iterates over the unescaped path segments. The root endpoint has none.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.fragment.split('/').filter(|s| !s.is_empty())
    }

    /// Returns the query schema.
    #[must_use]
    pub fn schema(&self) -> &FieldSchema {
        &self.inner.schema
    }
}

impl<I: DeserializeOwned, O> Endpoint<I, O> {
    /// Decodes a raw query into the input record.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] naming the first field that failed, or
    /// [`CodecError::Shape`] if the decoded values do not fit `I`.
    pub fn decode_query(&self, raw: &RawQuery) -> Result<I, CodecError> {
        decode_typed(&self.inner.schema, raw)
    }
}

impl<I: Serialize, O> Endpoint<I, O> {
    /// Encodes an input record into a raw query.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError`] if `input` does not conform to the schema.
    pub fn encode_query(&self, input: &I) -> Result<RawQuery, CodecError> {
        encode_typed(&self.inner.schema, input)
    }

    /// Encodes an input record as a query component, without the `?`.
    ///
    /// # Errors
    ///
    /// Same as [`Endpoint::encode_query`].
    pub fn query_string(&self, input: &I) -> Result<String, CodecError> {
        Ok(self.encode_query(input)?.to_query_string())
    }
}

impl<I, O> Clone for Endpoint<I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Endpoint<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("path", &self.path())
            .field("schema", &format_args!("{}", self.inner.schema))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{NoParams, Opt, Str};
    use crate::type_rep::TypeRep;
    use serde::Deserialize;

    crate::query_params! {
        #[derive(Debug, PartialEq)]
        struct Optional {
            x: Opt<Str>,
            y: Str,
        }
    }

    #[test]
    fn test_fragment_path() {
        let ep = endpoint().fragment("foo").query_params::<NoParams, String>();
        assert_eq!(ep.fragment(), "foo");
        assert_eq!(ep.path(), "/foo");
    }

    #[test]
    fn test_fragment_normalises_slashes() {
        let a = endpoint().fragment("/api/").fragment("users").query_params::<NoParams, ()>();
        let b = endpoint().fragment("api/users").query_params::<NoParams, ()>();
        assert_eq!(a.path(), "/api/users");
        assert_eq!(a.path(), b.path());
    }

    #[test]
    fn test_empty_fragment_is_root() {
        for fragment in ["", "/", "//"] {
            let ep = endpoint().fragment(fragment).query_params::<NoParams, ()>();
            assert_eq!(ep.fragment(), "");
            assert_eq!(ep.path(), "/");
            assert_eq!(ep.segments().count(), 0);
        }

        let nested = endpoint().fragment("").fragment("foo").query_params::<NoParams, ()>();
        assert_eq!(nested.path(), "/foo");
    }

    #[test]
    fn test_segments_are_unescaped() {
        let ep = endpoint()
            .fragment("hello world")
            .fragment("what?/caf\u{e9}")
            .query_params::<NoParams, ()>();
        assert_eq!(ep.segments().collect::<Vec<_>>(), ["hello world", "what?", "caf\u{e9}"]);
        assert_eq!(ep.path(), "/hello world/what?/caf\u{e9}");
    }

    #[test]
    fn test_decode_and_encode_through_endpoint() {
        let ep = endpoint().fragment("foo").query_params::<Optional, String>();

        let input = ep.decode_query(&RawQuery::parse("y=Y")).unwrap();
        assert_eq!(
            input,
            Optional {
                x: None,
                y: "Y".to_string()
            }
        );
        assert_eq!(ep.query_string(&input).unwrap(), "y=Y");
    }

    #[test]
    fn test_decode_error_names_field() {
        let ep = endpoint().fragment("foo").query_params::<Optional, String>();
        let err = ep.decode_query(&RawQuery::parse("x=X")).unwrap_err();
        assert_eq!(err.as_decode().map(|e| e.field()), Some("y"));
    }

    #[test]
    fn test_explicit_schema() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Search {
            q: String,
            page: Option<u32>,
        }

        let schema = FieldSchema::new()
            .field("q", TypeRep::string())
            .field("page", TypeRep::option(TypeRep::number()));
        let ep = endpoint().fragment("search").query_schema::<Search, Vec<String>>(schema);

        let search = ep.decode_query(&RawQuery::parse("q=rust&page=2")).unwrap();
        assert_eq!(
            search,
            Search {
                q: "rust".to_string(),
                page: Some(2)
            }
        );
    }

    #[test]
    fn test_clone_shares_declaration() {
        let ep = endpoint().fragment("foo").query_params::<Optional, String>();
        let copy = ep.clone();
        assert!(Arc::ptr_eq(&ep.inner, &copy.inner));
        assert_eq!(format!("{copy:?}"), "Endpoint { path: \"/foo\", schema: {x: option<string>, y: string} }");
    }
}
