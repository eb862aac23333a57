//! # Tether Core
//!
//! Typed endpoint contracts and the query-parameter codec shared by the
//! Tether server and client.
//!
//! This crate provides:
//!
//! - [`TypeRep`] - Runtime description of one parameter (`string`, `number`, `option<T>`)
//! - [`FieldSchema`] - Ordered, named set of parameters
//! - [`RawQuery`] - The uninterpreted key/value view of a URL query
//! - [`decode_all`] / [`encode_all`] - The codec between raw queries and records
//! - [`QueryParams`] and [`query_params!`] - Typed records backed by a schema
//! - [`endpoint`] / [`Endpoint`] - Path plus schema, typed by input and output
//!
//! ## Example
//!
//! ```
//! use tether_core::{endpoint, query_params, Opt, RawQuery, Str};
//!
//! query_params! {
//!     #[derive(Debug, PartialEq)]
//!     pub struct Greeting {
//!         pub x: Opt<Str>,
//!         pub y: Str,
//!     }
//! }
//!
//! let foo = endpoint().fragment("foo").query_params::<Greeting, String>();
//!
//! // Client side: absent optionals are omitted.
//! let query = foo.query_string(&Greeting { x: None, y: "Y".into() }).unwrap();
//! assert_eq!(query, "y=Y");
//!
//! // Server side: the same endpoint decodes the same query.
//! let input = foo.decode_query(&RawQuery::parse(&query)).unwrap();
//! assert_eq!(input, Greeting { x: None, y: "Y".into() });
//! ```
//!
//! Field types are checked at compile time. A record field cannot hold a
//! value that its marker does not describe:
//!
//! ```compile_fail
//! use tether_core::{query_params, Str};
//!
//! query_params! {
//!     pub struct Name {
//!         pub first: Str,
//!     }
//! }
//!
//! let name = Name { first: 47.0 };
//! ```
//!
//! Nor can a required field be left out:
//!
//! ```compile_fail
//! use tether_core::{query_params, Opt, Str};
//!
//! query_params! {
//!     pub struct Greeting {
//!         pub x: Opt<Str>,
//!         pub y: Str,
//!     }
//! }
//!
//! let greeting = Greeting { x: None };
//! ```

#![doc(html_root_url = "https://docs.rs/tether-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod endpoint;
mod error;
pub mod params;
mod raw;
mod schema;
mod type_rep;

pub use codec::{decode_all, decode_typed, encode_all, encode_typed, encode_value, Record};
pub use endpoint::{endpoint, Endpoint, EndpointBuilder, Routed, Unrouted};
pub use error::{CodecError, DecodeError, DecodeResult, EncodeError, SchemaError};
pub use params::{Describe, NoParams, Num, Opt, QueryParams, Str};
pub use raw::{RawQuery, RawValue};
pub use schema::FieldSchema;
pub use type_rep::{Kind, TypeRep};
