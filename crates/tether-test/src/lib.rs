//! # Tether Test
//!
//! Utilities for exercising Tether endpoints end to end.
//!
//! - [`TestServer`] - A real server on an ephemeral `127.0.0.1` port
//! - [`TestResponse`] - A fully-read response with assertion helpers
//! - [`Recorder`] - Captures what a handler was called with
//!
//! ## Example
//!
//! ```rust,no_run
//! use tether_core::{endpoint, query_params, Str};
//! use tether_server::{safe_get, HandlerError};
//! use tether_test::{Recorder, TestServer};
//!
//! query_params! {
//!     #[derive(Debug, Clone)]
//!     pub struct Name {
//!         pub first: Str,
//!     }
//! }
//!
//! # async fn demo() -> Result<(), tether_test::TestError> {
//! let foo = endpoint().fragment("foo").query_params::<Name, String>();
//! let calls = Recorder::new();
//! let seen = calls.clone();
//!
//! let server = TestServer::spawn([safe_get(&foo, move |name: Name| {
//!     seen.record(name.clone());
//!     async move { Ok::<_, HandlerError>(name.first) }
//! })])
//! .await?;
//!
//! server.get("/foo?first=").await?.assert_success();
//! assert_eq!(calls.last().map(|n| n.first), Some(String::new()));
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/tether-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod recorder;
mod response;
mod server;

pub use error::TestError;
pub use recorder::Recorder;
pub use response::TestResponse;
pub use server::TestServer;
