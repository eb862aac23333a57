//! # Tether Server
//!
//! Serves Tether endpoints over HTTP.
//!
//! - [`safe_get`] - Mount an async handler on an [`Endpoint`](tether_core::Endpoint)
//! - [`Server`] - hyper/tokio HTTP/1.1 server with graceful shutdown
//! - [`RouteTable`] - Exact-path routing, `GET` only
//!
//! Query decoding uses the endpoint's own schema, so a handler only ever sees
//! inputs the client side of the same endpoint could have produced. Decode
//! failures are answered with `400` and never reach the handler.
//!
//! ## Example
//!
//! ```rust,no_run
//! use tether_core::{endpoint, query_params, Str};
//! use tether_server::{safe_get, HandlerError, Server};
//!
//! query_params! {
//!     pub struct Name {
//!         pub first: Str,
//!         pub last: Str,
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let greet = endpoint().fragment("greet").query_params::<Name, String>();
//!
//!     Server::builder()
//!         .http_addr("127.0.0.1:8080")
//!         .route(safe_get(&greet, |name: Name| async move {
//!             Ok::<_, HandlerError>(format!("Hello, {} {}", name.first, name.last))
//!         }))
//!         .build()
//!         .run()
//!         .await?;
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/tether-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod shutdown;

pub use config::{ServerConfig, ServerConfigBuilder};
pub use handler::{safe_get, HandlerError, InvokeError, Route};
pub use response::{ErrorBody, ErrorEnvelope, HttpResponse, ResponseBody};
pub use router::{RouteMatch, RouteTable};
pub use server::{Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
