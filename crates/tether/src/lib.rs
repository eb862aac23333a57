//! # Tether
//!
//! Typed HTTP `GET` endpoints whose query parameters are described once and
//! shared by the server that serves them and the client that calls them.
//!
//! An endpoint is declared with a path and a field schema. The server decodes
//! incoming queries with that schema before a handler runs, and the client
//! encodes outgoing inputs with the same schema, so both sides agree on the
//! wire format by construction.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::prelude::*;
//!
//! query_params! {
//!     #[derive(Debug, Clone)]
//!     pub struct Name {
//!         pub first: Str,
//!         pub last: Opt<Str>,
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let greet = endpoint().fragment("greet").query_params::<Name, String>();
//!
//!     let server = Server::builder()
//!         .http_addr("127.0.0.1:8080")
//!         .route(safe_get(&greet, |name: Name| async move {
//!             Ok::<_, HandlerError>(match name.last {
//!                 Some(last) => format!("Hello, {} {last}", name.first),
//!                 None => format!("Hello, {}", name.first),
//!             })
//!         }))
//!         .build();
//!     tokio::spawn(server.run());
//!
//!     let client = Client::new("http://127.0.0.1:8080")?;
//!     let greeting = client
//!         .safe_get(&greet, &Name { first: "Ada".into(), last: None })
//!         .await?;
//!     assert_eq!(greeting, "Hello, Ada");
//!     Ok(())
//! }
//! ```
//!
//! ## Crates
//!
//! | Crate | Contents |
//! |---|---|
//! | [`core`] | Type representations, field schemas, the query codec, endpoints |
//! | [`server`] | `safe_get` handler mounting and the hyper server |
//! | [`client`] | `reqwest` client calling endpoints |
//! | [`telemetry`] | Logging setup |
//! | [`config`] | Layered configuration |

#![doc(html_root_url = "https://docs.rs/tether/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use tether_client as client;
pub use tether_config as config;
pub use tether_core as core;
pub use tether_server as server;
pub use tether_telemetry as telemetry;

pub use tether_core::query_params;

/// Commonly used types.
///
/// ```rust
/// use tether::prelude::*;
/// ```
pub mod prelude {
    pub use tether_core::{
        endpoint, query_params, CodecError, DecodeError, Endpoint, FieldSchema, NoParams, Num, Opt, QueryParams,
        RawQuery, Str, TypeRep,
    };

    pub use tether_server::{safe_get, HandlerError, Route, Server, ServerConfig, ShutdownSignal};

    pub use tether_client::{Client, ClientError};
}
