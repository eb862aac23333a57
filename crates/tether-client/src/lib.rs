//! # Tether Client
//!
//! Calls Tether endpoints over HTTP with `reqwest`.
//!
//! - [`Client`] - Base URL plus a pooled HTTP client
//! - [`Client::safe_get`] / [`safe_get`] - Typed `GET` against an endpoint
//! - [`ClientError`] - What can go wrong on the way
//!
//! ## Example
//!
//! ```rust,no_run
//! use tether_client::Client;
//! use tether_core::{endpoint, query_params, Str};
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
//!     let client = Client::new("http://127.0.0.1:8080")?;
//!
//!     let greeting = client
//!         .safe_get(&greet, &Name { first: "Ada".into(), last: "Lovelace".into() })
//!         .await?;
//!     println!("{greeting}");
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/tether-client/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;

pub use client::{safe_get, Client, DEFAULT_TIMEOUT_SECS};
pub use error::{ClientError, ClientResult};
