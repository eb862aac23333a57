//! Layered configuration for Tether.
//!
//! Values are resolved from defaults, then a TOML or JSON file, then
//! environment variables. Unknown fields are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//!
//! [client]
//! base_url = "http://127.0.0.1:8080"
//! timeout_ms = 30000
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! include_location = false
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every key above can be overridden as `TETHER__SECTION__KEY`, for example
//! `TETHER__SERVER__HTTP_ADDR=127.0.0.1:9000` or `TETHER__LOGGING__FORMAT=pretty`.
//!
//! # Example
//!
//! ```no_run
//! use tether_config::ConfigLoader;
//! use tether_client::Client;
//! use tether_server::ServerConfig;
//! use tether_telemetry::LogConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("tether.toml")?
//!     .with_env_prefix("TETHER")
//!     .load()?;
//!
//! let server = ServerConfig::from(&config.server);
//! let logging = LogConfig::from(&config.logging);
//! let client = Client::try_from(&config.client)?;
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/tether-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use config::{ClientSettings, LoggingSettings, ServerSettings, TetherConfig};
pub use error::ConfigError;
pub use loader::{ConfigFormat, ConfigLoader};
