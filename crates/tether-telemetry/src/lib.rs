//! # Tether Telemetry
//!
//! Logging setup shared by Tether binaries and tests.
//!
//! - [`init_logging`] - Install a JSON or human-readable `tracing` subscriber
//! - [`init_test_logging`] - Route logs through the test harness
//! - [`fields`] - Standard field names used by the server and client

#![doc(html_root_url = "https://docs.rs/tether-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, init_test_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
