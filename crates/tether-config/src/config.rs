//! Configuration sections.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tether_client::{Client, ClientError};
use tether_server::ServerConfig;
use tether_telemetry::{LogConfig, LogFormat};
use url::Url;

use crate::ConfigError;

/// Complete Tether configuration.
///
/// # Example
///
/// ```
/// use tether_config::TetherConfig;
///
/// let config = TetherConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerSettings,

    /// Client configuration.
    #[serde(default)]
    pub client: ClientSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl TetherConfig {
    /// Development preset: pretty debug logs, local bind address.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.server.http_addr = "127.0.0.1:8080".to_string();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config
    }

    /// Production preset: JSON info logs.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - `server.http_addr` is not a socket address
    /// - a timeout is zero
    /// - `client.base_url` is not an absolute `http`/`https` URL
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }
        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid_value(
                "server.shutdown_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        match Url::parse(&self.client.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.host().is_some() => {}
            _ => {
                return Err(ConfigError::invalid_value(
                    "client.base_url",
                    format!("expected an http(s) URL, got '{}'", self.client.base_url),
                ))
            }
        }
        if self.client.timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "client.timeout_ms",
                "must be greater than zero",
            ));
        }

        Ok(())
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSettings {
    /// Bind address.
    pub http_addr: String,

    /// Grace period for open connections on shutdown.
    pub shutdown_timeout_secs: u64,

    /// Upper bound on one request, handler included.
    pub request_timeout_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            http_addr: tether_server::config::DEFAULT_HTTP_ADDR.to_string(),
            shutdown_timeout_secs: tether_server::config::DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            request_timeout_ms: tether_server::config::DEFAULT_REQUEST_TIMEOUT_SECS * 1000,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        ServerConfig::builder()
            .http_addr(settings.http_addr.clone())
            .shutdown_timeout(Duration::from_secs(settings.shutdown_timeout_secs))
            .request_timeout(Duration::from_millis(settings.request_timeout_ms))
            .build()
    }
}

/// Client settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSettings {
    /// Base URL endpoints are resolved against.
    pub base_url: String,

    /// Per-request timeout.
    pub timeout_ms: u64,
}

impl ClientSettings {
    /// Returns the timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_ms: tether_client::DEFAULT_TIMEOUT_SECS * 1000,
        }
    }
}

impl TryFrom<&ClientSettings> for Client {
    type Error = ClientError;

    fn try_from(settings: &ClientSettings) -> Result<Self, Self::Error> {
        Client::with_timeout(&settings.base_url, settings.timeout())
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Include file and line in each event.
    pub include_location: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

impl From<&LoggingSettings> for LogConfig {
    fn from(settings: &LoggingSettings) -> Self {
        LogConfig {
            enabled: settings.enabled,
            level: settings.level.clone(),
            format: settings.format,
            file_line_info: settings.include_location,
            include_target: true,
        }
    }
}
