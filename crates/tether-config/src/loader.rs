//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tether_telemetry::LogFormat;

use crate::{ConfigError, TetherConfig};

/// Format of configuration text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML.
    Toml,
    /// JSON.
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        path.extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?
            .parse()
    }

    fn read(self, content: &str) -> Result<TetherConfig, ConfigError> {
        match self {
            Self::Toml => Ok(toml::from_str(content)?),
            Self::Json => Ok(serde_json::from_str(content)?),
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Configuration loader.
///
/// Later layers override earlier ones:
/// 1. Default values
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables (`PREFIX__SECTION__KEY`)
///
/// # Example
///
/// ```no_run
/// use tether_config::ConfigLoader;
///
/// # fn main() -> Result<(), tether_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("tether.toml")?
///     .with_env_prefix("TETHER")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: TetherConfig,
    env_prefix: Option<String>,
}

impl ConfigLoader {
    /// Create a loader holding the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to default values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = TetherConfig::default();
        self
    }

    /// Start from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = TetherConfig::development();
        self
    }

    /// Start from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = TetherConfig::production();
        self
    }

    /// Load a `.toml` or `.json` file.
    ///
    /// Sections missing from the file take their default values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, has an
    /// unknown extension, does not parse, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = format.read(&content)?;
        Ok(self)
    }

    /// Load a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`ConfigLoader::with_file`] when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration text.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use tether_config::{ConfigFormat, ConfigLoader};
    ///
    /// let toml = r#"
    ///     [server]
    ///     http_addr = "127.0.0.1:3000"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, ConfigFormat::Toml)
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    pub fn with_string(mut self, content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        self.config = format.read(content)?;
        Ok(self)
    }

    /// Apply `PREFIX__SECTION__KEY` environment variables on [`load`](Self::load).
    ///
    /// With prefix `TETHER`:
    /// - `TETHER__SERVER__HTTP_ADDR`, `TETHER__SERVER__SHUTDOWN_TIMEOUT_SECS`,
    ///   `TETHER__SERVER__REQUEST_TIMEOUT_MS`
    /// - `TETHER__CLIENT__BASE_URL`, `TETHER__CLIENT__TIMEOUT_MS`
    /// - `TETHER__LOGGING__ENABLED`, `TETHER__LOGGING__LEVEL`,
    ///   `TETHER__LOGGING__FORMAT`, `TETHER__LOGGING__INCLUDE_LOCATION`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides, validate, and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable does not parse or
    /// the result fails [`TetherConfig::validate`].
    pub fn load(mut self) -> Result<TetherConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars().filter(|(k, _)| k.starts_with(&prefix)).collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> TetherConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            // Shares the prefix but not the separator, e.g. TETHERX_FOO.
            return Ok(());
        };

        let parts: Vec<&str> = rest.split("__").collect();

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_u64(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = parse_u64(key, value)?;
            }

            ["CLIENT", "BASE_URL"] => {
                self.config.client.base_url = value.to_string();
            }
            ["CLIENT", "TIMEOUT_MS"] => {
                self.config.client.timeout_ms = parse_u64(key, value)?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled =
                    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse::<LogFormat>()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected 'json', 'pretty' or 'compact'"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location =
                    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
