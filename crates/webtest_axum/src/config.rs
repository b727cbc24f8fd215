//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `webtest.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use serde::Deserialize;

use webtest_adapter_http_axum::Transport;
use webtest_app::config::BridgeConfig;

const DEFAULT_FILE: &str = "webtest.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// How requests are bridged and what the application sees.
    pub bridge: BridgeConfig,
    /// How requests reach the service.
    pub transport: TransportConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub kind: Transport,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "webtest=info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `webtest.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if an
    /// override or the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(DEFAULT_FILE)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, falling back to defaults when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Io`] for any other read failure.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("WEBTEST_ERROR_POLICY") {
            self.bridge.error_policy = val.parse().map_err(ConfigError::Validation)?;
        }
        if let Some(val) = lookup("WEBTEST_HTTP_VERSION") {
            self.bridge.http_version = val.parse().map_err(ConfigError::Validation)?;
        }
        if let Some(val) = lookup("WEBTEST_HOST") {
            self.bridge.host = val;
        }
        if let Some(val) = lookup("WEBTEST_REMOTE_ADDR") {
            self.bridge.remote_addr = val.parse().map_err(|_| {
                ConfigError::Validation(format!("remote address {val:?} is not host:port"))
            })?;
        }
        if let Some(val) = lookup("WEBTEST_TRANSPORT") {
            self.transport.kind = val.parse().map_err(ConfigError::Validation)?;
        }
        if let Some(val) = lookup("WEBTEST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] when the default `Host` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bridge.host.trim().is_empty() {
            return Err(ConfigError::Validation("host must be non-empty".to_string()));
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
