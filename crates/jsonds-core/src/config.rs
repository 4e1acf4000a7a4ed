//! Configuration loading and typed config structures for jsonds.
//!
//! The configuration lives in a YAML file (`jsonds.yaml` by default). Every
//! field has a default, so an empty or missing file yields a working
//! server. A couple of environment variables override the listener
//! address after the file has been read.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::seeder::MAX_SEED_COUNT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level jsonds configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JsondsConfig {
    /// Listener and per-request settings.
    #[serde(default)]
    pub server: ServerSection,

    /// Event log seeding and generation.
    #[serde(default)]
    pub events: EventsConfig,

    /// Push channel cadence.
    #[serde(default)]
    pub push: PushConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl JsondsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `JSONDS_HOST` and `JSONDS_PORT` override the listener address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply env overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config = Self::parse_without_env(yaml)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus env overrides, used when no config file exists.
    pub fn from_env_only() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    pub fn parse_without_env(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the listener address from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Override the listener address using `lookup` to resolve variables.
    ///
    /// - `JSONDS_HOST` overrides `server.host`
    /// - `JSONDS_PORT` overrides `server.port`
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("JSONDS_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("JSONDS_PORT") {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
                field: "JSONDS_PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.events.seed_count > MAX_SEED_COUNT {
            return Err(ConfigError::Invalid {
                field: "events.seed_count",
                reason: format!("must be at most {MAX_SEED_COUNT}"),
            });
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "server.request_timeout_ms",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.events.generate_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "events.generate_interval_ms",
                reason: String::from("must be greater than zero"),
            });
        }
        if self.push.interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "push.interval_ms",
                reason: String::from("must be greater than zero"),
            });
        }
        Ok(())
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// Address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for a single HTTP request.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerSection {
    /// The per-request deadline as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

/// Event log configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventsConfig {
    /// Number of historical events written at startup.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,

    /// Period between generated events.
    #[serde(default = "default_generate_interval_ms")]
    pub generate_interval_ms: u64,
}

impl EventsConfig {
    /// The generator period as a [`Duration`].
    pub const fn generate_interval(&self) -> Duration {
        Duration::from_millis(self.generate_interval_ms)
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            seed_count: default_seed_count(),
            generate_interval_ms: default_generate_interval_ms(),
        }
    }
}

/// Push channel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Pause between two pushes on one connection.
    #[serde(default = "default_push_interval_ms")]
    pub interval_ms: u64,
}

impl PushConfig {
    /// The push cadence as a [`Duration`].
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_push_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is unset (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format of the log lines.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

const fn default_request_timeout_ms() -> u64 {
    10_000
}

const fn default_seed_count() -> usize {
    100
}

const fn default_generate_interval_ms() -> u64 {
    10_000
}

const fn default_push_interval_ms() -> u64 {
    3000
}

fn default_log_level() -> String {
    "info".to_owned()
}
