//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `metacat.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Read limits.
    pub limits: LimitsConfig,
    /// Change callback delivery.
    pub notifier: NotifierSection,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
    /// Pool size for file databases.
    pub max_connections: u32,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Read limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest number of entities a single listing may return.
    pub max_results: usize,
}

/// Notifier pool sizing.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotifierSection {
    /// Send change callbacks at all.
    pub enabled: bool,
    /// Number of delivery workers.
    pub workers: usize,
    /// Notices waiting beyond this are dropped.
    pub queue_depth: usize,
    /// Per-delivery timeout in milliseconds.
    pub timeout_ms: u64,
}

impl NotifierSection {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from `metacat.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("metacat.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides from `lookup`, a view of the process environment.
    /// Values that do not parse are ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("METACAT_HOST") {
            self.server.host = val;
        }
        override_parsed(&mut self.server.port, lookup("METACAT_PORT"));
        if let Some(val) = lookup("METACAT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                override_parsed(&mut self.server.port, Some(port.to_string()));
            }
        }
        if let Some(val) = lookup("METACAT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = lookup("METACAT_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        override_parsed(&mut self.limits.max_results, lookup("METACAT_MAX_RESULTS"));
        override_parsed(&mut self.notifier.workers, lookup("METACAT_NOTIFIER_WORKERS"));
        override_parsed(
            &mut self.notifier.queue_depth,
            lookup("METACAT_NOTIFIER_QUEUE_DEPTH"),
        );
        override_parsed(
            &mut self.notifier.timeout_ms,
            lookup("METACAT_NOTIFIER_TIMEOUT_MS"),
        );
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.limits.max_results == 0 {
            return Err(ConfigError::Validation(
                "max_results must be non-zero".to_string(),
            ));
        }
        if self.notifier.workers == 0 {
            return Err(ConfigError::Validation(
                "notifier workers must be non-zero".to_string(),
            ));
        }
        if self.notifier.queue_depth == 0 {
            return Err(ConfigError::Validation(
                "notifier queue_depth must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

fn override_parsed<T: FromStr>(slot: &mut T, value: Option<String>) {
    if let Some(parsed) = value.and_then(|v| v.parse().ok()) {
        *slot = parsed;
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 48081,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:metacat.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "metacatd=info,metacat_app=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_results: 50_000,
        }
    }
}

impl Default for NotifierSection {
    fn default() -> Self {
        Self {
            enabled: true,
            workers: 4,
            queue_depth: 256,
            timeout_ms: 5_000,
        }
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
