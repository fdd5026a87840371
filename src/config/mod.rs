//! Configuration management for roster
//!
//! This module handles loading and validating configuration from environment variables,
//! files, and command-line arguments. Command-line values are applied last by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::roster::{CategoryColumn, LoadOptions};
use crate::server::ServerConfig;

/// Port the report server listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 1245;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: HttpConfig,

    /// Roster database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Log every request through the trace layer
    pub request_logging: bool,

    /// Answer load failures with 503 instead of 200
    pub strict_status: bool,
}

/// Roster database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the roster file
    pub path: Option<PathBuf>,

    /// Column holding the category ("last" or a field index)
    pub category_column: CategoryColumn,

    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            request_logging: true,
            strict_status: false,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            category_column: CategoryColumn::Last,
            read_timeout_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("ROSTER_HOST").unwrap_or(defaults.server.host);

        let port = match std::env::var("ROSTER_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .with_context(|| format!("ROSTER_PORT is not a valid port: {v}"))?,
            Err(_) => defaults.server.port,
        };

        let strict_status = std::env::var("ROSTER_STRICT_STATUS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.server.strict_status);

        let path = std::env::var("ROSTER_DATABASE").ok().map(PathBuf::from);

        let category_column = match std::env::var("ROSTER_CATEGORY_COLUMN") {
            Ok(v) => v.parse::<CategoryColumn>()?,
            Err(_) => defaults.database.category_column,
        };

        let read_timeout_ms = std::env::var("ROSTER_READ_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.database.read_timeout_ms);

        let level = std::env::var("ROSTER_LOG_LEVEL").unwrap_or(defaults.logging.level);
        let format = std::env::var("ROSTER_LOG_FORMAT").unwrap_or(defaults.logging.format);

        Ok(Self {
            server: HttpConfig {
                host,
                port,
                request_logging: defaults.server.request_logging,
                strict_status,
            },
            database: DatabaseConfig {
                path,
                category_column,
                read_timeout_ms,
            },
            logging: LoggingConfig { level, format },
        })
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.database.read_timeout_ms == 0 {
            anyhow::bail!("read_timeout_ms must be greater than 0");
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            anyhow::bail!("log format must be 'text' or 'json', got '{}'", self.logging.format);
        }

        self.bind_address()?;
        Ok(())
    }

    /// Get read timeout as Duration
    #[must_use]
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.database.read_timeout_ms)
    }

    /// Resolve host and port into a socket address
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let raw = format!("{}:{}", self.server.host, self.server.port);
        raw.parse()
            .with_context(|| format!("Invalid bind address: {raw}"))
    }

    /// Loader options derived from the database section
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            category_column: self.database.category_column,
            read_timeout: self.read_timeout(),
        }
    }

    /// Build the report server configuration
    ///
    /// Fails when no database path has been configured.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let database = self
            .database
            .path
            .clone()
            .context("No roster database configured (pass DATABASE or set ROSTER_DATABASE)")?;

        let config = ServerConfig::builder()
            .bind_address(self.bind_address()?)
            .database(database)
            .load_options(self.load_options())
            .enable_request_logging(self.server.request_logging)
            .strict_status(self.server.strict_status)
            .build()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 1245);
        assert_eq!(config.database.category_column, CategoryColumn::Last);
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let mut config = Config::default();
        config.database.read_timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_host_is_invalid() {
        let mut config = Config::default();
        config.server.host = String::from("not a host");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_read_timeout_conversion() {
        let config = Config::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_server_config_requires_database() {
        let config = Config::default();
        assert!(config.server_config().is_err());

        let mut config = Config::default();
        config.database.path = Some(PathBuf::from("database.csv"));
        let server = config.server_config().unwrap();
        assert_eq!(server.bind_address.port(), 1245);
        assert_eq!(server.database, PathBuf::from("database.csv"));
    }

    #[test]
    fn test_from_toml_partial() {
        let config: Config = toml::from_str(
            r#"
            [server]
            port = 8080

            [database]
            path = "students.csv"
            category_column = "3"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.database.category_column, CategoryColumn::Index(3));
        assert_eq!(config.database.path, Some(PathBuf::from("students.csv")));
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    #[serial]
    fn test_from_env() {
        std::env::set_var("ROSTER_PORT", "9000");
        std::env::set_var("ROSTER_DATABASE", "/tmp/db.csv");
        std::env::set_var("ROSTER_CATEGORY_COLUMN", "last");

        let config = Config::from_env().unwrap();

        std::env::remove_var("ROSTER_PORT");
        std::env::remove_var("ROSTER_DATABASE");
        std::env::remove_var("ROSTER_CATEGORY_COLUMN");

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/db.csv")));
        assert_eq!(config.database.category_column, CategoryColumn::Last);
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_port() {
        std::env::set_var("ROSTER_PORT", "http");
        let result = Config::from_env();
        std::env::remove_var("ROSTER_PORT");

        assert!(result.is_err());
    }
}
