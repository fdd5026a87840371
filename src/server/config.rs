//! Report server configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::roster::{CategoryColumn, LoadOptions};

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 1245))
}

/// Configuration for the report server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Roster file served by `/students`, fixed for the process lifetime
    pub database: PathBuf,

    /// Options passed to the loader on every request
    pub load_options: LoadOptions,

    /// Enable request logging
    pub enable_request_logging: bool,

    /// Answer load failures with 503 instead of 200
    pub strict_status: bool,
}

impl ServerConfig {
    /// Create a new config builder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "database".to_string(),
            });
        }

        if self.load_options.read_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "read_timeout".to_string(),
                reason: "Timeout must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    bind_address: Option<SocketAddr>,
    database: Option<PathBuf>,
    load_options: Option<LoadOptions>,
    enable_request_logging: Option<bool>,
    strict_status: Option<bool>,
}

impl ServerConfigBuilder {
    /// Set bind address
    pub fn bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = Some(addr);
        self
    }

    /// Set bind address from string
    pub fn bind_address_str(mut self, addr: &str) -> Result<Self, ConfigError> {
        self.bind_address = Some(addr.parse().map_err(|_| ConfigError::InvalidValue {
            field: "bind_address".to_string(),
            reason: format!("Invalid address: {}", addr),
        })?);
        Ok(self)
    }

    /// Set the roster file path
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Set all loader options at once
    pub fn load_options(mut self, options: LoadOptions) -> Self {
        self.load_options = Some(options);
        self
    }

    /// Set the category column policy
    pub fn category_column(mut self, column: CategoryColumn) -> Self {
        self.load_options.get_or_insert_with(LoadOptions::default).category_column = column;
        self
    }

    /// Set the read timeout
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.load_options.get_or_insert_with(LoadOptions::default).read_timeout = timeout;
        self
    }

    /// Enable/disable request logging
    pub fn enable_request_logging(mut self, enable: bool) -> Self {
        self.enable_request_logging = Some(enable);
        self
    }

    /// Enable/disable 503 on load failure
    pub fn strict_status(mut self, strict: bool) -> Self {
        self.strict_status = Some(strict);
        self
    }

    /// Build the config
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let config = ServerConfig {
            bind_address: self.bind_address.unwrap_or_else(default_bind_address),
            database: self.database.ok_or_else(|| ConfigError::MissingField {
                field: "database".to_string(),
            })?,
            load_options: self.load_options.unwrap_or_default(),
            enable_request_logging: self.enable_request_logging.unwrap_or(true),
            strict_status: self.strict_status.unwrap_or(false),
        };

        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Clone)]
pub enum ConfigError {
    InvalidValue { field: String, reason: String },
    MissingField { field: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            Self::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
