//! Plain-text report server
//!
//! # Routes
//!
//! ```text
//! GET /          -> 200 "Hello Holberton School!"
//! GET /students  -> 200 roster summary, or "Cannot load the database"
//! anything else  -> 404 "Not Found"
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roster::server::{ReportServer, ServerConfig};
//!
//! let config = ServerConfig::builder().database("database.csv").build()?;
//! let server = ReportServer::new(config)?;
//! server.start().await?;
//! ```

pub mod api;
pub mod config;
#[allow(clippy::module_inception)]
pub mod server;

// Re-export main types
pub use config::{ConfigError, ServerConfig, ServerConfigBuilder};
pub use server::{AppState, ReportServer, ServerError, ServerInfo};
