//! Unified error handling for the roster crate
//!
//! # Architecture
//!
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum returned by the loader and configuration layer
//!
//! The loader only ever surfaces [`Error::ResourceUnavailable`]: a missing file,
//! a permission problem, invalid UTF-8 and a read timeout all collapse into it.
//! Callers cannot tell those causes apart, so the error is never retriable.
//!
//! # Usage
//!
//! ```rust,ignore
//! use roster::error::Error;
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         println!("Retrying: {err}");
//!     } else {
//!         eprintln!("Fatal error: {err}");
//!     }
//! }
//! ```

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown to users when the roster cannot be loaded
pub const LOAD_FAILURE_MESSAGE: &str = "Cannot load the database";

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The backing roster file could not be read
    Resource,
    /// Configuration and validation errors
    Config,
    /// Serialization errors
    Serialization,
}

impl ErrorCategory {
    /// Human-readable description of the category
    pub fn description(&self) -> &'static str {
        match self {
            Self::Resource => "resource unavailable",
            Self::Config => "configuration error",
            Self::Serialization => "serialization error",
        }
    }
}

/// Unified error type for the roster crate
#[derive(Error, Debug)]
pub enum Error {
    /// The roster file is missing, unreadable, not UTF-8, or the read timed out
    #[error("Cannot load the database")]
    ResourceUnavailable {
        path: PathBuf,
        #[source]
        source: Option<io::Error>,
    },

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a resource error for `path`, keeping the I/O cause for logs only
    pub fn resource_unavailable(path: impl Into<PathBuf>, source: Option<io::Error>) -> Self {
        Self::ResourceUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if this error is recoverable (can be retried)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::ResourceUnavailable { .. } => false,
            Self::Json(_) => false,
            Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ResourceUnavailable { .. } => ErrorCategory::Resource,
            Self::Json(_) => ErrorCategory::Serialization,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
