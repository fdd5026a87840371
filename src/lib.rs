//! roster - Student roster reporter
//!
//! Reads a comma-separated roster file, groups student identifiers by field of
//! study, and serves the summary over a small plain-text HTTP server.
//!
//! # Architecture
//!
//! - [`roster`] - Parsing, grouping and the blocking/async loaders
//! - [`server`] - The axum report server
//! - [`config`] - Configuration from environment, TOML files and the CLI
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use roster::roster::{LoadOptions, RosterLoader, StdoutSink};
//!
//! fn main() -> roster::error::Result<()> {
//!     let loader = RosterLoader::new(LoadOptions::default());
//!     let report = loader.load_blocking("database.csv", &mut StdoutSink)?;
//!     assert_eq!(report.total(), report.iter().map(|g| g.identifiers.len()).sum::<usize>());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod roster;
pub mod server;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::roster::{
        BufferSink, CategoryColumn, LoadOptions, Report, RosterLoader, StdoutSink, SummarySink,
    };
    pub use crate::server::{ReportServer, ServerConfig};
}

// Direct re-exports for convenience
pub use roster::{CategoryColumn, Report, RosterLoader};
