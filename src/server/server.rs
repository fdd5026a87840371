//! Report server implementation

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::error::Error;
use crate::roster::{Report, RosterLoader, TracingSink};

use super::api::create_router;
use super::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
///
/// Read-only after startup; requests never write to it.
#[derive(Clone)]
pub struct AppState {
    /// Roster loader configured with the server's load options
    pub loader: Arc<RosterLoader>,

    /// Configuration
    pub config: Arc<ServerConfig>,
}

// ============================================================================
// Report Server
// ============================================================================

/// Plain-text roster report server
pub struct ReportServer {
    config: ServerConfig,
    state: AppState,
}

impl ReportServer {
    /// Create a new report server
    pub fn new(config: ServerConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let state = AppState {
            loader: Arc::new(RosterLoader::new(config.load_options.clone())),
            config: Arc::new(config.clone()),
        };

        Ok(Self { config, state })
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Load the roster once and log its summary
    ///
    /// Used at startup to surface a bad database path early. Requests still
    /// load the file themselves.
    pub async fn preflight(&self) -> Result<Report, Error> {
        let mut sink = TracingSink;
        self.state.loader.load(&self.config.database, &mut sink).await
    }

    /// Bind the configured address and serve until the process exits
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending()).await
    }

    /// Bind the configured address and serve until `shutdown_signal` resolves
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let addr = self.config.bind_address;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(format!("{addr}: {e}")))?;

        self.serve_with_shutdown(listener, shutdown_signal).await
    }

    /// Serve on an already-bound listener
    pub async fn serve_with_shutdown(
        &self,
        listener: TcpListener,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!(
            address = %local,
            database = %self.config.database.display(),
            "Starting report server"
        );

        axum::serve(listener, self.build_router())
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Report server shutdown complete");
        Ok(())
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            database: self.config.database.clone(),
            category_column: self.config.load_options.category_column.to_string(),
            request_logging_enabled: self.config.enable_request_logging,
            strict_status: self.config.strict_status,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub database: PathBuf,
    pub category_column: String,
    pub request_logging_enabled: bool,
    pub strict_status: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Roster Report Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Database: {}\n\
             Category Column: {}\n\
             Request Logging: {}\n\
             Failure Status: {}",
            "",
            self.bind_address,
            self.database.display(),
            self.category_column,
            if self.request_logging_enabled { "enabled" } else { "disabled" },
            if self.strict_status { "503" } else { "200" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
