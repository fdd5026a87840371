//! HTTP handlers for the report server
//!
//! Every body is plain text. Loading happens per request; nothing is cached
//! between requests, so `/students` always reflects the file on disk.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::{Error, LOAD_FAILURE_MESSAGE};
use crate::roster::BufferSink;

use super::server::AppState;

/// Body of `GET /`
pub const GREETING: &str = "Hello Holberton School!";

/// First line of a successful `GET /students` body
pub const STUDENTS_HEADER: &str = "This is the list of our students";

// ============================================================================
// Routes
// ============================================================================

/// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/students", get(students_handler))
        .fallback(not_found_handler)
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn root_handler() -> &'static str {
    GREETING
}

async fn students_handler(State(state): State<AppState>) -> Response {
    match render_students(&state).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err(e) => {
            tracing::warn!(
                database = %state.config.database.display(),
                error = %e,
                cause = ?std::error::Error::source(&e),
                "Failed to load roster"
            );
            (failure_status(state.config.strict_status), LOAD_FAILURE_MESSAGE).into_response()
        }
    }
}

async fn not_found_handler() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

// ============================================================================
// Rendering
// ============================================================================

/// Load the configured roster and render the `/students` body
///
/// The summary lines are captured in a sink owned by this call, so concurrent
/// requests never see each other's output.
pub async fn render_students(state: &AppState) -> Result<String, Error> {
    let mut sink = BufferSink::new();
    state.loader.load(&state.config.database, &mut sink).await?;
    Ok(format!("{STUDENTS_HEADER}\n{}", sink.into_text()))
}

/// Status code used when the roster cannot be loaded
///
/// Existing clients expect `200` with the failure message in the body; strict
/// mode reports the outage as `503`.
pub fn failure_status(strict: bool) -> StatusCode {
    if strict {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

// ============================================================================
// Tests
// ============================================================================
