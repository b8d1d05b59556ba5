//! Dashboard page and fallback handlers.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Serves the dashboard HTML file, read from disk on every request.
#[instrument(skip(state))]
pub async fn dashboard_handler(State(state): State<SharedState>) -> Response {
    debug!("Serving dashboard page from {}", state.html_path.display());

    match tokio::fs::read(&state.html_path).await {
        Ok(page) => ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], page).into_response(),
        Err(e) => {
            error!(
                "Failed to read dashboard page {}: {}",
                state.html_path.display(),
                e
            );
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain")],
                "Error loading page",
            )
                .into_response()
        }
    }
}

pub async fn not_found_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        "Not Found",
    )
}
