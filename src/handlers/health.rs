//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! service uptime, request counters and per-source degradation counts.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");

    let uptime_hours = state.start_time.elapsed().as_secs() as f64 / SECONDS_PER_HOUR;
    let uptime_str = if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    };

    let version = env!("CARGO_PKG_VERSION");
    let built = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown");
    let table = state.health_stats.render_table();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!("OK\n\nVersion: {version} (built {built})\nUptime: {uptime_str}\n\n{table}"),
    )
}
