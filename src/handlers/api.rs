//! JSON API handlers polled by the dashboard page.
//!
//! Every response carries `Access-Control-Allow-Origin: *` and always has
//! status 200: failures are expressed inside the document.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use hostboard::{activities, notes};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::state::SharedState;

fn api_json<T: Serialize>(body: T) -> impl IntoResponse {
    ([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")], Json(body))
}

/// Handler for `/api/systeminfo`.
#[instrument(skip(state))]
pub async fn systeminfo_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/systeminfo request");

    let start = Instant::now();
    let collection = state.collector.collect_detailed().await;
    state
        .health_stats
        .record_collection(start.elapsed(), &collection.degraded);

    if !collection.degraded.is_empty() {
        debug!("Snapshot degraded sources: {:?}", collection.degraded);
    }

    api_json(collection.snapshot)
}

/// Handler for `/api/memory`.
#[instrument(skip(state))]
pub async fn memory_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/memory request");
    api_json(notes::read_notes(&state.memory_path).await)
}

/// Handler for `/api/activities`.
#[instrument(skip(state))]
pub async fn activities_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /api/activities request");
    api_json(activities::load_activities(&state.activities_path).await)
}

/// Handler for `/api/model` and `/api/status`.
#[instrument(skip(state))]
pub async fn model_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing model request");
    api_json(state.model.info().await)
}
