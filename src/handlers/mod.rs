//! HTTP endpoint handlers for the dashboard.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/api/systeminfo`: host metrics snapshot
//! - `/api/memory`: memory notes document
//! - `/api/activities`: recent activity feed
//! - `/api/model`, `/api/status`: running model name
//! - `/`, `/index.html`, `/dashboard`: dashboard page
//! - `/health`: service health statistics

pub mod api;
pub mod dashboard;
pub mod health;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use tracing::info;

pub use api::{activities_handler, memory_handler, model_handler, systeminfo_handler};
pub use dashboard::{dashboard_handler, not_found_handler};
pub use health::health_handler;

use crate::state::SharedState;

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    let mut app = Router::new()
        .route("/api/systeminfo", get(systeminfo_handler))
        .route("/api/memory", get(memory_handler))
        .route("/api/activities", get(activities_handler))
        .route("/api/model", get(model_handler))
        .route("/api/status", get(model_handler))
        .route("/", get(dashboard_handler))
        .route("/index.html", get(dashboard_handler))
        .route("/dashboard", get(dashboard_handler));

    if state.config.enable_health.unwrap_or(true) {
        app = app.route("/health", get(health_handler));
    }

    app.fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), track_request))
        .with_state(state)
}

/// Logs and counts every request, including unmatched ones.
async fn track_request(State(state): State<SharedState>, req: Request, next: Next) -> Response {
    info!("{} {}", req.method(), req.uri());
    state.health_stats.record_http_request();
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, StatusCode};
    use hostboard::{HostProbe, MetricsCollector, ProbeError, Source};
    use serde_json::Value;
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::{NamedTempFile, TempDir};
    use tower::ServiceExt;

    /// Healthy host except for a missing `top`.
    struct NoTopProbe;

    #[async_trait]
    impl HostProbe for NoTopProbe {
        async fn thermal_zone(&self) -> Result<String, ProbeError> {
            Ok("45230\n".to_string())
        }
        async fn cpu_summary(&self) -> Result<String, ProbeError> {
            Err(ProbeError::Malformed("top not installed".to_string()))
        }
        async fn memory_summary(&self) -> Result<String, ProbeError> {
            Ok("Mem: 1000 250 750\n".to_string())
        }
        async fn uptime(&self) -> Result<String, ProbeError> {
            Ok("up 1 hour, 2 minutes\n".to_string())
        }
        async fn load_average(&self) -> Result<String, ProbeError> {
            Ok("0.10 0.25 0.30 2/150 1234\n".to_string())
        }
    }

    fn test_state(config: Config) -> SharedState {
        let collector = MetricsCollector::new(Arc::new(NoTopProbe), Duration::from_millis(200));
        Arc::new(AppState::with_collector(config, collector))
    }

    fn missing(dir: &TempDir, name: &str) -> Option<PathBuf> {
        Some(dir.path().join(name))
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            html_path: missing(dir, "index.html"),
            memory_path: missing(dir, "MEMORY.md"),
            activities_path: missing(dir, "activities.json"),
            status_path: missing(dir, "session-status.json"),
            model_env: Some("HOSTBOARD_TEST_MODEL_UNSET".to_string()),
            ..Config::default()
        }
    }

    async fn fetch(state: SharedState, uri: &str) -> (StatusCode, header::HeaderMap, Vec<u8>) {
        let response = router(state)
            .oneshot(axum::http::Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body.to_vec())
    }

    async fn get_json(state: SharedState, uri: &str) -> Value {
        let (status, headers, body) = fetch(state, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::CONTENT_TYPE], "application/json");
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_systeminfo_degrades_only_failed_field() {
        let dir = TempDir::new().unwrap();
        let state = test_state(config_in(&dir));

        let json = get_json(state.clone(), "/api/systeminfo").await;

        assert_eq!(json["cpuTemp"], "45.2");
        assert_eq!(json["cpuUsage"], "0");
        assert_eq!(json["memoryUsage"], "25.0");
        assert_eq!(json["uptime"], "up 1 hour, 2 minutes");
        assert_eq!(json["loadAvg"], "0.10, 0.25, 0.30");

        assert_eq!(state.health_stats.degraded_count(Source::CpuUsage), 1);
        assert_eq!(state.health_stats.degraded_count(Source::Temperature), 0);
        assert_eq!(state.health_stats.snapshots_total.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_memory_document() {
        let dir = TempDir::new().unwrap();
        let mut notes = NamedTempFile::new_in(dir.path()).unwrap();
        write!(notes, "# Notes\n- remember this").unwrap();

        let mut config = config_in(&dir);
        let state = test_state(config.clone());
        let json = get_json(state, "/api/memory").await;
        assert_eq!(json, serde_json::json!({"error": "Could not read memory"}));

        config.memory_path = Some(notes.path().to_path_buf());
        let json = get_json(test_state(config), "/api/memory").await;
        assert_eq!(json, serde_json::json!({"content": "# Notes\n- remember this"}));
    }

    #[tokio::test]
    async fn test_activities_fall_back_to_demo() {
        let dir = TempDir::new().unwrap();
        let json = get_json(test_state(config_in(&dir)), "/api/activities").await;

        let activities = json["activities"].as_array().unwrap();
        assert_eq!(activities.len(), 5);
        assert_eq!(activities[0]["action"], "Dashboard accessed");
    }

    #[tokio::test]
    async fn test_model_and_status_share_resolution() {
        let dir = TempDir::new().unwrap();
        let status = dir.path().join("session-status.json");
        std::fs::write(&status, r#"{"model": "test-model"}"#).unwrap();

        let state = test_state(config_in(&dir));
        assert_eq!(
            get_json(state.clone(), "/api/model").await,
            serde_json::json!({"model": "test-model"})
        );
        assert_eq!(
            get_json(state, "/api/status").await,
            serde_json::json!({"model": "test-model"})
        );
    }

    #[tokio::test]
    async fn test_dashboard_page_routes() {
        let dir = TempDir::new().unwrap();
        let page = dir.path().join("index.html");
        std::fs::write(&page, "<html>dash</html>").unwrap();

        let state = test_state(config_in(&dir));
        for uri in ["/", "/index.html", "/dashboard"] {
            let (status, headers, body) = fetch(state.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");
            assert_eq!(body, b"<html>dash</html>");
        }
    }

    #[tokio::test]
    async fn test_missing_dashboard_page_is_500() {
        let dir = TempDir::new().unwrap();
        let (status, _, body) = fetch(test_state(config_in(&dir)), "/").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, b"Error loading page");
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let dir = TempDir::new().unwrap();
        let state = test_state(config_in(&dir));
        let (status, headers, body) = fetch(state.clone(), "/api/unknown").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain");
        assert_eq!(body, b"Not Found");
        assert_eq!(state.health_stats.http_requests_total.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_health_endpoint_toggle() {
        let dir = TempDir::new().unwrap();

        let (status, _, body) = fetch(test_state(config_in(&dir)), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("OK"));
        assert!(text.contains("DEGRADED SOURCES"));

        let config = Config {
            enable_health: Some(false),
            ..config_in(&dir)
        };
        let (status, _, _) = fetch(test_state(config), "/health").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
