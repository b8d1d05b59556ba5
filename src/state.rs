//! Application state management for the dashboard.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use hostboard::{HealthStats, MetricsCollector, ModelResolver, SystemProbe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
///
/// Holds no per-request data: every snapshot and document is built fresh.
pub struct AppState {
    pub config: Arc<Config>,
    pub collector: MetricsCollector,
    pub model: ModelResolver,
    pub health_stats: Arc<HealthStats>,
    pub html_path: PathBuf,
    pub memory_path: PathBuf,
    pub activities_path: PathBuf,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Builds state that reads the real host.
    pub fn from_config(config: Config) -> Self {
        let probe = SystemProbe::new(config.thermal_path(), config.loadavg_path());
        let collector = MetricsCollector::new(
            Arc::new(probe),
            Duration::from_millis(config.query_timeout_ms()),
        );
        Self::with_collector(config, collector)
    }

    pub fn with_collector(config: Config, collector: MetricsCollector) -> Self {
        Self {
            model: ModelResolver::new(config.model_env(), config.status_path()),
            html_path: config.html_path().to_path_buf(),
            memory_path: config.memory_path().to_path_buf(),
            activities_path: config.activities_path().to_path_buf(),
            config: Arc::new(config),
            collector,
            health_stats: Arc::new(HealthStats::new()),
            start_time: Instant::now(),
        }
    }
}
