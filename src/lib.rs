//! Hostboard dashboard library
//!
//! Framework-agnostic core of the hostboard dashboard backend: host metrics
//! collection and the small JSON documents the dashboard page polls.
//!
//! # Features
//!
//! - **Metrics Collector**: five independent host readings gathered
//!   concurrently, each bounded by a timeout and degraded on failure
//! - **Pluggable host access**: the [`HostProbe`] trait separates OS access
//!   from parsing so sources can be faked
//! - **Documents**: memory notes, activity feed and model name
//!
//! # Usage
//!
//! ```no_run
//! use hostboard::MetricsCollector;
//!
//! # async fn run() {
//! let collector = MetricsCollector::default();
//! let snapshot = collector.collect().await;
//! println!("{}", serde_json::to_string(&snapshot).unwrap());
//! # }
//! ```

pub mod activities;
pub mod collector;
pub mod health_stats;
pub mod model;
pub mod notes;
pub mod probe;
pub mod snapshot;

// Re-export main types for convenience
pub use activities::{Activity, ActivityFeed};
pub use collector::{Collection, MetricsCollector, Source};
pub use health_stats::HealthStats;
pub use model::{ModelInfo, ModelResolver};
pub use notes::NotesDocument;
pub use probe::{HostProbe, ProbeError, SystemProbe};
pub use snapshot::SystemSnapshot;
