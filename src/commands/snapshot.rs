//! Snapshot command implementation.
//!
//! Collects snapshots from the local host and prints them as JSON, one per
//! line unless pretty-printed.

use hostboard::{MetricsCollector, SystemProbe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::Config;

pub async fn command_snapshot(
    iterations: usize,
    pretty: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let probe = SystemProbe::new(config.thermal_path(), config.loadavg_path());
    let collector = MetricsCollector::new(
        Arc::new(probe),
        Duration::from_millis(config.query_timeout_ms()),
    );

    for iteration in 1..=iterations {
        let start = Instant::now();
        let collection = collector.collect_detailed().await;
        debug!(
            "Snapshot {}/{} collected in {:.1}ms, degraded: {:?}",
            iteration,
            iterations,
            start.elapsed().as_secs_f64() * 1000.0,
            collection.degraded
        );

        let json = if pretty {
            serde_json::to_string_pretty(&collection.snapshot)?
        } else {
            serde_json::to_string(&collection.snapshot)?
        };
        println!("{json}");
    }

    Ok(())
}
