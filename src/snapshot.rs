//! Point-in-time host metrics record served by `/api/systeminfo`.

use serde::{Serialize, Serializer};

/// Value reported for CPU and memory usage when the source is degraded.
pub const DEFAULT_PERCENT: &str = "0";

/// Value reported for uptime when the source is degraded.
pub const UNKNOWN_UPTIME: &str = "Unknown";

/// One immutable capture of the five host readings.
///
/// Every field is always serialized. A degraded reading keeps its key and
/// carries the documented default instead (`null` for the temperature).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemSnapshot {
    /// CPU temperature in °C, rounded to one decimal. `None` when unreadable.
    #[serde(rename = "cpuTemp", serialize_with = "serialize_temperature")]
    pub cpu_temperature: Option<f64>,

    /// CPU usage percentage as printed by `top`.
    #[serde(rename = "cpuUsage")]
    pub cpu_usage_percent: String,

    /// Memory usage percentage with one decimal.
    #[serde(rename = "memoryUsage")]
    pub memory_usage_percent: String,

    /// Human-readable uptime as printed by `uptime -p`.
    #[serde(rename = "uptime")]
    pub uptime_description: String,

    /// 1/5/15-minute load averages joined with `", "`.
    #[serde(rename = "loadAvg")]
    pub load_average: String,
}

impl SystemSnapshot {
    /// A snapshot where every reading is degraded.
    pub fn degraded() -> Self {
        Self {
            cpu_temperature: None,
            cpu_usage_percent: DEFAULT_PERCENT.to_string(),
            memory_usage_percent: DEFAULT_PERCENT.to_string(),
            uptime_description: UNKNOWN_UPTIME.to_string(),
            load_average: String::new(),
        }
    }
}

impl Default for SystemSnapshot {
    fn default() -> Self {
        Self::degraded()
    }
}

// The dashboard page expects the temperature as a fixed one-decimal string.
fn serialize_temperature<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(celsius) => s.serialize_str(&format!("{celsius:.1}")),
        None => s.serialize_none(),
    }
}
