//! Host metrics collection.
//!
//! [`MetricsCollector`] queries the five sources of a [`HostProbe`]
//! concurrently, bounds each one with the same timeout and folds the results
//! into a [`SystemSnapshot`]. A failed, slow or malformed source only
//! degrades its own field; collection itself never fails.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::probe::{HostProbe, ProbeError, SystemProbe};
use crate::snapshot::{SystemSnapshot, DEFAULT_PERCENT, UNKNOWN_UPTIME};

pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(500);

/// Matches the summary row of both procps-ng (`%Cpu(s):  3.1 us,`) and
/// older procps (`Cpu(s):  3.1%us,`).
static CPU_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Cpu\(s\):\s*([0-9]+(?:\.[0-9]+)?)").expect("valid CPU row regex"));

/// One of the five independent sub-queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Temperature,
    CpuUsage,
    MemoryUsage,
    Uptime,
    LoadAverage,
}

impl Source {
    pub const ALL: [Source; 5] = [
        Source::Temperature,
        Source::CpuUsage,
        Source::MemoryUsage,
        Source::Uptime,
        Source::LoadAverage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Source::Temperature => "cpu_temperature",
            Source::CpuUsage => "cpu_usage",
            Source::MemoryUsage => "memory_usage",
            Source::Uptime => "uptime",
            Source::LoadAverage => "load_average",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Source::Temperature => 0,
            Source::CpuUsage => 1,
            Source::MemoryUsage => 2,
            Source::Uptime => 3,
            Source::LoadAverage => 4,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot together with the sources that fell back to defaults.
#[derive(Debug, Clone)]
pub struct Collection {
    pub snapshot: SystemSnapshot,
    pub degraded: Vec<Source>,
}

/// Builds fresh snapshots from a host probe.
#[derive(Clone)]
pub struct MetricsCollector {
    probe: Arc<dyn HostProbe>,
    query_timeout: Duration,
}

impl fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("query_timeout", &self.query_timeout)
            .finish_non_exhaustive()
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(Arc::new(SystemProbe::default()), DEFAULT_QUERY_TIMEOUT)
    }
}

impl MetricsCollector {
    pub fn new(probe: Arc<dyn HostProbe>, query_timeout: Duration) -> Self {
        Self {
            probe,
            query_timeout,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Collects one snapshot. Always succeeds.
    pub async fn collect(&self) -> SystemSnapshot {
        self.collect_detailed().await.snapshot
    }

    /// Collects one snapshot and reports which sources were degraded.
    #[instrument(skip(self))]
    pub async fn collect_detailed(&self) -> Collection {
        let (temperature, cpu_usage, memory_usage, uptime, load_average) = tokio::join!(
            self.temperature(),
            self.cpu_usage(),
            self.memory_usage(),
            self.uptime(),
            self.load_average(),
        );

        let mut degraded = Vec::new();
        let snapshot = SystemSnapshot {
            cpu_temperature: settle(Source::Temperature, temperature, &mut degraded),
            cpu_usage_percent: settle(Source::CpuUsage, cpu_usage, &mut degraded)
                .unwrap_or_else(|| DEFAULT_PERCENT.to_string()),
            memory_usage_percent: settle(Source::MemoryUsage, memory_usage, &mut degraded)
                .unwrap_or_else(|| DEFAULT_PERCENT.to_string()),
            uptime_description: settle(Source::Uptime, uptime, &mut degraded)
                .unwrap_or_else(|| UNKNOWN_UPTIME.to_string()),
            load_average: settle(Source::LoadAverage, load_average, &mut degraded)
                .unwrap_or_default(),
        };

        Collection { snapshot, degraded }
    }

    /// Runs a single source and returns its normalized value as text.
    pub async fn probe(&self, source: Source) -> Result<String, ProbeError> {
        match source {
            Source::Temperature => self.temperature().await.map(|c| format!("{c:.1}")),
            Source::CpuUsage => self.cpu_usage().await,
            Source::MemoryUsage => self.memory_usage().await,
            Source::Uptime => self.uptime().await,
            Source::LoadAverage => self.load_average().await,
        }
    }

    async fn temperature(&self) -> Result<f64, ProbeError> {
        parse_temperature(&self.bounded(self.probe.thermal_zone()).await?)
    }

    async fn cpu_usage(&self) -> Result<String, ProbeError> {
        parse_cpu_usage(&self.bounded(self.probe.cpu_summary()).await?)
    }

    async fn memory_usage(&self) -> Result<String, ProbeError> {
        parse_memory_usage(&self.bounded(self.probe.memory_summary()).await?)
    }

    async fn uptime(&self) -> Result<String, ProbeError> {
        parse_uptime(&self.bounded(self.probe.uptime()).await?)
    }

    async fn load_average(&self) -> Result<String, ProbeError> {
        parse_load_average(&self.bounded(self.probe.load_average()).await?)
    }

    async fn bounded<F>(&self, query: F) -> Result<String, ProbeError>
    where
        F: Future<Output = Result<String, ProbeError>>,
    {
        tokio::time::timeout(self.query_timeout, query)
            .await
            .map_err(|_| ProbeError::Timeout(self.query_timeout))?
    }
}

fn settle<T>(source: Source, result: Result<T, ProbeError>, degraded: &mut Vec<Source>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            debug!("Sub-query {} unavailable: {}", source, e);
            degraded.push(source);
            None
        }
    }
}

/// Converts a millidegree reading to °C rounded to one decimal.
///
/// Some drivers report fractional millidegrees, so any finite decimal is
/// accepted.
pub fn parse_temperature(raw: &str) -> Result<f64, ProbeError> {
    let millidegrees = raw
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProbeError::Malformed(format!("temperature {:?}", raw.trim())))?;

    let celsius = millidegrees / 1000.0;
    Ok((celsius * 10.0).round() / 10.0)
}

/// Extracts the user CPU percentage from `top` batch output.
pub fn parse_cpu_usage(output: &str) -> Result<String, ProbeError> {
    CPU_ROW
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ProbeError::Malformed("no Cpu(s) summary row".to_string()))
}

/// Computes `used * 100 / total` from the `Mem:` row of `free -m`.
pub fn parse_memory_usage(output: &str) -> Result<String, ProbeError> {
    let line = output
        .lines()
        .find(|l| l.trim_start().starts_with("Mem:"))
        .ok_or_else(|| ProbeError::Malformed("no Mem: row".to_string()))?;

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ProbeError::Malformed(format!(
            "Mem: row has {} fields, expected at least 3",
            parts.len()
        )));
    }

    let total = parts[1]
        .parse::<u64>()
        .map_err(|e| ProbeError::Malformed(format!("total memory: {}", e)))?;
    let used = parts[2]
        .parse::<u64>()
        .map_err(|e| ProbeError::Malformed(format!("used memory: {}", e)))?;

    if total == 0 {
        return Err(ProbeError::Malformed("total memory is zero".to_string()));
    }

    Ok(format!("{:.1}", used as f64 * 100.0 / total as f64))
}

pub fn parse_uptime(output: &str) -> Result<String, ProbeError> {
    let text = output.trim();
    if text.is_empty() {
        return Err(ProbeError::Malformed("empty uptime".to_string()));
    }
    Ok(text.to_string())
}

/// Re-joins the first three fields of `/proc/loadavg` with `", "`.
///
/// Format: "0.00 0.01 0.05 1/234 5678"
pub fn parse_load_average(raw: &str) -> Result<String, ProbeError> {
    let parts: Vec<&str> = raw.split_whitespace().take(3).collect();
    if parts.len() < 3 {
        return Err(ProbeError::Malformed(format!(
            "load average: expected at least 3 fields, got {}",
            parts.len()
        )));
    }

    for part in &parts {
        part.parse::<f64>()
            .map_err(|e| ProbeError::Malformed(format!("load average {:?}: {}", part, e)))?;
    }

    Ok(parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOP_PROCPS_NG: &str = "\
top - 10:41:02 up 3 days,  2:11,  1 user,  load average: 0.10, 0.25, 0.30
Tasks: 150 total,   1 running, 149 sleeping,   0 stopped,   0 zombie
%Cpu(s):  3.1 us,  1.0 sy,  0.0 ni, 95.6 id,  0.2 wa,  0.0 hi,  0.1 si,  0.0 st
MiB Mem :   7861.2 total,   1020.4 free,   3365.8 used,   3475.0 buff/cache
";

    const TOP_LEGACY: &str = "\
Cpu(s): 12.5%us,  2.3%sy,  0.0%ni, 84.9%id,  0.3%wa,  0.0%hi,  0.0%si,  0.0%st
";

    const FREE_OUTPUT: &str = "\
               total        used        free      shared  buff/cache   available
Mem:            7861        3365        1020         312        3475        4138
Swap:           2047           0        2047
";

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature("45230\n").unwrap(), 45.2);
        assert_eq!(parse_temperature("51000").unwrap(), 51.0);
        assert_eq!(parse_temperature("-5000").unwrap(), -5.0);
        assert_eq!(parse_temperature("45230.5\n").unwrap(), 45.2);
    }

    #[test]
    fn test_parse_temperature_invalid() {
        assert!(parse_temperature("").is_err());
        assert!(parse_temperature("hot").is_err());
        assert!(parse_temperature("NaN").is_err());
        assert!(parse_temperature("inf").is_err());
    }

    #[test]
    fn test_parse_cpu_usage_procps_ng() {
        assert_eq!(parse_cpu_usage(TOP_PROCPS_NG).unwrap(), "3.1");
    }

    #[test]
    fn test_parse_cpu_usage_legacy_format() {
        assert_eq!(parse_cpu_usage(TOP_LEGACY).unwrap(), "12.5");
    }

    #[test]
    fn test_parse_cpu_usage_without_summary_row() {
        assert!(parse_cpu_usage("Tasks: 1 total\n").is_err());
        assert!(parse_cpu_usage("").is_err());
    }

    #[test]
    fn test_parse_memory_usage() {
        // 3365 * 100 / 7861 = 42.806...
        assert_eq!(parse_memory_usage(FREE_OUTPUT).unwrap(), "42.8");
    }

    #[test]
    fn test_parse_memory_usage_invalid() {
        assert!(parse_memory_usage("Swap: 1 2 3").is_err());
        assert!(parse_memory_usage("Mem: 0 0 0").is_err());
        assert!(parse_memory_usage("Mem: lots some").is_err());
    }

    #[test]
    fn test_parse_uptime() {
        assert_eq!(
            parse_uptime("up 3 days, 2 hours, 11 minutes\n").unwrap(),
            "up 3 days, 2 hours, 11 minutes"
        );
        assert!(parse_uptime("  \n").is_err());
    }

    #[test]
    fn test_parse_load_average() {
        assert_eq!(
            parse_load_average("0.10 0.25 0.30 2/150 1234\n").unwrap(),
            "0.10, 0.25, 0.30"
        );
    }

    #[test]
    fn test_parse_load_average_invalid() {
        assert!(parse_load_average("0.52 0.58").is_err());
        assert!(parse_load_average("abc def ghi 1/2 3").is_err());
    }

    #[test]
    fn test_source_indices_are_distinct() {
        let mut seen = [false; 5];
        for source in Source::ALL {
            assert!(!seen[source.index()], "duplicate index for {}", source);
            seen[source.index()] = true;
        }
    }
}
