//! Host access for the metrics collector.
//!
//! Every reading the collector needs goes through [`HostProbe`]: two
//! pseudo-files and three utility commands. [`SystemProbe`] talks to the
//! real host; tests substitute their own implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::process::Command;

pub const DEFAULT_THERMAL_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";
pub const DEFAULT_LOADAVG_PATH: &str = "/proc/loadavg";

/// Why a sub-query was unavailable.
///
/// Never reaches an HTTP caller: the collector maps every variant to the
/// default value of the affected field.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}")]
    ExitStatus { command: String, status: ExitStatus },

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed output: {0}")]
    Malformed(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Raw access to the five host sources.
///
/// Implementations return the unparsed text of each source.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Thermal zone temperature in millidegrees Celsius.
    async fn thermal_zone(&self) -> Result<String, ProbeError>;

    /// Output of a CPU utilization summary (`top -bn1`).
    async fn cpu_summary(&self) -> Result<String, ProbeError>;

    /// Output of a memory utilization summary (`free -m`).
    async fn memory_summary(&self) -> Result<String, ProbeError>;

    /// Human-readable uptime (`uptime -p`).
    async fn uptime(&self) -> Result<String, ProbeError>;

    /// Contents of the load average pseudo-file.
    async fn load_average(&self) -> Result<String, ProbeError>;
}

/// Probe backed by the local host.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    thermal_path: PathBuf,
    loadavg_path: PathBuf,
}

impl SystemProbe {
    pub fn new(thermal_path: impl Into<PathBuf>, loadavg_path: impl Into<PathBuf>) -> Self {
        Self {
            thermal_path: thermal_path.into(),
            loadavg_path: loadavg_path.into(),
        }
    }
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new(DEFAULT_THERMAL_PATH, DEFAULT_LOADAVG_PATH)
    }
}

#[async_trait]
impl HostProbe for SystemProbe {
    async fn thermal_zone(&self) -> Result<String, ProbeError> {
        read_pseudo_file(&self.thermal_path).await
    }

    async fn cpu_summary(&self) -> Result<String, ProbeError> {
        run_utility("top", &["-bn1"]).await
    }

    async fn memory_summary(&self) -> Result<String, ProbeError> {
        run_utility("free", &["-m"]).await
    }

    async fn uptime(&self) -> Result<String, ProbeError> {
        run_utility("uptime", &["-p"]).await
    }

    async fn load_average(&self) -> Result<String, ProbeError> {
        read_pseudo_file(&self.loadavg_path).await
    }
}

async fn read_pseudo_file(path: &Path) -> Result<String, ProbeError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ProbeError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Runs a utility and returns its stdout.
///
/// The child is killed if the returned future is dropped, so a caller-side
/// timeout does not leave stray processes behind.
async fn run_utility(program: &str, args: &[&str]) -> Result<String, ProbeError> {
    let command = format!("{} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        // Decimal separators must be '.'
        .env("LC_ALL", "C")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| ProbeError::Spawn {
            command: command.clone(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProbeError::ExitStatus {
            command,
            status: output.status,
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
