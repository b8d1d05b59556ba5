//! Configuration management for hostboard.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use hostboard::model::{DEFAULT_MODEL_ENV, DEFAULT_STATUS_PATH};
use hostboard::probe::{DEFAULT_LOADAVG_PATH, DEFAULT_THERMAL_PATH};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 500;
pub const MAX_QUERY_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_HTML_PATH: &str = "/var/www/html/index.html";
pub const DEFAULT_MEMORY_PATH: &str = "MEMORY.md";
pub const DEFAULT_ACTIVITIES_PATH: &str = "memory/activities.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Documents
    #[serde(alias = "html-path")]
    pub html_path: Option<PathBuf>,
    #[serde(alias = "memory-path")]
    pub memory_path: Option<PathBuf>,
    #[serde(alias = "activities-path")]
    pub activities_path: Option<PathBuf>,

    // Model name sources
    #[serde(alias = "status-path")]
    pub status_path: Option<PathBuf>,
    #[serde(alias = "model-env")]
    pub model_env: Option<String>,

    // Metrics collection
    #[serde(alias = "query-timeout-ms")]
    pub query_timeout_ms: Option<u64>,
    #[serde(alias = "thermal-path")]
    pub thermal_path: Option<PathBuf>,
    #[serde(alias = "loadavg-path")]
    pub loadavg_path: Option<PathBuf>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            html_path: Some(PathBuf::from(DEFAULT_HTML_PATH)),
            memory_path: Some(PathBuf::from(DEFAULT_MEMORY_PATH)),
            activities_path: Some(PathBuf::from(DEFAULT_ACTIVITIES_PATH)),
            status_path: Some(PathBuf::from(DEFAULT_STATUS_PATH)),
            model_env: Some(DEFAULT_MODEL_ENV.to_string()),
            query_timeout_ms: Some(DEFAULT_QUERY_TIMEOUT_MS),
            thermal_path: Some(PathBuf::from(DEFAULT_THERMAL_PATH)),
            loadavg_path: Some(PathBuf::from(DEFAULT_LOADAVG_PATH)),
            enable_health: Some(true),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    pub fn html_path(&self) -> &Path {
        self.html_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_HTML_PATH))
    }

    pub fn memory_path(&self) -> &Path {
        self.memory_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_MEMORY_PATH))
    }

    pub fn activities_path(&self) -> &Path {
        self.activities_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_ACTIVITIES_PATH))
    }

    pub fn status_path(&self) -> &Path {
        self.status_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_STATUS_PATH))
    }

    pub fn model_env(&self) -> &str {
        self.model_env.as_deref().unwrap_or(DEFAULT_MODEL_ENV)
    }

    pub fn thermal_path(&self) -> &Path {
        self.thermal_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_THERMAL_PATH))
    }

    pub fn loadavg_path(&self) -> &Path {
        self.loadavg_path
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_LOADAVG_PATH))
    }

    pub fn query_timeout_ms(&self) -> u64 {
        self.query_timeout_ms.unwrap_or(DEFAULT_QUERY_TIMEOUT_MS)
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.port == Some(0) {
        return Err("port must be between 1 and 65535".into());
    }

    if let Some(bind) = cfg.bind.as_deref() {
        if bind.parse::<std::net::IpAddr>().is_err() {
            return Err(format!("Invalid bind address '{}'", bind).into());
        }
    }

    let timeout = cfg.query_timeout_ms();
    if timeout == 0 || timeout > MAX_QUERY_TIMEOUT_MS {
        return Err(format!(
            "query_timeout_ms must be between 1 and {}, got {}",
            MAX_QUERY_TIMEOUT_MS, timeout
        )
        .into());
    }

    if cfg.model_env().is_empty() {
        return Err("model_env must not be empty".into());
    }

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("TLS {} file not found: {}", what, path).into())
        }
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(path) = &args.html_path {
        config.html_path = Some(path.clone());
    }
    if let Some(path) = &args.memory_path {
        config.memory_path = Some(path.clone());
    }
    if let Some(path) = &args.activities_path {
        config.activities_path = Some(path.clone());
    }
    if let Some(path) = &args.status_path {
        config.status_path = Some(path.clone());
    }
    if let Some(timeout) = args.query_timeout_ms {
        config.query_timeout_ms = Some(timeout);
    }

    if args.disable_health {
        config.enable_health = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Loads a config file, or the first default location that exists.
/// Missing files yield the default configuration.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => {
            let defaults = [
                "/etc/hostboard/hostboard.yaml",
                "/etc/hostboard/hostboard.yml",
                "/etc/hostboard/hostboard.json",
                "./hostboard.yaml",
                "./hostboard.yml",
                "./hostboard.json",
            ];

            defaults
                .iter()
                .find(|p| Path::new(p).exists())
                .map(PathBuf::from)
        }
    };

    let path = match path {
        Some(p) if p.exists() => p,
        _ => return Ok(Config::default()),
    };

    let content = fs::read_to_string(&path)?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config text, picking the format from the file extension (YAML by default).
pub fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
