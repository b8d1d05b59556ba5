//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("hostboard.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# Hostboard Dashboard Configuration
# ==================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 3000                   # HTTP port
#
# Documents
# ---------
# html_path: /var/www/html/index.html     # Dashboard page served at /
# memory_path: MEMORY.md                  # Served by /api/memory
# activities_path: memory/activities.json # Served by /api/activities (demo data if missing)
#
# Model Name
# ----------
# status_path: session-status.json  # JSON file with a "model" key, wins over env
# model_env: MODEL                  # Environment variable fallback
#
# Metrics Collection
# ------------------
# query_timeout_ms: 500        # Timeout per sub-query; a timeout degrades that field
# thermal_path: /sys/class/thermal/thermal_zone0/temp
# loadavg_path: /proc/loadavg
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false            # Enable HTTPS (default: false)
# tls_cert_path: null          # Path to TLS certificate (PEM format)
# tls_key_path: null           # Path to TLS private key (PEM format)
"#;

    format!("{comments}\n{yaml}")
}
