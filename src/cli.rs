//! CLI arguments and subcommands for hostboard.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "hostboard",
    about = "HTTP dashboard backend for host metrics",
    long_about = "HTTP dashboard backend for host metrics.\n\n\
                  Serves a static dashboard page together with a small JSON API: CPU \
                  temperature and usage, memory usage, uptime and load average, plus the \
                  running model name, a memory notes file and a recent activity feed.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Dashboard HTML page
    #[arg(long)]
    pub html_path: Option<PathBuf>,

    /// Memory notes file served by /api/memory
    #[arg(long)]
    pub memory_path: Option<PathBuf>,

    /// Activity feed JSON file served by /api/activities
    #[arg(long)]
    pub activities_path: Option<PathBuf>,

    /// Session status JSON file overriding the model name
    #[arg(long)]
    pub status_path: Option<PathBuf>,

    /// Timeout per metrics sub-query in milliseconds
    #[arg(long)]
    pub query_timeout_ms: Option<u64>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Probe every metrics source and the configured files
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Collect system snapshots and print them as JSON
    Snapshot {
        /// Number of snapshots to collect
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Pretty-print JSON
        #[arg(long)]
        pretty: bool,
    },
}
