//! CLI command implementations for hostboard.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: Source and configuration validation
//! - `config`: Configuration file generation
//! - `snapshot`: One-shot metrics collection

pub mod check;
pub mod config;
pub mod snapshot;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use snapshot::command_snapshot;
