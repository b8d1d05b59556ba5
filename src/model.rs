//! Resolution of the running model name.
//!
//! Two sources, checked in order:
//! 1. the `model` key of a session status JSON file, if it holds a non-empty
//!    string, a non-zero number or `true`;
//! 2. an environment variable, falling back to `"unknown"`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

pub const DEFAULT_MODEL_ENV: &str = "MODEL";
pub const DEFAULT_STATUS_PATH: &str = "session-status.json";
pub const UNKNOWN_MODEL: &str = "unknown";

/// JSON body of `/api/model` and `/api/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub model: String,
}

#[derive(Debug, Deserialize)]
struct SessionStatus {
    #[serde(default)]
    model: Option<Value>,
}

/// Non-empty strings, non-zero numbers and `true` name a model; anything
/// else defers to the environment.
fn model_name(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct ModelResolver {
    env_var: String,
    status_path: PathBuf,
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MODEL_ENV, DEFAULT_STATUS_PATH)
    }
}

impl ModelResolver {
    pub fn new(env_var: impl Into<String>, status_path: impl Into<PathBuf>) -> Self {
        Self {
            env_var: env_var.into(),
            status_path: status_path.into(),
        }
    }

    /// Returns the model name. The status file wins over the environment.
    pub async fn resolve(&self) -> String {
        match self.status_file_model().await {
            Some(model) => model,
            None => self.env_model(),
        }
    }

    pub async fn info(&self) -> ModelInfo {
        ModelInfo {
            model: self.resolve().await,
        }
    }

    fn env_model(&self) -> String {
        std::env::var(&self.env_var)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN_MODEL.to_string())
    }

    async fn status_file_model(&self) -> Option<String> {
        let content = tokio::fs::read_to_string(&self.status_path).await.ok()?;

        match serde_json::from_str::<SessionStatus>(&content) {
            Ok(status) => status.model.and_then(model_name),
            Err(e) => {
                debug!(
                    "Ignoring unparseable status file {}: {}",
                    self.status_path.display(),
                    e
                );
                None
            }
        }
    }
}
