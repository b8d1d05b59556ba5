//! Recent activity feed served by `/api/activities`.
//!
//! The feed comes from a JSON file when one is available. Entries keep any
//! extra keys they carry; a missing `time`, `action` or `details` reads as
//! empty. A missing or unreadable file, or one that is not an array of
//! objects, yields a fixed set of demo entries stamped relative to the
//! current time.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, warn};

/// A single activity entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub details: String,
    /// Keys beyond the three above, passed through unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Activity {
    fn at(time: DateTime<Utc>, action: &str, details: &str) -> Self {
        Self {
            time: time.to_rfc3339_opts(SecondsFormat::Millis, true),
            action: action.to_string(),
            details: details.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityFeed {
    pub activities: Vec<Activity>,
}

/// Loads the feed from `path`, falling back to [`demo_activities`].
pub async fn load_activities(path: &Path) -> ActivityFeed {
    let activities = match tokio::fs::read_to_string(path).await {
        Ok(content) => match serde_json::from_str::<Vec<Activity>>(&content) {
            Ok(activities) => activities,
            Err(e) => {
                warn!("Malformed activities file {}: {}", path.display(), e);
                demo_activities(Utc::now())
            }
        },
        Err(e) => {
            debug!("No activities file at {}: {}", path.display(), e);
            demo_activities(Utc::now())
        }
    };

    ActivityFeed { activities }
}

pub fn demo_activities(now: DateTime<Utc>) -> Vec<Activity> {
    vec![
        Activity::at(now, "Dashboard accessed", "User viewed dashboard"),
        Activity::at(
            now - Duration::minutes(5),
            "Memory updated",
            "Pre-compaction flush",
        ),
        Activity::at(
            now - Duration::minutes(10),
            "Website updated",
            "Added model badge and skills",
        ),
        Activity::at(
            now - Duration::minutes(15),
            "Model switched",
            "Now using MiniMax-M2.5",
        ),
        Activity::at(
            now - Duration::minutes(2),
            "Website restored",
            "Fixed empty file issue",
        ),
    ]
}
