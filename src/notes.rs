//! Memory notes document served by `/api/memory`.

use serde::Serialize;
use std::path::Path;
use tracing::warn;

pub const NOTES_ERROR: &str = "Could not read memory";

/// Either the file text or an error message. Serialized untagged, so the
/// body is `{"content": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NotesDocument {
    Content { content: String },
    Error { error: String },
}

/// Reads the notes file fresh on every call. Invalid UTF-8 is replaced,
/// not rejected.
pub async fn read_notes(path: &Path) -> NotesDocument {
    match tokio::fs::read(path).await {
        Ok(bytes) => NotesDocument::Content {
            content: String::from_utf8_lossy(&bytes).into_owned(),
        },
        Err(e) => {
            warn!("Failed to read notes file {}: {}", path.display(), e);
            NotesDocument::Error {
                error: NOTES_ERROR.to_string(),
            }
        }
    }
}
