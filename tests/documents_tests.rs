//! Integration tests for the dashboard documents: memory notes, activity
//! feed and model name resolution.

use hostboard::activities::load_activities;
use hostboard::notes::{read_notes, NOTES_ERROR};
use hostboard::{Activity, ModelResolver, NotesDocument};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[tokio::test]
async fn test_notes_content() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "## Today\nShipped the dashboard.\n").unwrap();

    let doc = read_notes(file.path()).await;
    assert_eq!(
        doc,
        NotesDocument::Content {
            content: "## Today\nShipped the dashboard.\n".to_string()
        }
    );
}

#[tokio::test]
async fn test_notes_invalid_utf8_is_replaced() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"log line \xff\xfe ok\n").unwrap();

    let doc = read_notes(file.path()).await;
    assert_eq!(
        doc,
        NotesDocument::Content {
            content: "log line \u{FFFD}\u{FFFD} ok\n".to_string()
        }
    );
}

#[tokio::test]
async fn test_notes_missing_file() {
    let dir = TempDir::new().unwrap();
    let doc = read_notes(&dir.path().join("MEMORY.md")).await;

    assert_eq!(
        serde_json::to_value(&doc).unwrap(),
        serde_json::json!({ "error": NOTES_ERROR })
    );
}

#[tokio::test]
async fn test_activities_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[{{"time": "2026-10-18T09:00:00.000Z", "action": "Deploy", "details": "v1.2"}}]"#
    )
    .unwrap();

    let feed = load_activities(file.path()).await;
    assert_eq!(
        feed.activities,
        vec![Activity {
            time: "2026-10-18T09:00:00.000Z".to_string(),
            action: "Deploy".to_string(),
            details: "v1.2".to_string(),
            extra: Default::default(),
        }]
    );
}

#[tokio::test]
async fn test_activities_keep_extra_keys_and_partial_entries() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"[
            {{"time": "2026-10-18T09:00:00.000Z", "action": "Deploy", "details": "v1.2", "icon": "rocket"}},
            {{"time": "2026-10-18T09:05:00.000Z", "action": "Restart"}}
        ]"#
    )
    .unwrap();

    let feed = load_activities(file.path()).await;
    let json = serde_json::to_value(&feed).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "activities": [
                {"time": "2026-10-18T09:00:00.000Z", "action": "Deploy", "details": "v1.2", "icon": "rocket"},
                {"time": "2026-10-18T09:05:00.000Z", "action": "Restart", "details": ""}
            ]
        })
    );
}

#[tokio::test]
async fn test_activities_malformed_file_uses_demo() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();

    let feed = load_activities(file.path()).await;
    assert_eq!(feed.activities.len(), 5);
    assert_eq!(feed.activities[1].action, "Memory updated");
}

#[tokio::test]
async fn test_activities_missing_file_uses_demo() {
    let dir = TempDir::new().unwrap();
    let feed = load_activities(&dir.path().join("activities.json")).await;

    let json = serde_json::to_value(&feed).unwrap();
    let activities = json["activities"].as_array().unwrap();
    assert_eq!(activities.len(), 5);
    for entry in activities {
        assert!(entry["time"].as_str().unwrap().ends_with('Z'));
        assert!(entry["details"].is_string());
    }
}

#[tokio::test]
async fn test_model_from_env() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("HOSTBOARD_TEST_MODEL_ENV", "minimax-m2.5");

    let resolver = ModelResolver::new("HOSTBOARD_TEST_MODEL_ENV", dir.path().join("none.json"));
    assert_eq!(resolver.resolve().await, "minimax-m2.5");
}

#[tokio::test]
async fn test_model_defaults_to_unknown() {
    let dir = TempDir::new().unwrap();
    let resolver = ModelResolver::new(
        "HOSTBOARD_TEST_MODEL_NEVER_SET",
        dir.path().join("none.json"),
    );
    assert_eq!(resolver.resolve().await, "unknown");
}

#[tokio::test]
async fn test_status_file_overrides_env() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("session-status.json");
    std::fs::write(&status, r#"{"model": "status-model", "session": 7}"#).unwrap();
    std::env::set_var("HOSTBOARD_TEST_MODEL_OVERRIDE", "env-model");

    let resolver = ModelResolver::new("HOSTBOARD_TEST_MODEL_OVERRIDE", &status);
    assert_eq!(resolver.resolve().await, "status-model");
}

#[tokio::test]
async fn test_status_file_scalar_model_is_stringified() {
    let dir = TempDir::new().unwrap();
    let status = dir.path().join("session-status.json");
    std::fs::write(&status, r#"{"model": 4}"#).unwrap();
    std::env::set_var("HOSTBOARD_TEST_MODEL_SCALAR", "env-model");

    let resolver = ModelResolver::new("HOSTBOARD_TEST_MODEL_SCALAR", &status);
    assert_eq!(resolver.resolve().await, "4");
}

#[tokio::test]
async fn test_unusable_status_file_falls_back_to_env() {
    let dir = TempDir::new().unwrap();
    std::env::set_var("HOSTBOARD_TEST_MODEL_FALLBACK", "env-model");

    for content in [
        r#"{"model": ""}"#,
        r#"{"model": 0}"#,
        r#"{"model": null}"#,
        r#"{"model": false}"#,
        r#"{"session": 7}"#,
        "not json",
    ] {
        let status = dir.path().join("session-status.json");
        std::fs::write(&status, content).unwrap();

        let resolver = ModelResolver::new("HOSTBOARD_TEST_MODEL_FALLBACK", &status);
        assert_eq!(resolver.resolve().await, "env-model", "status file {content:?}");
    }
}
