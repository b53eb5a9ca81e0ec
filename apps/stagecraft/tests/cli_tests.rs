//! End-to-end tests for the CLI commands against a temporary working area.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::{Value, json};
use stagecraft::cli::{
    cmd_backup, cmd_export, cmd_import, cmd_init, cmd_restore, cmd_status, cmd_validate,
};
use stagecraft::live::StateOrigin;
use stagecraft::{LiveSession, StagecraftConfig, pick_file};
use stagecraft_core::{KeyValueStore, RedbStore, SessionError, SessionState};
use std::path::Path;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> StagecraftConfig {
    StagecraftConfig {
        app_version: "1.4.0".to_string(),
        state_path: dir.path().join("session.json"),
        store_path: dir.path().join("backup.redb"),
        ..StagecraftConfig::default()
    }
}

fn write_json(path: &Path, value: &Value) {
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_state(config: &StagecraftConfig) -> SessionState {
    serde_json::from_str(&std::fs::read_to_string(&config.state_path).unwrap()).unwrap()
}

// =============================================================================
// INIT / STATUS
// =============================================================================

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    cmd_init(&config, false, true).unwrap();
    assert!(cmd_init(&config, false, true).is_err());
    cmd_init(&config, true, true).unwrap();
    assert!(read_state(&config).last_saved.is_some());
}

#[test]
fn status_works_without_any_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    cmd_status(&config, true, true).unwrap();
    assert!(!config.state_path.exists());
    assert!(!config.store_path.exists());
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

#[tokio::test]
async fn export_then_import_roundtrips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut state = SessionState::new();
    state.segment_data.insert("Context".into(), json!("Q3 renewal cycle"));
    state.segment_data.insert("customColumn".into(), json!("foo"));
    LiveSession::new(state, "1.4.0")
        .unwrap()
        .save(&config.state_path)
        .unwrap();

    let exports = dir.path().join("exports");
    std::fs::create_dir(&exports).unwrap();
    cmd_export(&config, Some(exports.as_path()), true).await.unwrap();

    let exported: Vec<_> = std::fs::read_dir(&exports)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(exported.len(), 1);
    let name = exported[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("stagecraft-session-") && name.ends_with(".json"));

    std::fs::remove_file(&config.state_path).unwrap();
    cmd_import(&config, Some(exported[0].as_path()), true).await.unwrap();

    let imported = read_state(&config);
    assert_eq!(imported.segment_data["Context"], json!("Q3 renewal cycle"));
    assert_eq!(imported.segment_data["customColumn"], json!("foo"));
    assert!(config.store_path.exists(), "auto backup after import");
}

#[tokio::test]
async fn import_without_a_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    cmd_import(&config, None, true).await.unwrap();
    assert!(!config.state_path.exists());
}

#[tokio::test]
async fn invalid_import_leaves_state_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    cmd_init(&config, false, true).unwrap();
    let before = std::fs::read_to_string(&config.state_path).unwrap();

    let bad = dir.path().join("bad.json");
    write_json(&bad, &json!({ "formatVersion": "7.0", "data": {} }));
    let err = cmd_import(&config, Some(bad.as_path()), true).await.unwrap_err();

    assert!(matches!(err, SessionError::InvalidDocument(ref errors) if errors.len() == 3));
    assert_eq!(std::fs::read_to_string(&config.state_path).unwrap(), before);
}

#[tokio::test]
async fn malformed_json_is_not_parseable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"formatVersion\": ").unwrap();

    let err = pick_file(Some(path.as_path())).await.unwrap_err();
    assert!(matches!(err, SessionError::NotParseable(_)));
    assert_eq!(err.document_problems().len(), 1);
}

#[tokio::test]
async fn validate_accepts_legacy_nested_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let path = dir.path().join("legacy.json");
    write_json(
        &path,
        &json!({
            "data": {
                "formatVersion": "1.1",
                "appVersion": "0.9.0",
                "exportTimestamp": 1_700_000_000_000_i64,
                "data": { "companyContext": { "companyName": "Acme" } }
            }
        }),
    );

    cmd_validate(&config, &path, true).await.unwrap();
    assert!(!config.state_path.exists());
}

// =============================================================================
// BACKUP / RESTORE
// =============================================================================

#[test]
fn backup_then_restore_replaces_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut state = SessionState::new();
    state.category_data.insert("categoryName".into(), json!("FinOps"));
    LiveSession::new(state, "1.4.0")
        .unwrap()
        .save(&config.state_path)
        .unwrap();

    cmd_backup(&config, Some("nightly"), true).unwrap();
    cmd_init(&config, true, true).unwrap();
    assert!(read_state(&config).category_data.is_empty());

    cmd_restore(&config, Some("nightly"), true).unwrap();
    assert_eq!(read_state(&config).category_data["categoryName"], json!("FinOps"));
}

#[test]
fn corrupted_backup_is_reported_and_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    cmd_init(&config, false, true).unwrap();
    let before = std::fs::read_to_string(&config.state_path).unwrap();
    {
        let mut store = RedbStore::open(&config.store_path).unwrap();
        store.write(&config.backup_key, "not an envelope").unwrap();
    }

    cmd_restore(&config, None, true).unwrap();
    assert_eq!(std::fs::read_to_string(&config.state_path).unwrap(), before);
}

#[test]
fn startup_falls_back_to_the_backup_slot() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let mut state = SessionState::new();
    state.company_context.insert("companyName".into(), json!("Acme"));
    LiveSession::new(state, "1.4.0")
        .unwrap()
        .backup_to(&config.store_path, &config.backup_key)
        .unwrap();

    let session = LiveSession::load(&config).unwrap();

    assert_eq!(session.origin(), StateOrigin::Backup);
    assert_eq!(session.snapshot().company_context["companyName"], json!("Acme"));
}

#[test]
fn startup_restores_a_backup_written_by_an_older_release() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    let legacy = json!({
        "formatVersion": "1.1",
        "appVersion": "0.9.2",
        "exportTimestamp": 1_700_000_000_000_i64,
        "data": { "companyContext": { "companyName": "Acme" } }
    });
    {
        let mut store = RedbStore::open(&config.store_path).unwrap();
        store.write(&config.backup_key, &legacy.to_string()).unwrap();
    }

    let session = LiveSession::load(&config).unwrap();

    assert_eq!(session.origin(), StateOrigin::Backup);
    assert_eq!(session.snapshot().company_context["companyName"], json!("Acme"));
}

// =============================================================================
// CONFIGURATION
// =============================================================================

#[test]
fn explicit_config_file_is_layered_under_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stagecraft.toml");
    std::fs::write(
        &path,
        "app_version = \"2.1.0\"\nbackup_key = \"weekly\"\nstate_path = \"from-file.json\"\n",
    )
    .unwrap();

    let config = StagecraftConfig::load_file(&path)
        .unwrap()
        .apply_flags(Some(dir.path().join("from-flag.json")), None);

    assert_eq!(config.app_version, "2.1.0");
    assert_eq!(config.backup_key, "weekly");
    assert_eq!(config.state_path, dir.path().join("from-flag.json"));
}

#[test]
fn missing_explicit_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StagecraftConfig::resolve(Some(dir.path().join("absent.toml").as_path()), None, None)
        .unwrap_err();
    assert!(matches!(err, SessionError::Configuration(_)));
}
