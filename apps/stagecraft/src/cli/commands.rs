//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::StagecraftConfig;
use crate::live::LiveSession;
use crate::transfer::{pick_file, suggested_filename, trigger_download};
use chrono::Utc;
use serde_json::json;
use stagecraft_core::{SessionError, SessionState, StageId};
use std::path::{Path, PathBuf};

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print every problem with a rejected document. Other errors print nothing here.
fn report_problems(err: &SessionError, json_mode: bool) {
    let problems = err.document_problems();
    if problems.is_empty() {
        return;
    }
    if json_mode {
        print_json(&json!({ "valid": false, "errors": problems }));
        return;
    }
    eprintln!("Document rejected:");
    for problem in &problems {
        eprintln!("  - {}", problem);
    }
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Write a default live state file.
pub fn cmd_init(config: &StagecraftConfig, force: bool, json_mode: bool) -> Result<(), SessionError> {
    if config.state_path.exists() && !force {
        return Err(SessionError::IoError(
            "Session file already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let session = LiveSession::new(SessionState::new(), &config.app_version)?;
    session.save(&config.state_path)?;

    if json_mode {
        print_json(&json!({ "initialized": config.state_path.to_string_lossy() }));
    } else {
        println!("Initialized new session at {:?}", config.state_path);
    }
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summarize the live state.
pub fn cmd_status(
    config: &StagecraftConfig,
    json_mode: bool,
    verbose: bool,
) -> Result<(), SessionError> {
    let session = LiveSession::load(config)?;
    let state = session.snapshot();
    let progress = &state.navigation_progress;
    let last_saved = state.last_saved.map(|at| at.to_rfc3339());

    if json_mode {
        let stages: Vec<_> = StageId::ALL
            .into_iter()
            .map(|stage| {
                json!({
                    "id": stage.as_str(),
                    "title": stage.title(),
                    "completed": progress.is_completed(stage),
                })
            })
            .collect();
        print_json(&json!({
            "state_path": config.state_path.to_string_lossy(),
            "loaded_from": session.origin().as_str(),
            "current_view": state.current_view.as_str(),
            "current_part": progress.current_part.as_str(),
            "stages": stages,
            "filled_fields": state.filled_field_count(),
            "segment_columns": state.segment_data.len(),
            "alternatives": state.positioning_data.alternatives.len(),
            "last_saved": last_saved,
        }));
        return Ok(());
    }

    println!("Stagecraft Session Status");
    println!("=========================");
    println!("State file:  {:?}", config.state_path);
    println!("Loaded from: {}", session.origin().as_str());
    println!("View:        {}", state.current_view.as_str());
    println!();
    for stage in StageId::ALL {
        let marker = if progress.is_completed(stage) { "x" } else { " " };
        let current = if stage == progress.current_part { " <" } else { "" };
        println!("  [{}] {} {}{}", marker, stage.as_str(), stage.title(), current);
    }
    println!();
    println!("Filled fields:   {}", state.filled_field_count());
    println!("Segment columns: {}", state.segment_data.len());
    println!("Alternatives:    {}", state.positioning_data.alternatives.len());
    println!(
        "Last saved:      {}",
        last_saved.as_deref().unwrap_or("never")
    );

    if verbose {
        println!();
        println!("Sections:");
        println!("  companyContext: {} keys", state.company_context.len());
        println!("  segmentData:    {} keys", state.segment_data.len());
        println!("  positioning:    {} keys", state.positioning_data.fields.len());
        println!("  categoryData:   {} keys", state.category_data.len());
        println!("  aiSuggestions:  {} keys", state.ai_suggestions.len());
        if !state.extra.is_empty() {
            let keys: Vec<&str> = state.extra.keys().map(String::as_str).collect();
            println!("  unrecognized:   {}", keys.join(", "));
        }
    }

    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Serialize the live state and download it.
pub async fn cmd_export(
    config: &StagecraftConfig,
    output: Option<&Path>,
    json_mode: bool,
) -> Result<(), SessionError> {
    let session = LiveSession::load(config)?;
    let text = session.engine().export_text()?;

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(suggested_filename(Utc::now())));
    let written = trigger_download(&target, &text).await?;

    if json_mode {
        print_json(&json!({
            "exported": written.to_string_lossy(),
            "bytes": text.len(),
        }));
    } else {
        println!("Exported {} bytes to {:?}", text.len(), written);
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Pick, validate and hydrate a document into the live state.
///
/// No file selected is a no-op. A rejected document prints every problem
/// and leaves the state file untouched.
pub async fn cmd_import(
    config: &StagecraftConfig,
    input: Option<&Path>,
    json_mode: bool,
) -> Result<(), SessionError> {
    let picked = match pick_file(input).await {
        Ok(picked) => picked,
        Err(e) if e.is_cancellation() => {
            if json_mode {
                print_json(&json!({ "imported": false }));
            } else {
                println!("No file selected; nothing imported.");
            }
            return Ok(());
        }
        Err(e) => {
            report_problems(&e, json_mode);
            return Err(e);
        }
    };

    let session = LiveSession::load(config)?;
    if let Err(e) = session.engine().import_document(&picked.document) {
        report_problems(&e, json_mode);
        return Err(e);
    }
    session.save(&config.state_path)?;

    if config.auto_backup {
        session.backup_to(&config.store_path, &config.backup_key)?;
    }

    let state = session.snapshot();
    if json_mode {
        print_json(&json!({
            "imported": true,
            "file": picked.file_name,
            "filled_fields": state.filled_field_count(),
            "backed_up": config.auto_backup,
        }));
    } else {
        println!(
            "Imported {} ({} filled fields)",
            picked.file_name,
            state.filled_field_count()
        );
    }
    Ok(())
}

// =============================================================================
// VALIDATE COMMAND
// =============================================================================

/// Report validation results without touching state.
pub async fn cmd_validate(
    config: &StagecraftConfig,
    input: &Path,
    json_mode: bool,
) -> Result<(), SessionError> {
    let picked = match pick_file(Some(input)).await {
        Ok(picked) => picked,
        Err(e) => {
            report_problems(&e, json_mode);
            return Err(e);
        }
    };

    let session = LiveSession::new(SessionState::new(), &config.app_version)?;
    let report = session.engine().validate(&picked.document);
    if !report.valid {
        let err = SessionError::InvalidDocument(report.errors);
        report_problems(&err, json_mode);
        return Err(err);
    }

    let format_version = picked
        .document
        .get("formatVersion")
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default();
    if json_mode {
        print_json(&json!({
            "valid": true,
            "file": picked.file_name,
            "format_version": format_version,
        }));
    } else {
        println!("{} is a valid {} document", picked.file_name, format_version);
    }
    Ok(())
}

// =============================================================================
// BACKUP COMMAND
// =============================================================================

/// Write the live state to a backup slot.
pub fn cmd_backup(
    config: &StagecraftConfig,
    key: Option<&str>,
    json_mode: bool,
) -> Result<(), SessionError> {
    let key = key.unwrap_or(&config.backup_key);
    let session = LiveSession::load(config)?;
    session.backup_to(&config.store_path, key)?;

    if json_mode {
        print_json(&json!({
            "backed_up": true,
            "key": key,
            "store": config.store_path.to_string_lossy(),
        }));
    } else {
        println!("Backed up session to slot '{}' in {:?}", key, config.store_path);
    }
    Ok(())
}

// =============================================================================
// RESTORE COMMAND
// =============================================================================

/// Replace the live state from a backup slot.
///
/// A missing or corrupted backup is reported and leaves the state file alone.
pub fn cmd_restore(
    config: &StagecraftConfig,
    key: Option<&str>,
    json_mode: bool,
) -> Result<(), SessionError> {
    let key = key.unwrap_or(&config.backup_key);
    let session = LiveSession::load(config)?;

    let restored = if config.store_path.exists() {
        match session.restore_from(&config.store_path, key) {
            Ok(restored) => restored,
            Err(e) if !e.document_problems().is_empty() => {
                report_problems(&e, json_mode);
                false
            }
            Err(e) => return Err(e),
        }
    } else {
        false
    };

    if restored {
        session.save(&config.state_path)?;
    }

    if json_mode {
        print_json(&json!({ "restored": restored, "key": key }));
    } else if restored {
        println!("Restored session from slot '{}'", key);
    } else {
        println!("No usable backup in slot '{}'; session left untouched.", key);
    }
    Ok(())
}
