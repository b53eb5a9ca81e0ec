//! # File Transfer
//!
//! Moves portable documents between the filesystem and the engine.
//!
//! `pick_file` stands in for a user-driven file chooser: no path (or an
//! empty one) means the user backed out, and resolves to
//! `SessionError::NoFileSelected` so callers can treat it as a no-op.

use chrono::{DateTime, Utc};
use serde_json::Value;
use stagecraft_core::SessionError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Largest document accepted by `pick_file` (50 MB).
const MAX_DOCUMENT_SIZE: u64 = 50 * 1024 * 1024;

/// A picked and parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct PickedDocument {
    pub document: Value,
    pub file_name: String,
}

/// Default download name for an export made at `at`.
#[must_use]
pub fn suggested_filename(at: DateTime<Utc>) -> String {
    format!("stagecraft-session-{}.json", at.format("%Y-%m-%d"))
}

/// Read and parse the document at `path`.
pub async fn pick_file(path: Option<&Path>) -> Result<PickedDocument, SessionError> {
    let path = match path {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Err(SessionError::NoFileSelected),
    };

    let metadata = tokio::fs::metadata(path).await.map_err(|e| {
        SessionError::IoError(format!("Cannot open '{}': {}", path.display(), e))
    })?;
    if !metadata.is_file() {
        return Err(SessionError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > MAX_DOCUMENT_SIZE {
        return Err(SessionError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            MAX_DOCUMENT_SIZE
        )));
    }

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| SessionError::IoError(format!("Read file: {}", e)))?;
    let document = serde_json::from_str(&text)
        .map_err(|e| SessionError::NotParseable(format!("{}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    debug!(file = %file_name, bytes = text.len(), "picked document");

    Ok(PickedDocument {
        document,
        file_name,
    })
}

/// Write `text` as a download.
///
/// A directory target receives a file named by [`suggested_filename`].
/// Returns the path actually written.
pub async fn trigger_download(target: &Path, text: &str) -> Result<PathBuf, SessionError> {
    let path = if tokio::fs::metadata(target)
        .await
        .is_ok_and(|m| m.is_dir())
    {
        target.join(suggested_filename(Utc::now()))
    } else {
        target.to_path_buf()
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !tokio::fs::metadata(parent).await.is_ok_and(|m| m.is_dir()) {
        return Err(SessionError::IoError(format!(
            "Output directory '{}' does not exist",
            parent.display()
        )));
    }

    tokio::fs::write(&path, text)
        .await
        .map_err(|e| SessionError::IoError(format!("Write file: {}", e)))?;
    Ok(path)
}
